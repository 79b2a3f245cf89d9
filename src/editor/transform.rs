//! Pure buffer transformations triggered by editing commands.
//!
//! Every rule takes the current [`Snapshot`] and returns the snapshots to
//! apply, in order. An empty list means the rule did not fire and the host's
//! default key handling should run instead.
use tracing::debug;

use super::scanner::{covered_lines, leading_whitespace, line_before, list_marker};
use super::snapshot::Snapshot;
use crate::config::EditorConfig;
use crate::input::Command;

pub fn transform(command: Command, snapshot: &Snapshot, config: &EditorConfig) -> Vec<Snapshot> {
    let tab = config.tab_character();

    let edits = match command {
        Command::InsertTab => insert_tab(snapshot, &tab).into_iter().collect(),
        Command::Indent => indent(snapshot, &tab).into_iter().collect(),
        Command::Dedent => dedent(snapshot, &tab).into_iter().collect(),
        Command::DeleteIndent => delete_indent(snapshot, &tab).into_iter().collect(),
        Command::NewlineContinue => newline_continue(snapshot),
        Command::WrapOrDuplicate(trigger) => match config.wrap_pair(trigger) {
            Some(pair) => vec![wrap_or_duplicate(snapshot, pair.start, pair.end())],
            None => Vec::new(),
        },
        Command::Undo
        | Command::Redo
        | Command::ToggleCapture
        | Command::Blur
        | Command::Passthrough => Vec::new(),
    };

    if !edits.is_empty() {
        debug!(?command, edits = edits.len(), "transformed buffer");
    }
    edits
}

/// Replace the selection with `text` and put a collapsed caret after it.
fn replace_selection(snapshot: &Snapshot, text: &str) -> Snapshot {
    let mut value = String::with_capacity(snapshot.value.len() + text.len());
    value.push_str(snapshot.text_before_caret());
    value.push_str(text);
    value.push_str(snapshot.text_after_selection());
    Snapshot::caret(value, snapshot.selection_start + text.len())
}

/// Rewrite the lines touched by the selection, leaving the others alone.
fn map_covered_lines<F>(snapshot: &Snapshot, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let range = covered_lines(
        &snapshot.value,
        snapshot.selection_start,
        snapshot.selection_end,
    );
    snapshot
        .value
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if range.contains(&i) {
                f(line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn insert_tab(snapshot: &Snapshot, tab: &str) -> Option<Snapshot> {
    Some(replace_selection(snapshot, tab))
}

pub fn indent(snapshot: &Snapshot, tab: &str) -> Option<Snapshot> {
    let range = covered_lines(
        &snapshot.value,
        snapshot.selection_start,
        snapshot.selection_end,
    );
    let line_count = range.end() - range.start() + 1;
    let value = map_covered_lines(snapshot, |line| format!("{tab}{line}"));

    // The caret only moves if there was text in front of it on its line
    let first_line = line_before(&snapshot.value, snapshot.selection_start);
    let start = if first_line.chars().any(|c| !c.is_whitespace()) {
        snapshot.selection_start + tab.len()
    } else {
        snapshot.selection_start
    };
    let end = snapshot.selection_end + tab.len() * line_count;

    Some(Snapshot::new(value, start, end))
}

pub fn dedent(snapshot: &Snapshot, tab: &str) -> Option<Snapshot> {
    let value = map_covered_lines(snapshot, |line| {
        line.strip_prefix(tab).unwrap_or(line).to_string()
    });
    if value == snapshot.value {
        return None;
    }

    let removed = snapshot.value.len() - value.len();
    let first_line = line_before(&snapshot.value, snapshot.selection_start);
    let start = if first_line.starts_with(tab) {
        snapshot.selection_start - tab.len()
    } else {
        snapshot.selection_start
    };
    let end = snapshot.selection_end.saturating_sub(removed).max(start);

    Some(Snapshot::new(value, start, end))
}

pub fn delete_indent(snapshot: &Snapshot, tab: &str) -> Option<Snapshot> {
    if snapshot.has_selection() {
        return None;
    }
    let before = snapshot.text_before_caret().strip_suffix(tab)?;

    let mut value = String::with_capacity(snapshot.value.len() - tab.len());
    value.push_str(before);
    value.push_str(snapshot.text_after_selection());
    Some(Snapshot::caret(value, before.len()))
}

/// Enter on a caret: carry indentation and list markers to the new line.
///
/// Indentation and marker continuation are separate edits, both computed
/// from the input snapshot. When both fire the marker edit (which already
/// contains the indentation) is the one left in the buffer.
pub fn newline_continue(snapshot: &Snapshot) -> Vec<Snapshot> {
    if snapshot.has_selection() {
        return Vec::new();
    }

    let line = line_before(&snapshot.value, snapshot.selection_start);
    let mut edits = Vec::new();

    if let Some(indent) = leading_whitespace(line) {
        edits.push(replace_selection(snapshot, &format!("\n{indent}")));
    }

    if let Some(marker) = list_marker(line) {
        let bullet = marker.continuation();
        edits.push(replace_selection(snapshot, &format!("\n{bullet} ")));
    }

    edits
}

pub fn wrap_or_duplicate(snapshot: &Snapshot, open: char, close: char) -> Snapshot {
    let mut value =
        String::with_capacity(snapshot.value.len() + open.len_utf8() + close.len_utf8());
    value.push_str(snapshot.text_before_caret());
    value.push(open);
    value.push_str(snapshot.selected_text());
    value.push(close);
    value.push_str(snapshot.text_after_selection());

    if snapshot.has_selection() {
        let end = snapshot.selection_end + open.len_utf8() + close.len_utf8();
        Snapshot::new(value, snapshot.selection_start, end)
    } else {
        Snapshot::caret(value, snapshot.selection_start + open.len_utf8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EditorConfig {
        EditorConfig::default()
    }

    fn single(command: Command, snapshot: &Snapshot) -> Snapshot {
        let mut edits = transform(command, snapshot, &config());
        assert_eq!(edits.len(), 1, "expected exactly one edit");
        edits.remove(0)
    }

    // --- Tab insertion ---

    #[test]
    fn test_insert_tab_at_caret() {
        let out = single(Command::InsertTab, &Snapshot::caret("ab", 1));
        assert_eq!(out.value, "a  b");
        assert_eq!((out.selection_start, out.selection_end), (3, 3));
    }

    #[test]
    fn test_insert_tab_uses_tab_characters() {
        let config = EditorConfig {
            tab_size: 1,
            insert_spaces: false,
            ..Default::default()
        };
        let edits = transform(Command::InsertTab, &Snapshot::caret("x", 0), &config);
        assert_eq!(edits[0].value, "\tx");
        assert_eq!(edits[0].selection_start, 1);
    }

    // --- Indent ---

    #[test]
    fn test_indent_only_covered_lines() {
        let snap = Snapshot::new("a\nb\nc\nd", 2, 5);
        let out = single(Command::Indent, &snap);
        assert_eq!(out.value, "a\n  b\n  c\nd");
        // Caret was at column 0 so the start stays put
        assert_eq!(out.selection_start, 2);
        assert_eq!(out.selection_end, 9);
    }

    #[test]
    fn test_indent_moves_start_after_text() {
        let snap = Snapshot::new("foo bar\nbaz", 4, 9);
        let out = single(Command::Indent, &snap);
        assert_eq!(out.value, "  foo bar\n  baz");
        assert_eq!(out.selection_start, 6);
        assert_eq!(out.selection_end, 13);
        assert_eq!(out.selected_text(), "bar\n  b");
    }

    #[test]
    fn test_indent_whitespace_before_caret_keeps_start() {
        let snap = Snapshot::new("  x\ny", 2, 5);
        let out = single(Command::Indent, &snap);
        assert_eq!(out.value, "    x\n  y");
        assert_eq!(out.selection_start, 2);
    }

    // --- Dedent ---

    #[test]
    fn test_dedent_strips_one_unit() {
        let snap = Snapshot::new("    a\n  b\nc", 4, 8);
        let out = single(Command::Dedent, &snap);
        assert_eq!(out.value, "  a\nb\nc");
        assert_eq!(out.selection_start, 2);
        assert_eq!(out.selection_end, 4);
    }

    #[test]
    fn test_dedent_leaves_unprefixed_lines() {
        let snap = Snapshot::new("x\n  y", 0, 5);
        let out = single(Command::Dedent, &snap);
        assert_eq!(out.value, "x\ny");
        // First line had no prefix, so the start does not move
        assert_eq!(out.selection_start, 0);
        assert_eq!(out.selection_end, 3);
    }

    #[test]
    fn test_dedent_noop_when_nothing_to_strip() {
        let snap = Snapshot::new("a\nb", 0, 3);
        assert!(transform(Command::Dedent, &snap, &config()).is_empty());
    }

    #[test]
    fn test_dedent_caret_only_line() {
        let snap = Snapshot::caret("  foo", 5);
        let out = single(Command::Dedent, &snap);
        assert_eq!(out.value, "foo");
        assert_eq!((out.selection_start, out.selection_end), (3, 3));
    }

    // --- Backspace over indentation ---

    #[test]
    fn test_delete_indent_removes_whole_unit() {
        let out = single(Command::DeleteIndent, &Snapshot::caret("a\n    b", 6));
        assert_eq!(out.value, "a\n  b");
        assert_eq!(out.selection_start, 4);
    }

    #[test]
    fn test_delete_indent_partial_unit_does_not_fire() {
        let snap = Snapshot::caret("a b", 2);
        assert!(transform(Command::DeleteIndent, &snap, &config()).is_empty());
    }

    #[test]
    fn test_delete_indent_ignores_selection() {
        let snap = Snapshot::new("    ", 2, 4);
        assert!(transform(Command::DeleteIndent, &snap, &config()).is_empty());
    }

    // --- Enter ---

    #[test]
    fn test_newline_keeps_indentation() {
        let snap = Snapshot::caret("    let x = 1;", 14);
        let edits = newline_continue(&snap);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].value, "    let x = 1;\n    ");
        assert_eq!(edits[0].selection_start, 19);
    }

    #[test]
    fn test_newline_unordered_list() {
        let snap = Snapshot::caret("  - item", 8);
        let edits = newline_continue(&snap);
        // Indentation and bullet both fire; the bullet edit comes last
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].value, "  - item\n  ");
        let last = edits.last().unwrap();
        assert_eq!(last.value, "  - item\n  - ");
        assert_eq!(last.selection_start, last.value.len());
        assert!(!last.has_selection());
    }

    #[test]
    fn test_newline_ordered_list_increments() {
        let snap = Snapshot::caret("3. item", 7);
        let edits = newline_continue(&snap);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].value, "3. item\n4. ");
        assert_eq!(edits[0].selection_start, 11);
    }

    #[test]
    fn test_newline_ordered_list_grows_digits() {
        let snap = Snapshot::caret("9. nine", 7);
        let edits = newline_continue(&snap);
        assert_eq!(edits[0].value, "9. nine\n10. ");
        assert_eq!(edits[0].selection_start, edits[0].value.len());
    }

    #[test]
    fn test_newline_blockquote() {
        let snap = Snapshot::caret("> quote", 7);
        let edits = newline_continue(&snap);
        assert_eq!(edits[0].value, "> quote\n> ");
        assert_eq!(edits[0].selection_start, 10);
    }

    #[test]
    fn test_newline_in_middle_of_text() {
        let snap = Snapshot::caret("- ab\nrest", 3);
        let edits = newline_continue(&snap);
        assert_eq!(edits[0].value, "- a\n- b\nrest");
        assert_eq!(edits[0].selection_start, 6);
    }

    #[test]
    fn test_newline_plain_line_does_not_fire() {
        let snap = Snapshot::caret("hello", 5);
        assert!(transform(Command::NewlineContinue, &snap, &config()).is_empty());
    }

    #[test]
    fn test_newline_with_selection_does_not_fire() {
        let snap = Snapshot::new("  - item", 4, 8);
        assert!(newline_continue(&snap).is_empty());
    }

    // --- Wrapping ---

    #[test]
    fn test_wrap_selection() {
        let snap = Snapshot::new("xabcx", 1, 4);
        let out = single(Command::WrapOrDuplicate('('), &snap);
        assert_eq!(out.value, "x(abc)x");
        assert_eq!(out.selected_text(), "(abc)");
    }

    #[test]
    fn test_duplicate_at_caret() {
        let out = single(Command::WrapOrDuplicate('('), &Snapshot::caret("xx", 1));
        assert_eq!(out.value, "x()x");
        assert_eq!((out.selection_start, out.selection_end), (2, 2));
    }

    #[test]
    fn test_symmetric_pair() {
        let out = single(Command::WrapOrDuplicate('"'), &Snapshot::new("say hi", 4, 6));
        assert_eq!(out.value, "say \"hi\"");
        assert_eq!(out.selected_text(), "\"hi\"");
    }

    #[test]
    fn test_unknown_trigger_does_nothing() {
        let snap = Snapshot::caret("x", 0);
        assert!(transform(Command::WrapOrDuplicate('<'), &snap, &config()).is_empty());
    }

    #[test]
    fn test_non_edit_commands_do_nothing() {
        let snap = Snapshot::caret("abc", 1);
        for command in [
            Command::Undo,
            Command::Redo,
            Command::ToggleCapture,
            Command::Blur,
            Command::Passthrough,
        ] {
            assert!(transform(command, &snap, &config()).is_empty());
        }
    }
}

use arboard::Clipboard;

use snapedit::editor::scanner::{line_before, line_index};
use snapedit::{EditorSink, Snapshot};

/// The visible text widget: buffer, caret and selection.
///
/// `anchor` is where a selection started and `head` is where the caret is;
/// either may come first. Everything the engine does not handle (plain
/// typing, arrows, deletion) is implemented here.
#[derive(Debug, Clone)]
pub struct EditorView {
    pub value: String,
    pub anchor: usize,
    pub head: usize,
    pub scroll_offset: usize,
    pub modified: bool,
    pub focused: bool,
}

impl Default for EditorView {
    fn default() -> Self {
        Self::new("")
    }
}

impl EditorSink for EditorView {
    fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.value = snapshot.value.clone();
        self.anchor = snapshot.selection_start;
        self.head = snapshot.selection_end;
    }

    fn notify_value_changed(&mut self, _value: &str) {
        self.modified = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }
}

impl EditorView {
    pub fn new(text: &str) -> Self {
        Self {
            value: text.to_string(),
            anchor: 0,
            head: 0,
            scroll_offset: 0,
            modified: false,
            focused: true,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.value.clone(), self.anchor, self.head)
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    pub fn selection_range(&self) -> (usize, usize) {
        (self.anchor.min(self.head), self.anchor.max(self.head))
    }

    pub fn selected_text(&self) -> Option<&str> {
        if !self.has_selection() {
            return None;
        }
        let (start, end) = self.selection_range();
        Some(&self.value[start..end])
    }

    pub fn cursor_line(&self) -> usize {
        line_index(&self.value, self.head)
    }

    /// Text of the caret's line up to the caret.
    pub fn text_before_cursor_on_line(&self) -> &str {
        line_before(&self.value, self.head)
    }

    pub fn line_count(&self) -> usize {
        self.value.split('\n').count()
    }

    // Editing

    pub fn insert_text(&mut self, text: &str) {
        let (start, end) = self.selection_range();
        self.value.replace_range(start..end, text);
        self.set_caret(start + text.len());
    }

    pub fn insert_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.insert_text(c.encode_utf8(&mut buf));
    }

    /// Returns whether the buffer changed.
    pub fn delete_selection(&mut self) -> bool {
        if !self.has_selection() {
            return false;
        }
        self.insert_text("");
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        match prev_boundary(&self.value, self.head) {
            Some(prev) => {
                self.value.replace_range(prev..self.head, "");
                self.set_caret(prev);
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        match next_boundary(&self.value, self.head) {
            Some(next) => {
                self.value.replace_range(self.head..next, "");
                true
            }
            None => false,
        }
    }

    // Cursor movement. `extend` keeps the anchor to grow the selection.

    pub fn move_left(&mut self, extend: bool) {
        if self.has_selection() && !extend {
            let (start, _) = self.selection_range();
            self.set_caret(start);
            return;
        }
        let target = prev_boundary(&self.value, self.head).unwrap_or(0);
        self.move_head(target, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        if self.has_selection() && !extend {
            let (_, end) = self.selection_range();
            self.set_caret(end);
            return;
        }
        let target = next_boundary(&self.value, self.head).unwrap_or(self.value.len());
        self.move_head(target, extend);
    }

    pub fn move_up(&mut self, extend: bool) {
        let start = line_start(&self.value, self.head);
        if start == 0 {
            return;
        }
        let column = self.value[start..self.head].chars().count();
        let prev_start = line_start(&self.value, start - 1);
        let target = advance_chars(&self.value, prev_start, start - 1, column);
        self.move_head(target, extend);
    }

    pub fn move_down(&mut self, extend: bool) {
        let end = line_end(&self.value, self.head);
        if end == self.value.len() {
            return;
        }
        let start = line_start(&self.value, self.head);
        let column = self.value[start..self.head].chars().count();
        let next_end = line_end(&self.value, end + 1);
        let target = advance_chars(&self.value, end + 1, next_end, column);
        self.move_head(target, extend);
    }

    pub fn move_to_line_start(&mut self, extend: bool) {
        let target = line_start(&self.value, self.head);
        self.move_head(target, extend);
    }

    pub fn move_to_line_end(&mut self, extend: bool) {
        let target = line_end(&self.value, self.head);
        self.move_head(target, extend);
    }

    pub fn select_all(&mut self) {
        self.anchor = 0;
        self.head = self.value.len();
    }

    fn move_head(&mut self, target: usize, extend: bool) {
        self.head = target;
        if !extend {
            self.anchor = target;
        }
    }

    fn set_caret(&mut self, position: usize) {
        self.anchor = position;
        self.head = position;
    }

    // Clipboard operations

    pub fn copy(&self) -> Option<String> {
        let text = self.selected_text()?.to_string();
        if let Ok(mut clipboard) = Clipboard::new() {
            let _ = clipboard.set_text(&text);
        }
        Some(text)
    }

    pub fn cut(&mut self) -> Option<String> {
        let text = self.copy()?;
        self.delete_selection();
        Some(text)
    }

    /// Returns whether anything was pasted.
    pub fn paste(&mut self) -> bool {
        let Ok(mut clipboard) = Clipboard::new() else {
            return false;
        };
        match clipboard.get_text() {
            Ok(text) if !text.is_empty() => {
                self.insert_text(&text);
                true
            }
            _ => false,
        }
    }

    // Scroll handling
    pub fn ensure_cursor_visible(&mut self, visible_height: usize) {
        let line = self.cursor_line();
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if visible_height > 0 && line >= self.scroll_offset + visible_height {
            self.scroll_offset = line - visible_height + 1;
        }
    }
}

fn prev_boundary(text: &str, offset: usize) -> Option<usize> {
    text[..offset]
        .chars()
        .next_back()
        .map(|c| offset - c.len_utf8())
}

fn next_boundary(text: &str, offset: usize) -> Option<usize> {
    text[offset..].chars().next().map(|c| offset + c.len_utf8())
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|p| p + 1).unwrap_or(0)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..]
        .find('\n')
        .map(|p| offset + p)
        .unwrap_or(text.len())
}

/// Offset `count` chars after `start`, not going past `limit`.
fn advance_chars(text: &str, start: usize, limit: usize, count: usize) -> usize {
    text[start..limit]
        .char_indices()
        .nth(count)
        .map(|(i, _)| start + i)
        .unwrap_or(limit)
}

use tracing::trace;

use super::keys::{Key, KeyInput, Platform};
use crate::config::WrapPair;

/// Logical operation requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Indent,
    Dedent,
    InsertTab,
    DeleteIndent,
    NewlineContinue,
    /// Wrap the selection in (or insert) the pair triggered by this character.
    WrapOrDuplicate(char),
    Undo,
    Redo,
    ToggleCapture,
    /// Escape: give focus back to the host. Never touches the buffer.
    Blur,
    Passthrough,
}

impl Command {
    /// Commands that compute a new buffer from the current one.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Command::Indent
                | Command::Dedent
                | Command::InsertTab
                | Command::DeleteIndent
                | Command::NewlineContinue
                | Command::WrapOrDuplicate(_)
        )
    }
}

/// Editor state the resolver needs besides the key itself.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub platform: Platform,
    pub capture_enabled: bool,
    pub ignore_tab_key: bool,
    pub has_selection: bool,
    pub wrap_pairs: &'a [WrapPair],
}

/// Map a key press to a command.
///
/// Precedence: Escape, Tab, Backspace, Enter, wrap triggers, undo, redo,
/// capture toggle. Anything else passes through to the host.
pub fn resolve(input: &KeyInput, ctx: &ResolveContext<'_>) -> Command {
    let command = resolve_inner(input, ctx);
    trace!(?input, ?command, platform = ctx.platform.label(), "resolved key");
    command
}

fn resolve_inner(input: &KeyInput, ctx: &ResolveContext<'_>) -> Command {
    let mods = input.modifiers;

    match input.key {
        Key::Escape => return Command::Blur,
        Key::Tab if !ctx.ignore_tab_key && ctx.capture_enabled => {
            return if mods.shift {
                Command::Dedent
            } else if ctx.has_selection {
                Command::Indent
            } else {
                Command::InsertTab
            };
        }
        Key::Backspace => {
            return if ctx.has_selection {
                Command::Passthrough
            } else {
                Command::DeleteIndent
            };
        }
        Key::Enter => {
            // Selections get the host's default newline
            return if ctx.has_selection {
                Command::Passthrough
            } else {
                Command::NewlineContinue
            };
        }
        Key::Char(c) if ctx.wrap_pairs.iter().any(|p| p.start == c) => {
            return Command::WrapOrDuplicate(c);
        }
        _ => {}
    }

    if is_undo(input, ctx.platform) {
        Command::Undo
    } else if is_redo(input, ctx.platform) {
        Command::Redo
    } else if is_capture_toggle(input, ctx.platform) {
        Command::ToggleCapture
    } else {
        Command::Passthrough
    }
}

fn is_undo(input: &KeyInput, platform: Platform) -> bool {
    let mods = input.modifiers;
    let chord = match platform {
        Platform::MacLike => mods.meta,
        Platform::Windows | Platform::Other => mods.ctrl,
    };
    chord && input.is_letter('z') && !mods.shift && !mods.alt
}

fn is_redo(input: &KeyInput, platform: Platform) -> bool {
    let mods = input.modifiers;
    let chord = match platform {
        Platform::MacLike => mods.meta && input.is_letter('z') && mods.shift,
        Platform::Windows => mods.ctrl && input.is_letter('y'),
        Platform::Other => mods.ctrl && input.is_letter('z') && mods.shift,
    };
    chord && !mods.alt
}

fn is_capture_toggle(input: &KeyInput, platform: Platform) -> bool {
    let mods = input.modifiers;
    let shift_ok = match platform {
        Platform::MacLike => mods.shift,
        Platform::Windows | Platform::Other => true,
    };
    mods.ctrl && input.is_letter('m') && shift_ok
}

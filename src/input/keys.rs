use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Keybinding family. Decides which chords mean undo, redo and capture toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    MacLike,
    Windows,
    #[default]
    Other,
}

impl Platform {
    /// Platform of the machine this binary was built for.
    pub const fn host() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::MacLike
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::MacLike => "mac",
            Platform::Windows => "windows",
            Platform::Other => "other",
        }
    }
}

/// Logical key identity, independent of the terminal or toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    Backspace,
    Delete,
    Enter,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Command key on Apple keyboards, Super/Windows key elsewhere.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const fn ctrl() -> Self {
        Modifiers {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub const fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }

    pub const fn meta() -> Self {
        Modifiers {
            meta: true,
            ..Self::NONE
        }
    }

    pub const fn with_shift(self) -> Self {
        Modifiers {
            shift: true,
            ..self
        }
    }

    pub const fn with_alt(self) -> Self {
        Modifiers { alt: true, ..self }
    }
}

/// A discrete key press delivered by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub const fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Whether this is the given letter, ignoring case (Shift turns `z` into `Z`).
    pub fn is_letter(&self, letter: char) -> bool {
        matches!(self.key, Key::Char(c) if c.eq_ignore_ascii_case(&letter))
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Modifiers {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            shift: mods.contains(KeyModifiers::SHIFT),
            alt: mods.contains(KeyModifiers::ALT),
            meta: mods.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        }
    }
}

impl From<KeyEvent> for KeyInput {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = Modifiers::from(event.modifiers);
        let key = match event.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Tab => Key::Tab,
            // Terminals report Shift+Tab as a separate key code
            KeyCode::BackTab => {
                modifiers.shift = true;
                Key::Tab
            }
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            _ => Key::Other,
        };
        KeyInput { key, modifiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_crossterm_char() {
        let input = KeyInput::from(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL));
        assert_eq!(input.key, Key::Char('z'));
        assert!(input.modifiers.ctrl);
        assert!(!input.modifiers.shift);
    }

    #[test]
    fn test_from_crossterm_backtab_sets_shift() {
        let input = KeyInput::from(KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE));
        assert_eq!(input.key, Key::Tab);
        assert!(input.modifiers.shift);
    }

    #[test]
    fn test_from_crossterm_super_is_meta() {
        let input = KeyInput::from(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::SUPER));
        assert!(input.modifiers.meta);
    }

    #[test]
    fn test_from_crossterm_unknown_key() {
        let input = KeyInput::from(KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE));
        assert_eq!(input.key, Key::Other);
    }

    #[test]
    fn test_is_letter_ignores_case() {
        let input = KeyInput::new(Key::Char('Z'), Modifiers::ctrl().with_shift());
        assert!(input.is_letter('z'));
        assert!(!input.is_letter('y'));
        assert!(!KeyInput::plain(Key::Tab).is_letter('z'));
    }

    #[test]
    fn test_platform_labels() {
        assert_eq!(Platform::MacLike.label(), "mac");
        assert_eq!(Platform::default(), Platform::Other);
    }
}

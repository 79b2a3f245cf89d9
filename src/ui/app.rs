use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use tracing::{debug, warn};

use snapedit::{EditorConfig, EditorSink, Engine, Key, KeyInput, Outcome, Session, Snapshot};

use super::{EditorView, Theme};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusType {
    Info,
    Success,
    Warning,
    Error,
}

pub struct App {
    pub theme: Theme,

    // Editor
    pub engine: Engine,
    pub view: EditorView,

    // Files
    pub file_path: Option<PathBuf>,
    pub session_path: Option<PathBuf>,

    // Status
    pub status_message: Option<(String, StatusType)>,
}

impl App {
    pub fn new(
        text: &str,
        config: EditorConfig,
        file_path: Option<PathBuf>,
        session_path: Option<PathBuf>,
        theme: Theme,
    ) -> Result<Self> {
        let engine = Engine::new(Snapshot::caret(text, 0), config)?;
        Ok(Self {
            theme,
            engine,
            view: EditorView::new(text),
            file_path,
            session_path,
            status_message: None,
        })
    }

    pub fn set_status(&mut self, message: impl Into<String>, status_type: StatusType) {
        self.status_message = Some((message.into(), status_type));
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if !self.view.focused {
            if key.code == KeyCode::Enter {
                self.view.focused = true;
                self.set_status("Editor focused", StatusType::Info);
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('s') if ctrl => {
                if let Err(err) = self.save_file() {
                    self.set_status(format!("Save failed: {err:#}"), StatusType::Error);
                }
                return Ok(());
            }
            KeyCode::Char('c') if ctrl => {
                if self.view.copy().is_some() {
                    self.set_status("Copied selection", StatusType::Info);
                }
                return Ok(());
            }
            KeyCode::Char('x') if ctrl => {
                if self.view.cut().is_some() {
                    self.content_changed();
                }
                return Ok(());
            }
            KeyCode::Char('v') if ctrl => {
                if self.view.paste() {
                    self.content_changed();
                }
                return Ok(());
            }
            KeyCode::Char('a') if ctrl => {
                self.view.select_all();
                return Ok(());
            }
            // Many terminals cannot tell Ctrl+M from Enter
            KeyCode::F(2) => {
                self.engine.toggle_capture();
                self.report_capture();
                return Ok(());
            }
            _ => {}
        }

        let input = KeyInput::from(key);
        let capture_before = self.engine.capture_enabled();
        let snapshot = self.view.snapshot();
        let outcome = self.engine.on_input_event(&input, &snapshot, &mut self.view);

        if self.engine.capture_enabled() != capture_before {
            self.report_capture();
        }
        if outcome == Outcome::Passthrough {
            self.default_key(input);
        }
        if !self.view.focused {
            self.set_status("Editor unfocused (Enter to focus)", StatusType::Info);
        }
        Ok(())
    }

    /// What a plain text widget does with keys the engine left alone.
    fn default_key(&mut self, input: KeyInput) {
        let mods = input.modifiers;
        let shift = mods.shift;

        let changed = match input.key {
            Key::Char(c) if !mods.ctrl && !mods.alt && !mods.meta => {
                self.view.insert_char(c);
                true
            }
            Key::Enter => {
                self.view.insert_char('\n');
                true
            }
            Key::Backspace => self.view.backspace(),
            Key::Delete => self.view.delete(),
            // An uncaptured Tab moves focus out of the editor
            Key::Tab => {
                self.view.blur();
                false
            }
            Key::Left => {
                self.view.move_left(shift);
                false
            }
            Key::Right => {
                self.view.move_right(shift);
                false
            }
            Key::Up => {
                self.view.move_up(shift);
                false
            }
            Key::Down => {
                self.view.move_down(shift);
                false
            }
            Key::Home => {
                self.view.move_to_line_start(shift);
                false
            }
            Key::End => {
                self.view.move_to_line_end(shift);
                false
            }
            _ => false,
        };

        if changed {
            self.content_changed();
        }
    }

    fn content_changed(&mut self) {
        let snapshot = self.view.snapshot();
        self.engine.on_content_changed(snapshot, &mut self.view);
    }

    fn report_capture(&mut self) {
        if self.engine.capture_enabled() {
            self.set_status("Tab key captured", StatusType::Info);
        } else {
            self.set_status("Tab key released", StatusType::Warning);
        }
    }

    pub fn save_file(&mut self) -> Result<()> {
        let Some(path) = self.file_path.clone() else {
            self.set_status("No file name given on the command line", StatusType::Warning);
            return Ok(());
        };
        std::fs::write(&path, &self.view.value)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.view.modified = false;
        self.set_status(format!("Saved {}", path.display()), StatusType::Success);
        Ok(())
    }

    /// Bring back the undo history of a previous run, if it belongs to the
    /// text that was loaded.
    pub fn restore_session(&mut self) -> Result<()> {
        let Some(path) = self.session_path.clone() else {
            return Ok(());
        };
        let Some(session) = Session::load(&path)? else {
            return Ok(());
        };

        let current = session.history.current().map(|e| e.snapshot.clone());
        match current {
            Some(snapshot) if snapshot.value == self.view.value => {
                let steps = session.history.len();
                self.engine.import_session(session)?;
                self.view.apply_snapshot(&snapshot);
                self.set_status(
                    format!("Restored {steps} undo steps"),
                    StatusType::Success,
                );
            }
            _ => debug!(path = %path.display(), "saved session does not match buffer"),
        }
        Ok(())
    }

    pub fn save_session(&self) -> Result<()> {
        let Some(path) = &self.session_path else {
            return Ok(());
        };
        let mut session = self.engine.export_session();
        session.save(path).inspect_err(|err| warn!(%err, "could not save session"))
    }
}

//! Per-keystroke pipeline: key press -> command -> new snapshot -> history -> sink.
//!
//! ```text
//! KeyInput ──resolve──▶ Command ──transform──▶ [Snapshot] ──record──▶ History
//!                                                   │
//!                                                   └──────apply──────▶ EditorSink
//! ```
//!
//! The engine never owns the visible text. The rendering surface hands in the
//! current [`Snapshot`] with every event and receives new snapshots through
//! its [`EditorSink`] implementation.
use std::time::Instant;
use tracing::{debug, trace};

use crate::config::{ConfigError, EditorConfig};
use crate::editor::{transform, History, HistoryError, Recorded, Snapshot};
use crate::input::{resolve, Command, KeyInput, ResolveContext};
use crate::session::Session;

/// Receiver of buffer updates, implemented by the rendering surface.
pub trait EditorSink {
    /// Replace the buffer value and selection in one step.
    fn apply_snapshot(&mut self, snapshot: &Snapshot);

    /// Fired after every applied edit, undo and redo.
    fn notify_value_changed(&mut self, value: &str);

    /// Escape was pressed: the host should move focus away from the editor.
    fn blur(&mut self) {}
}

pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Monotonic milliseconds, anchored to the wall clock once at creation so
/// timestamps still read as Unix time in exported sessions.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch_millis: i64,
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch_millis: chrono::Utc::now().timestamp_millis(),
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.epoch_millis.saturating_add(elapsed)
    }
}

/// What the rendering surface should do with the key press it reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The engine consumed the key; suppress the default behavior.
    Handled,
    /// Let the host run its default handling for the key.
    Passthrough,
}

/// Caller hook run before command resolution. Returning `true` marks the
/// key as handled and the engine does nothing with it.
pub type KeyHook = Box<dyn FnMut(&KeyInput) -> bool>;

pub struct Engine<C: Clock = SystemClock> {
    config: EditorConfig,
    history: History,
    capture: bool,
    clock: C,
    key_hook: Option<KeyHook>,
}

impl Engine<SystemClock> {
    pub fn new(initial: Snapshot, config: EditorConfig) -> Result<Self, ConfigError> {
        Self::with_clock(initial, config, SystemClock::new())
    }
}

impl<C: Clock> Engine<C> {
    pub fn with_clock(initial: Snapshot, config: EditorConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut engine = Self {
            config,
            history: History::new(),
            capture: true,
            clock,
            key_hook: None,
        };
        // Remember the starting caret and value
        engine.record(initial.normalized(), false);
        Ok(engine)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The snapshot the history cursor points at.
    pub fn current(&self) -> Option<&Snapshot> {
        self.history.current().map(|entry| &entry.snapshot)
    }

    pub fn capture_enabled(&self) -> bool {
        self.capture
    }

    pub fn toggle_capture(&mut self) -> bool {
        self.capture = !self.capture;
        debug!(capture = self.capture, "toggled tab capture");
        self.capture
    }

    pub fn set_key_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&KeyInput) -> bool + 'static,
    {
        self.key_hook = Some(Box::new(hook));
    }

    pub fn clear_key_hook(&mut self) {
        self.key_hook = None;
    }

    pub fn on_input_event<S>(&mut self, input: &KeyInput, current: &Snapshot, sink: &mut S) -> Outcome
    where
        S: EditorSink + ?Sized,
    {
        if let Some(hook) = self.key_hook.as_mut() {
            if hook(input) {
                trace!(?input, "key consumed by hook");
                return Outcome::Handled;
            }
        }

        let current = current.clone().normalized();
        let ctx = ResolveContext {
            platform: self.config.platform,
            capture_enabled: self.capture,
            ignore_tab_key: self.config.ignore_tab_key,
            has_selection: current.has_selection(),
            wrap_pairs: &self.config.wrap_pairs,
        };

        match resolve(input, &ctx) {
            Command::Passthrough => Outcome::Passthrough,
            Command::Blur => {
                sink.blur();
                Outcome::Passthrough
            }
            Command::Undo => {
                self.undo(sink);
                Outcome::Handled
            }
            Command::Redo => {
                self.redo(sink);
                Outcome::Handled
            }
            Command::ToggleCapture => {
                self.toggle_capture();
                Outcome::Handled
            }
            command if command.is_edit() => self.run_edit(command, current, sink),
            _ => Outcome::Passthrough,
        }
    }

    fn run_edit<S>(&mut self, command: Command, current: Snapshot, sink: &mut S) -> Outcome
    where
        S: EditorSink + ?Sized,
    {
        let edits = transform(command, &current, &self.config);
        if edits.is_empty() {
            // A captured Tab keeps focus even when there was nothing to dedent
            return if command == Command::Dedent {
                Outcome::Handled
            } else {
                Outcome::Passthrough
            };
        }

        let mut observed = current;
        for edit in edits {
            self.apply_edit(&observed, edit.clone(), sink);
            observed = edit;
        }
        Outcome::Handled
    }

    /// Record a structural edit and push it to the sink.
    ///
    /// `observed` is what the sink showed right before the edit; its
    /// selection is written back into the current entry so undo restores
    /// the caret the user actually had.
    pub fn apply_edit<S>(&mut self, observed: &Snapshot, next: Snapshot, sink: &mut S)
    where
        S: EditorSink + ?Sized,
    {
        self.history
            .patch_selection(observed.selection_start, observed.selection_end);
        let next = next.normalized();
        self.record(next.clone(), false);
        sink.apply_snapshot(&next);
        sink.notify_value_changed(&next.value);
    }

    /// Organic edit made by the host (typing, paste). May merge with the
    /// previous entry.
    pub fn on_content_changed<S>(&mut self, snapshot: Snapshot, sink: &mut S)
    where
        S: EditorSink + ?Sized,
    {
        let snapshot = snapshot.normalized();
        let value = snapshot.value.clone();
        self.record(snapshot, true);
        sink.notify_value_changed(&value);
    }

    pub fn undo<S>(&mut self, sink: &mut S) -> bool
    where
        S: EditorSink + ?Sized,
    {
        match self.history.undo() {
            Some(record) => {
                debug!(offset = ?self.history.offset(), "undo");
                sink.apply_snapshot(&record);
                sink.notify_value_changed(&record.value);
                true
            }
            None => false,
        }
    }

    pub fn redo<S>(&mut self, sink: &mut S) -> bool
    where
        S: EditorSink + ?Sized,
    {
        match self.history.redo() {
            Some(record) => {
                debug!(offset = ?self.history.offset(), "redo");
                sink.apply_snapshot(&record);
                sink.notify_value_changed(&record.value);
                true
            }
            None => false,
        }
    }

    pub fn export_session(&self) -> Session {
        debug!(entries = self.history.len(), "exporting session");
        Session::new(self.history.clone())
    }

    /// Replace the history wholesale. The current state is kept if the
    /// imported history is inconsistent.
    pub fn import_session(&mut self, session: Session) -> Result<(), HistoryError> {
        session.history.validate()?;
        debug!(entries = session.history.len(), "imported session");
        self.history = session.history;
        Ok(())
    }

    fn record(&mut self, snapshot: Snapshot, overwrite: bool) {
        let timestamp = self.clock.now_millis();
        if self.history.record(snapshot, overwrite, timestamp) == Recorded::Merged {
            trace!("merged edit into current history entry");
        }
    }
}

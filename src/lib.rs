pub mod config;
pub mod editor;
pub mod engine;
pub mod input;
pub mod session;

pub use config::{ConfigError, EditorConfig, WrapPair};
pub use editor::{History, HistoryEntry, Snapshot};
pub use engine::{Clock, EditorSink, Engine, Outcome, SystemClock};
pub use input::{Command, Key, KeyInput, Modifiers, Platform};
pub use session::Session;

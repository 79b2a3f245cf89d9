use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::editor::History;

/// Exportable editing session: the full undo history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub history: History,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(history: History) -> Self {
        Self {
            history,
            saved_at: None,
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snapedit")
            .join("session.json")
    }

    /// Load a saved session. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session {}", path.display()))?;
        let session: Session = serde_json::from_str(&content)
            .with_context(|| format!("Malformed session {}", path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.saved_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(&*self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write session {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Snapshot;

    fn sample_history() -> History {
        let mut history = History::new();
        history.record(Snapshot::caret("a", 1), false, 100);
        history.record(Snapshot::new("a\n  b", 2, 5), false, 200);
        history
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut session = Session::new(sample_history());
        session.save(&path).unwrap();
        assert!(session.saved_at.is_some());

        let loaded = Session::load(&path).unwrap().unwrap();
        assert_eq!(loaded.history, sample_history());
        assert_eq!(loaded.saved_at, session.saved_at);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Session::load(&dir.path().join("none.json")).unwrap().is_none());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Session::load(&path).is_err());
    }

    #[test]
    fn test_saved_at_defaults_to_none() {
        let json = r#"{"history":{"stack":[],"offset":-1}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.saved_at.is_none());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_session_json_layout() {
        let session = Session::new(sample_history());
        let json = serde_json::to_value(&session).unwrap();
        let stack = &json["history"]["stack"];
        assert_eq!(stack[1]["value"], "a\n  b");
        assert_eq!(stack[1]["selection_start"], 2);
        assert_eq!(stack[1]["timestamp"], 200);
        assert_eq!(json["history"]["offset"], 1);
    }
}

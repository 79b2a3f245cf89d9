use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::input::Platform;

/// Characters that wrap a selection, or get inserted as a pair at the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapPair {
    pub start: char,
    /// Closing character. Defaults to `start` (quotes, emphasis markers).
    #[serde(default)]
    pub end: Option<char>,
}

impl WrapPair {
    pub const fn new(start: char, end: char) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub const fn symmetric(ch: char) -> Self {
        Self {
            start: ch,
            end: None,
        }
    }

    pub fn end(&self) -> char {
        self.end.unwrap_or(self.start)
    }
}

pub const DEFAULT_WRAP_PAIRS: &[WrapPair] = &[
    WrapPair::new('(', ')'),
    WrapPair::new('{', '}'),
    WrapPair::new('[', ']'),
    WrapPair::symmetric('"'),
    WrapPair::symmetric('\''),
    WrapPair::symmetric('*'),
    WrapPair::symmetric('~'),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tab size must be at least 1, got {0}")]
    InvalidTabSize(usize),
    #[error("wrap trigger {0:?} is configured more than once")]
    DuplicateWrapTrigger(char),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_size: usize,
    pub insert_spaces: bool,
    /// Leave Tab / Shift+Tab to the host entirely.
    pub ignore_tab_key: bool,
    pub wrap_pairs: Vec<WrapPair>,
    /// Selects the undo/redo/capture keybinding scheme.
    pub platform: Platform,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 2,
            insert_spaces: true,
            ignore_tab_key: false,
            wrap_pairs: DEFAULT_WRAP_PAIRS.to_vec(),
            platform: Platform::default(),
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::InvalidTabSize(self.tab_size));
        }

        for (i, pair) in self.wrap_pairs.iter().enumerate() {
            if self.wrap_pairs[..i].iter().any(|p| p.start == pair.start) {
                return Err(ConfigError::DuplicateWrapTrigger(pair.start));
            }
        }

        Ok(())
    }

    /// The indentation unit inserted by Tab and removed by Shift+Tab / Backspace.
    pub fn tab_character(&self) -> String {
        let unit = if self.insert_spaces { " " } else { "\t" };
        unit.repeat(self.tab_size)
    }

    pub fn wrap_pair(&self, trigger: char) -> Option<&WrapPair> {
        self.wrap_pairs.iter().find(|p| p.start == trigger)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snapedit")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.tab_size, 2);
        assert!(config.insert_spaces);
        assert!(!config.ignore_tab_key);
        assert_eq!(config.wrap_pairs.len(), 7);
        assert_eq!(config.platform, Platform::Other);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tab_character_spaces() {
        let config = EditorConfig {
            tab_size: 4,
            ..Default::default()
        };
        assert_eq!(config.tab_character(), "    ");
    }

    #[test]
    fn test_tab_character_tabs() {
        let config = EditorConfig {
            tab_size: 2,
            insert_spaces: false,
            ..Default::default()
        };
        assert_eq!(config.tab_character(), "\t\t");
    }

    #[test]
    fn test_zero_tab_size_rejected() {
        let config = EditorConfig {
            tab_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTabSize(0))
        ));
    }

    #[test]
    fn test_duplicate_wrap_trigger_rejected() {
        let config = EditorConfig {
            wrap_pairs: vec![WrapPair::new('(', ')'), WrapPair::symmetric('(')],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateWrapTrigger('('))
        ));
    }

    #[test]
    fn test_wrap_pair_end_defaults_to_start() {
        assert_eq!(WrapPair::symmetric('"').end(), '"');
        assert_eq!(WrapPair::new('[', ']').end(), ']');
    }

    #[test]
    fn test_wrap_pair_lookup() {
        let config = EditorConfig::default();
        assert_eq!(config.wrap_pair('{').map(|p| p.end()), Some('}'));
        assert!(config.wrap_pair('<').is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EditorConfig::from_toml_str(
            r#"
tab_size = 4
insert_spaces = false
platform = "mac_like"
"#,
        )
        .unwrap();
        assert_eq!(config.tab_size, 4);
        assert!(!config.insert_spaces);
        assert_eq!(config.platform, Platform::MacLike);
        // Unset fields fall back to defaults
        assert_eq!(config.wrap_pairs, DEFAULT_WRAP_PAIRS.to_vec());
    }

    #[test]
    fn test_from_toml_wrap_pairs() {
        let config = EditorConfig::from_toml_str(
            r#"
wrap_pairs = [
    { start = "<", end = ">" },
    { start = "_" },
]
"#,
        )
        .unwrap();
        assert_eq!(config.wrap_pairs.len(), 2);
        assert_eq!(config.wrap_pairs[0].end(), '>');
        assert_eq!(config.wrap_pairs[1].end(), '_');
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        assert!(matches!(
            EditorConfig::from_toml_str("tab_size = 0"),
            Err(ConfigError::InvalidTabSize(0))
        ));
        assert!(matches!(
            EditorConfig::from_toml_str("tab_size = \"two\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tab_size = 8\nignore_tab_key = true\n").unwrap();
        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.tab_size, 8);
        assert!(config.ignore_tab_key);
    }
}

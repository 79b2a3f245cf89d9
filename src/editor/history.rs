use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::debug;

use super::scanner::trailing_word;
use super::snapshot::Snapshot;

/// Maximum number of entries kept in the undo history.
pub const HISTORY_LIMIT: usize = 100;

/// Edits closer together than this may be merged into one undo step.
pub const HISTORY_TIME_GAP_MS: i64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    /// Milliseconds, as read from the engine clock when recorded.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Appended,
    /// The entry under the cursor was replaced in place.
    Merged,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history holds {len} entries, limit is {limit}")]
    TooManyEntries { len: usize, limit: usize },
    #[error("history offset {offset} is outside a stack of {len} entries")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("history has {0} entries but no offset")]
    MissingOffset(usize),
    #[error("history entry {0} has an invalid selection")]
    InvalidSelection(usize),
    #[error("history limit {0} is outside 1..={max}", max = HISTORY_LIMIT)]
    InvalidLimit(usize),
}

/// Linear undo history of buffer snapshots.
///
/// `offset` points at the entry matching the current buffer; `None` means the
/// history is empty. Recording while the offset is behind the newest entry
/// discards everything after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    stack: VecDeque<HistoryEntry>,
    #[serde(with = "offset_repr")]
    offset: Option<usize>,
    /// Never persisted: an imported history always gets the standard bound.
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    HISTORY_LIMIT
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            stack: VecDeque::new(),
            offset: None,
            limit: limit.clamp(1, HISTORY_LIMIT),
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.offset.and_then(|o| self.stack.get(o))
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.offset, Some(o) if o > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.offset {
            Some(o) => o + 1 < self.stack.len(),
            None => false,
        }
    }

    pub fn record(&mut self, snapshot: Snapshot, overwrite: bool, timestamp: i64) -> Recorded {
        if let Some(offset) = self.offset {
            // Drop the redo tail
            self.stack.truncate(offset + 1);
        }

        if overwrite && self.continues_word(&snapshot, timestamp) {
            if let Some(entry) = self.offset.and_then(|o| self.stack.get_mut(o)) {
                *entry = HistoryEntry {
                    snapshot,
                    timestamp,
                };
                return Recorded::Merged;
            }
        }

        self.stack.push_back(HistoryEntry {
            snapshot,
            timestamp,
        });
        self.offset = Some(self.stack.len() - 1);

        let excess = self.stack.len().saturating_sub(self.limit);
        if excess > 0 {
            self.stack.drain(..excess);
            self.offset = self.offset.map(|o| o.saturating_sub(excess));
            debug!(evicted = excess, "history limit reached");
        }

        debug_assert!(self.validate().is_ok());
        Recorded::Appended
    }

    /// True when `snapshot` extends the word being typed in the current
    /// entry, within the merge time window.
    fn continues_word(&self, snapshot: &Snapshot, timestamp: i64) -> bool {
        let Some(last) = self.current() else {
            return false;
        };
        // A clock that stepped backwards never merges
        let elapsed = timestamp.saturating_sub(last.timestamp);
        if !(0..HISTORY_TIME_GAP_MS).contains(&elapsed) {
            return false;
        }

        let previous = trailing_word(&last.snapshot.value, last.snapshot.selection_start);
        let current = trailing_word(&snapshot.value, snapshot.selection_start);
        match (previous, current) {
            (Some(previous), Some(current)) => current.starts_with(previous),
            _ => false,
        }
    }

    /// Overwrite the selection stored in the current entry, keeping its value.
    pub fn patch_selection(&mut self, selection_start: usize, selection_end: usize) {
        if let Some(entry) = self.offset.and_then(|o| self.stack.get_mut(o)) {
            entry.snapshot = entry.snapshot.with_selection(selection_start, selection_end);
        }
    }

    pub fn undo(&mut self) -> Option<Snapshot> {
        let offset = self.offset?.checked_sub(1)?;
        let record = self.stack.get(offset)?.snapshot.clone();
        self.offset = Some(offset);
        Some(record)
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        let offset = self.offset? + 1;
        let record = self.stack.get(offset)?.snapshot.clone();
        self.offset = Some(offset);
        Some(record)
    }

    pub fn validate(&self) -> Result<(), HistoryError> {
        if !(1..=HISTORY_LIMIT).contains(&self.limit) {
            return Err(HistoryError::InvalidLimit(self.limit));
        }

        let len = self.stack.len();
        if len > self.limit {
            return Err(HistoryError::TooManyEntries {
                len,
                limit: self.limit,
            });
        }

        match self.offset {
            Some(offset) if offset >= len => {
                return Err(HistoryError::OffsetOutOfRange { offset, len });
            }
            None if len > 0 => return Err(HistoryError::MissingOffset(len)),
            _ => {}
        }

        for (i, entry) in self.stack.iter().enumerate() {
            if entry.snapshot.clone().normalized() != entry.snapshot {
                return Err(HistoryError::InvalidSelection(i));
            }
        }

        Ok(())
    }
}

/// Stores the offset as an integer with `-1` for an empty history.
mod offset_repr {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(offset: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match offset {
            Some(o) => serializer.serialize_i64(*o as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        match raw {
            -1 => Ok(None),
            o if o >= 0 => Ok(Some(o as usize)),
            o => Err(de::Error::custom(format!("invalid history offset {o}"))),
        }
    }
}

use serde::{Deserialize, Serialize};

/// A buffer value together with its selection range.
///
/// Offsets are byte offsets into `value`. Values built through
/// [`Snapshot::new`] always satisfy `selection_start <= selection_end <= value.len()`
/// with both offsets on char boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            value: String::new(),
            selection_start: 0,
            selection_end: 0,
        }
    }
}

impl Snapshot {
    /// Build a snapshot, clamping both offsets into the buffer and
    /// reordering them so the start never exceeds the end.
    pub fn new(value: impl Into<String>, selection_start: usize, selection_end: usize) -> Self {
        let value = value.into();
        let a = floor_char_boundary(&value, selection_start);
        let b = floor_char_boundary(&value, selection_end);
        Self {
            value,
            selection_start: a.min(b),
            selection_end: a.max(b),
        }
    }

    /// A snapshot with a collapsed selection (a plain caret).
    pub fn caret(value: impl Into<String>, position: usize) -> Self {
        Self::new(value, position, position)
    }

    /// Re-apply the clamping rules to a snapshot that may have been
    /// constructed field by field (e.g. deserialized or built by a collaborator).
    pub fn normalized(self) -> Self {
        Self::new(self.value, self.selection_start, self.selection_end)
    }

    pub fn has_selection(&self) -> bool {
        self.selection_start != self.selection_end
    }

    pub fn selected_text(&self) -> &str {
        &self.value[self.selection_start..self.selection_end]
    }

    pub fn text_before_caret(&self) -> &str {
        &self.value[..self.selection_start]
    }

    pub fn text_after_selection(&self) -> &str {
        &self.value[self.selection_end..]
    }

    /// Same buffer, different selection.
    pub fn with_selection(&self, selection_start: usize, selection_end: usize) -> Self {
        Self::new(self.value.clone(), selection_start, selection_end)
    }
}

/// Largest char boundary in `text` that is `<= offset`, clamped to the text length.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    let mut idx = offset;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_valid_selection() {
        let snap = Snapshot::new("hello", 1, 3);
        assert_eq!(snap.selection_start, 1);
        assert_eq!(snap.selection_end, 3);
        assert_eq!(snap.selected_text(), "el");
    }

    #[test]
    fn test_new_clamps_out_of_range() {
        let snap = Snapshot::new("abc", 2, 99);
        assert_eq!(snap.selection_start, 2);
        assert_eq!(snap.selection_end, 3);
    }

    #[test]
    fn test_new_reorders_inverted_selection() {
        let snap = Snapshot::new("abcdef", 5, 1);
        assert_eq!(snap.selection_start, 1);
        assert_eq!(snap.selection_end, 5);
    }

    #[test]
    fn test_new_floors_to_char_boundary() {
        // 'é' is two bytes, so offset 2 is inside it
        let snap = Snapshot::caret("aé", 2);
        assert_eq!(snap.selection_start, 1);
        assert_eq!(snap.selection_end, 1);
    }

    #[test]
    fn test_normalized_fixes_raw_fields() {
        let raw = Snapshot {
            value: "xy".to_string(),
            selection_start: 7,
            selection_end: 0,
        };
        let snap = raw.normalized();
        assert_eq!((snap.selection_start, snap.selection_end), (0, 2));
    }

    #[test]
    fn test_caret_has_no_selection() {
        let snap = Snapshot::caret("abc", 1);
        assert!(!snap.has_selection());
        assert_eq!(snap.text_before_caret(), "a");
        assert_eq!(snap.text_after_selection(), "bc");
    }

    #[test]
    fn test_default_is_empty() {
        let snap = Snapshot::default();
        assert_eq!(snap.value, "");
        assert!(!snap.has_selection());
    }
}

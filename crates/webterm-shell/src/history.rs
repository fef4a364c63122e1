/// Command history with a navigation cursor
///
/// Entries are kept in submission order, duplicates included. The cursor
/// ranges over `0..=len`; `len` means "editing a fresh line".
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted command and park the cursor past the end
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        self.cursor = self.entries.len();
    }

    /// Move toward older entries
    /// Returns the recalled entry, or None when already at the oldest one.
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entry_at_cursor()
    }

    /// Move toward newer entries
    /// Returns the recalled text ("" once past the newest entry), or None at the end.
    pub fn recall_next(&mut self) -> Option<&str> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        if self.cursor == self.entries.len() {
            return Some("");
        }
        self.entry_at_cursor()
    }

    /// Abandon navigation without recalling anything
    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }

    fn entry_at_cursor(&self) -> Option<&str> {
        let entry = self.entries.get(self.cursor);
        if entry.is_none() {
            // Cursor is kept within 0..=len, so this is a bookkeeping bug
            log::warn!(
                "History cursor {} out of range for {} entries",
                self.cursor,
                self.entries.len()
            );
            debug_assert!(false, "history cursor out of range");
        }
        entry.map(String::as_str)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(entries: &[&str]) -> History {
        let mut history = History::new();
        for entry in entries {
            history.push(entry.to_string());
        }
        history
    }

    #[test]
    fn test_empty_history_does_not_move() {
        let mut history = History::new();
        assert_eq!(history.recall_previous(), None);
        assert_eq!(history.recall_next(), None);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_push_parks_cursor_at_end() {
        let history = history_of(&["a", "b"]);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_walk_back_and_forth() {
        let mut history = history_of(&["a", "b", "c"]);

        assert_eq!(history.recall_previous(), Some("c"));
        assert_eq!(history.recall_previous(), Some("b"));
        assert_eq!(history.recall_previous(), Some("a"));
        assert_eq!(history.recall_previous(), None);
        assert_eq!(history.cursor(), 0);

        assert_eq!(history.recall_next(), Some("b"));
        assert_eq!(history.recall_next(), Some("c"));
        assert_eq!(history.recall_next(), Some(""));
        assert_eq!(history.recall_next(), None);
        assert_eq!(history.cursor(), 3);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let history = history_of(&["ls", "ls"]);
        assert_eq!(history.entries(), &["ls".to_string(), "ls".to_string()]);
    }

    #[test]
    fn test_reset_cursor() {
        let mut history = history_of(&["a", "b"]);
        history.recall_previous();
        history.recall_previous();
        history.reset_cursor();
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.recall_next(), None);
    }
}

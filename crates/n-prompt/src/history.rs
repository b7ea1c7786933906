//! Submitted-line history with up/down navigation.
//!
//! [`HistoryLog`] keeps two lists:
//!
//! - **entries**: every submitted line, oldest first. Only grows.
//! - **scratch**: a copy of the entries plus one empty slot for the line
//!   being typed. Navigating away from a line saves its current (possibly
//!   edited) text into its scratch slot, so walking back to it shows the
//!   edit. The scratch copy is rebuilt on [`add`](HistoryLog::add) and
//!   [`clear`](HistoryLog::clear), which throws those edits away.
//!
//! ```text
//! entries: ["ls", "cd /tmp"]
//! scratch: ["ls", "cd /tmp", ""]
//!                             ^ selected
//! ```

use crate::buffer::Buffer;

// ---------------------------------------------------------------------------
// HistoryLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<String>,
    scratch: Vec<String>,
    /// Index into `scratch`. Always in range.
    selected: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scratch: vec![String::new()],
            selected: 0,
        }
    }

    /// A log seeded with `entries`, oldest first.
    #[must_use]
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut log = Self {
            entries: entries.into_iter().map(Into::into).collect(),
            scratch: Vec::new(),
            selected: 0,
        };
        log.clear();
        log
    }

    /// Append a submitted line and restart navigation.
    pub fn add(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.clear();
    }

    /// Discard navigation edits and point at the empty slot after the last
    /// entry.
    pub fn clear(&mut self) {
        self.scratch.clone_from(&self.entries);
        self.scratch.push(String::new());
        self.selected = self.scratch.len() - 1;
    }

    /// Step to the older line. `buf` is the text being left; it is saved in
    /// the current slot. Returns `None` when already at the oldest line.
    pub fn older(&mut self, buf: &Buffer) -> Option<Buffer> {
        if self.scratch.len() == 1 || self.selected == 0 {
            return None;
        }
        self.scratch[self.selected] = buf.text().to_owned();
        self.selected -= 1;
        Some(Buffer::with_text(&self.scratch[self.selected]))
    }

    /// Step to the newer line. Returns `None` when already at the newest.
    pub fn newer(&mut self, buf: &Buffer) -> Option<Buffer> {
        if self.selected + 1 >= self.scratch.len() {
            return None;
        }
        self.scratch[self.selected] = buf.text().to_owned();
        self.selected += 1;
        Some(Buffer::with_text(&self.scratch[self.selected]))
    }

    // -- Accessors ----------------------------------------------------------

    /// Every submitted line, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The most recent submission.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Up to `n` most recent submissions, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().take(n).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current index into the scratch list.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Add / clear --------------------------------------------------------

    #[test]
    fn add_rebuilds_scratch() {
        let mut h = HistoryLog::new();
        h.add("echo 1");
        assert_eq!(h.entries(), ["echo 1"]);
        assert_eq!(h.scratch, vec!["echo 1", ""]);
        assert_eq!(h.selected(), 1);
    }

    #[test]
    fn clear_discards_edits() {
        let mut h = HistoryLog::new();
        h.add("foo");
        let edited = h.older(&Buffer::with_text("draft"));
        assert!(edited.is_some());
        h.clear();
        assert_eq!(h.scratch, vec!["foo", ""]);
        assert_eq!(h.selected(), 1);
    }

    // -- Navigation ---------------------------------------------------------

    #[test]
    fn older_then_stops() {
        let mut h = HistoryLog::new();
        h.add("echo 1");

        let buf = h.older(&Buffer::with_text("echo 2"));
        assert_eq!(buf.as_ref().map(Buffer::text), Some("echo 1"));

        assert!(h.older(&Buffer::with_text("echo 1")).is_none());
    }

    #[test]
    fn older_returns_most_recent_first() {
        let mut h = HistoryLog::new();
        h.add("echo 1");
        h.add("echo 2");
        let buf = h.older(&Buffer::new()).map(|b| b.text().to_owned());
        assert_eq!(buf.as_deref(), Some("echo 2"));
    }

    #[test]
    fn older_puts_cursor_at_end() {
        let mut h = HistoryLog::with_entries(["git status"]);
        let buf = h.older(&Buffer::new());
        assert_eq!(buf.map(|b| b.cursor_position().get()), Some(10));
    }

    #[test]
    fn newer_at_newest_is_none() {
        let mut h = HistoryLog::with_entries(["a"]);
        assert!(h.newer(&Buffer::new()).is_none());
    }

    #[test]
    fn newer_restores_draft() {
        let mut h = HistoryLog::with_entries(["a", "b"]);
        let draft = Buffer::with_text("typing");
        let older = h.older(&draft);
        assert_eq!(older.as_ref().map(Buffer::text), Some("b"));

        let back = h.newer(&Buffer::with_text("b"));
        assert_eq!(back.as_ref().map(Buffer::text), Some("typing"));
    }

    #[test]
    fn edits_to_old_lines_are_kept_while_navigating() {
        let mut h = HistoryLog::with_entries(["a", "b"]);
        let _ = h.older(&Buffer::new());
        let _ = h.older(&Buffer::with_text("b edited"));
        let b = h.newer(&Buffer::with_text("a"));
        assert_eq!(b.as_ref().map(Buffer::text), Some("b edited"));
        assert_eq!(h.entries(), ["a", "b"]);
    }

    #[test]
    fn empty_log_never_moves() {
        let mut h = HistoryLog::new();
        assert!(h.older(&Buffer::new()).is_none());
        assert!(h.newer(&Buffer::new()).is_none());
    }

    // -- Accessors ----------------------------------------------------------

    #[test]
    fn accessors() {
        let h = HistoryLog::with_entries(["one", "two", "three"]);
        assert_eq!(h.len(), 3);
        assert!(!h.is_empty());
        assert_eq!(h.last(), Some("three"));
        assert_eq!(h.get(0), Some("one"));
        assert_eq!(h.get(9), None);
        assert_eq!(h.recent(2).collect::<Vec<_>>(), vec!["three", "two"]);
    }
}

//! Linear undo/redo history over full content snapshots.
//!
//! One sequence plus a cursor rather than separate undo and redo stacks: the
//! cursor always points at the snapshot matching the live content, and pushing
//! after an undo discards everything past the cursor.

/// Snapshot sequence with a cursor into it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStack {
    /// Content snapshots, oldest first
    entries: Vec<String>,
    /// Index of the snapshot equal to the current content
    cursor: Option<usize>,
    /// Maximum number of snapshots kept (unbounded when `None`)
    limit: Option<usize>,
}

impl HistoryStack {
    /// Create an empty, unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty history that keeps at most `limit` snapshots
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Drop everything and start over from a single snapshot
    pub fn reset(&mut self, initial: impl Into<String>) {
        self.entries.clear();
        self.entries.push(initial.into());
        self.cursor = Some(0);
    }

    /// Record a new snapshot after the cursor, discarding the redo branch
    pub fn push(&mut self, content: impl Into<String>) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(content.into());

        // Limit history size
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.remove(0);
            }
        }

        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one snapshot, returning the content to show
    pub fn undo(&mut self) -> Option<&str> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                Some(self.entries[c - 1].as_str())
            }
            _ => None,
        }
    }

    /// Step forward one snapshot, returning the content to show
    pub fn redo(&mut self) -> Option<&str> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                Some(self.entries[c + 1].as_str())
            }
            _ => None,
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Cursor position, `None` while empty
    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> Option<&str> {
        self.cursor.map(|c| self.entries[c].as_str())
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

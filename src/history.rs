// Copyright (c) 2024 Mike Tsao

//! Linear undo/redo over immutable snapshots.

use crate::types::EntityId;
use log::debug;

/// One undo step for an editor: the serialized audio state plus what was
/// selected at the time.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// JSON, as produced by the editor's serializer.
    pub state: String,
    #[allow(missing_docs)]
    pub selected: Vec<EntityId>,
}
impl Snapshot {
    /// True if `state` describes the same audio state as this snapshot.
    /// Map order in the JSON doesn't matter.
    pub fn has_state(&self, state: &str) -> bool {
        if self.state == state {
            return true;
        }
        match (
            serde_json::from_str::<serde_json::Value>(&self.state),
            serde_json::from_str::<serde_json::Value>(state),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// An ordered list of entries with a cursor. Adding an entry while the cursor
/// isn't at the tail discards everything after the cursor first. Entries are
/// handed out by shared reference only, so they can't be altered once added.
#[derive(Debug)]
pub struct HistoryStack<T> {
    entries: Vec<T>,
    cursor: usize,
    max_entries: Option<usize>,
}
impl<T> HistoryStack<T> {
    /// Creates a stack whose only entry is `initial`. If `max_entries` is
    /// given, the oldest entries are dropped to stay within it.
    pub fn new_with(initial: T, max_entries: Option<usize>) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            max_entries: max_entries.map(|m| m.max(1)),
        }
    }

    #[allow(missing_docs)]
    pub fn add_entry(&mut self, entry: T) {
        if !self.is_at_end() {
            let discarded = self.entries.len() - self.cursor - 1;
            debug!("history: discarding {discarded} redo entries");
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
        if let Some(max_entries) = self.max_entries {
            let excess = self.entries.len().saturating_sub(max_entries);
            if excess > 0 {
                self.entries.drain(..excess);
                self.cursor -= excess;
            }
        }
    }

    /// Steps back and returns the entry now under the cursor, or `None` if
    /// already at the start.
    pub fn go_backwards(&mut self) -> Option<&T> {
        if self.is_at_start() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Steps forward and returns the entry now under the cursor, or `None`
    /// if already at the end.
    pub fn go_forwards(&mut self) -> Option<&T> {
        if self.is_at_end() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    #[allow(missing_docs)]
    pub fn is_at_start(&self) -> bool {
        self.cursor == 0
    }

    #[allow(missing_docs)]
    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 >= self.entries.len()
    }

    /// The entry under the cursor.
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    #[allow(missing_docs)]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    #[allow(missing_docs)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a stack holds at least its initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets everything and starts over from `entry`.
    pub fn clear_to(&mut self, entry: T) {
        self.entries = vec![entry];
        self.cursor = 0;
    }
}

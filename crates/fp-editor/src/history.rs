//! Document history: the undo/redo snapshot timeline and the named
//! saved-state timeline.
//!
//! Both timelines only ever receive successfully serialized documents.
//! Undo, redo and saved-state navigation are two-phase: the caller asks for
//! a target, reloads its bytes, and commits the move only once the reload
//! succeeded. A failed reload leaves every cursor where it was.
//!
//! Loading a saved state replaces the live document with bytes that did not
//! come from the snapshot timeline. The snapshot timeline then marks itself
//! *detached*: its cursor is kept, `undo` returns to the snapshot at the
//! cursor, and `redo` is unavailable until the next `push`. While attached,
//! the live document always equals `snapshots[cursor]`.

use chrono::{DateTime, Utc};
use fp_core::model::Annotation;
use serde::Serialize;
use std::sync::Arc;

/// Immutable serialized document.
pub type Snapshot = Arc<[u8]>;

// ─── Undo/redo timeline ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
    cursor: Option<usize>,
    detached: bool,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot, discarding everything after the cursor.
    pub fn push(&mut self, snapshot: Snapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        let discarded = self.snapshots.len() - keep;
        if discarded > 0 {
            log::debug!("discarding {discarded} redo snapshot(s)");
        }
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);
        self.cursor = Some(self.snapshots.len() - 1);
        self.detached = false;
    }

    /// Index to reload for an undo, if any.
    pub fn undo_target(&self) -> Option<usize> {
        let cursor = self.cursor?;
        if self.detached {
            Some(cursor)
        } else {
            cursor.checked_sub(1)
        }
    }

    /// Index to reload for a redo, if any.
    pub fn redo_target(&self) -> Option<usize> {
        if self.detached {
            return None;
        }
        let next = self.cursor? + 1;
        (next < self.snapshots.len()).then_some(next)
    }

    /// Move the cursor after the snapshot at `index` was reloaded.
    pub fn commit(&mut self, index: usize) {
        if index < self.snapshots.len() {
            self.cursor = Some(index);
            self.detached = false;
        }
    }

    /// The live document no longer matches the cursor.
    pub fn detach(&mut self) {
        if self.cursor.is_some() {
            self.detached = true;
        }
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Snapshot the live document equals, when attached.
    pub fn current(&self) -> Option<&Snapshot> {
        if self.detached {
            return None;
        }
        self.snapshots.get(self.cursor?)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn can_undo(&self) -> bool {
        self.undo_target().is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.redo_target().is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ─── Saved states ────────────────────────────────────────────────────────

/// Name shown when no saved state is selected.
pub const NO_STATE: &str = "No State";

/// A named checkpoint of document bytes plus annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub id: u64,
    pub name: String,
    #[serde(skip)]
    pub bytes: Snapshot,
    pub annotations: Vec<Annotation>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SavedStates {
    states: Vec<SavedState>,
    cursor: Option<usize>,
    next_id: u64,
}

impl SavedStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a state and select it. Never truncates.
    pub fn push(
        &mut self,
        bytes: Snapshot,
        annotations: Vec<Annotation>,
        timestamp: DateTime<Utc>,
    ) -> &SavedState {
        self.next_id += 1;
        let name = format!("State {:04}", self.states.len() + 1);
        self.states.push(SavedState {
            id: self.next_id,
            name,
            bytes,
            annotations,
            timestamp,
        });
        let index = self.states.len() - 1;
        self.cursor = Some(index);
        &self.states[index]
    }

    pub fn prev_target(&self) -> Option<usize> {
        self.cursor?.checked_sub(1)
    }

    pub fn next_target(&self) -> Option<usize> {
        let next = self.cursor? + 1;
        (next < self.states.len()).then_some(next)
    }

    /// Select `index` after its bytes were reloaded.
    pub fn commit(&mut self, index: usize) {
        if index < self.states.len() {
            self.cursor = Some(index);
        }
    }

    pub fn get(&self, index: usize) -> Option<&SavedState> {
        self.states.get(index)
    }

    pub fn current(&self) -> Option<&SavedState> {
        self.states.get(self.cursor?)
    }

    pub fn current_name(&self) -> &str {
        self.current().map_or(NO_STATE, |s| s.name.as_str())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_prev(&self) -> bool {
        self.prev_target().is_some()
    }

    pub fn can_next(&self) -> bool {
        self.next_target().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

//! Pending queue: priority-ordered storage for not-yet-dispatched items.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::debug;

use super::task::{QueueKey, WorkItem};

/// Interior state; both maps mutate together under one lock so a replace is
/// never observable half-applied.
#[derive(Default)]
struct PendingState {
    /// Items ordered by (class ordinal, ready_at, seq).
    items: BTreeMap<QueueKey, WorkItem>,
    /// Identity index for replace and cancel.
    by_id: HashMap<String, QueueKey>,
}

/// Concurrency-safe, priority-ordered collection of items awaiting dispatch.
///
/// Ordering is (priority class ascending, ready_at ascending, insertion
/// sequence ascending). The sequence number makes ordering deterministic for
/// items that are otherwise equal. All operations take the internal lock once
/// and are O(log n).
#[derive(Default)]
pub struct PendingQueue {
    state: Mutex<PendingState>,
}

impl PendingQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item with replace semantics: any pending item with the same
    /// id is removed first, atomically with the insert.
    pub fn insert(&self, item: WorkItem) {
        let mut state = self.state.lock();
        if let Some(old_key) = state.by_id.remove(&item.id) {
            state.items.remove(&old_key);
            debug!(id = %item.id, "replacing pending item");
        }
        let key = item.key();
        state.by_id.insert(item.id.clone(), key);
        state.items.insert(key, item);
    }

    /// Remove and return the minimum item if its ready_at has passed;
    /// otherwise leave the queue untouched and return `None`.
    pub fn pop_ready_or_none(&self, now: Instant) -> Option<WorkItem> {
        let mut state = self.state.lock();
        let (&key, _) = state.items.first_key_value()?;
        if key.ready_at > now {
            return None;
        }
        let item = state.items.remove(&key)?;
        state.by_id.remove(&item.id);
        Some(item)
    }

    /// Ready instant of the head item, if any. Used by the dispatcher to
    /// re-arm the wake timer.
    pub fn next_ready_at(&self) -> Option<Instant> {
        let state = self.state.lock();
        state.items.first_key_value().map(|(key, _)| key.ready_at)
    }

    /// Remove and return the item with the given id, if pending.
    pub fn remove(&self, id: &str) -> Option<WorkItem> {
        let mut state = self.state.lock();
        let key = state.by_id.remove(id)?;
        state.items.remove(&key)
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Drop every pending item, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let drained = state.items.len();
        state.items.clear();
        state.by_id.clear();
        drained
    }
}

//! Active set: bookkeeping for currently executing work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use super::task::Priority;

/// One tracked execution. Ids are not unique here: an inline run and a
/// periodic firing under the same id may overlap, so entries carry their own
/// token.
#[derive(Debug, Clone)]
pub struct ActiveEntry {
    /// Token identifying this particular execution.
    pub token: u64,
    /// Work item identity.
    pub id: String,
    /// Priority class the item ran under.
    pub class: Priority,
    /// When execution started.
    pub started_at: Instant,
}

/// Concurrency-safe collection of work items currently executing.
///
/// Used for introspection and best-effort cancellation: removing an entry
/// only stops bookkeeping, it cannot interrupt the running task.
#[derive(Default)]
pub struct ActiveSet {
    entries: Mutex<Vec<ActiveEntry>>,
    /// Token source (lock-free atomic).
    next_token: AtomicU64,
}

impl ActiveSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of an execution and return its tracking token.
    pub fn track(&self, id: &str, class: Priority) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().push(ActiveEntry {
            token,
            id: id.to_string(),
            class,
            started_at: Instant::now(),
        });
        token
    }

    /// Remove the entry for a finished execution. Returns `false` if the
    /// entry was already removed by a best-effort cancel.
    pub fn untrack(&self, token: u64) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| entry.token != token);
        entries.len() < before
    }

    /// Best-effort cancel: drop the first entry matching the id, if any.
    /// The in-flight task keeps running; only its tracking stops.
    pub fn cancel(&self, id: &str) -> bool {
        let mut entries = self.entries.lock();
        if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
            entries.remove(pos);
            return true;
        }
        false
    }

    /// Number of tracked executions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is executing.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the tracked executions.
    pub fn snapshot(&self) -> Vec<ActiveEntry> {
        self.entries.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_untrack() {
        let set = ActiveSet::new();
        let token = set.track("a", Priority::Normal);
        assert_eq!(set.len(), 1);
        assert!(set.untrack(token));
        assert!(set.is_empty());
        assert!(!set.untrack(token), "second untrack is a no-op");
    }

    #[test]
    fn test_cancel_removes_first_match_only() {
        let set = ActiveSet::new();
        let t1 = set.track("dup", Priority::Normal);
        let _t2 = set.track("dup", Priority::Periodic);

        assert!(set.cancel("dup"));
        assert_eq!(set.len(), 1);
        assert!(!set.cancel("missing"));

        // The cancelled entry's untrack becomes a no-op; the survivor's is not.
        assert!(!set.untrack(t1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_snapshot() {
        let set = ActiveSet::new();
        set.track("a", Priority::High);
        set.track("b", Priority::Background);

        let snap = set.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].id, "a");
        assert_eq!(snap[0].class, Priority::High);
    }
}

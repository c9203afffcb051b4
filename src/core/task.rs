//! Work item model: priority classes and the schedulable unit.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// The opaque unit of work. Invoked with no arguments, returns nothing, may
/// panic; panics are caught at the lane boundary.
///
/// Stored behind `Arc` so periodic tasks can be invoked repeatedly and
/// replaced items can drop their task without caring who else holds it.
pub type TaskFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// Priority class of a work item.
///
/// Ordinal order is dispatch order: when multiple items are simultaneously
/// ready, the lower ordinal always dispatches first. Each class also implies
/// the execution lane the item is routed to. There is no aging: a ready
/// `Background` item waits as long as lower-ordinal work keeps arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Runs synchronously on the submitting thread, bypassing the queue.
    Immediate,
    /// Runs on the single serial main lane, FIFO.
    High,
    /// Runs on the shared general worker pool.
    Normal,
    /// Runs on the isolated background worker pool.
    Background,
    /// Recurring work; each firing runs directly on its timer thread.
    Periodic,
}

impl Priority {
    /// Ordinal used for queue ordering (lower = dispatched first).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Immediate => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Background => 3,
            Self::Periodic => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "immediate"),
            Self::High => write!(f, "high"),
            Self::Normal => write!(f, "normal"),
            Self::Background => write!(f, "background"),
            Self::Periodic => write!(f, "periodic"),
        }
    }
}

/// Immutable descriptor of one schedulable unit of work.
#[derive(Clone)]
pub struct WorkItem {
    /// Caller-supplied identity. At most one pending item per id.
    pub id: String,
    /// Priority class controlling dispatch order and destination lane.
    pub class: Priority,
    /// The unit of work.
    pub task: TaskFn,
    /// Instant at or after which the item is eligible for dispatch.
    pub ready_at: Instant,
    /// Monotonic sequence number; final tie-break for deterministic ordering
    /// when class and ready_at are equal.
    pub seq: u64,
}

impl WorkItem {
    /// Sort key: (class ordinal, ready_at, seq).
    #[must_use]
    pub const fn key(&self) -> QueueKey {
        QueueKey {
            ordinal: self.class.ordinal(),
            ready_at: self.ready_at,
            seq: self.seq,
        }
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("ready_at", &self.ready_at)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// Ordering key for pending items.
///
/// Derived `Ord` gives (class ascending, ready_at ascending, seq ascending),
/// which is exactly the dispatch order. `seq` is unique per item, so the key
/// is unique and usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueueKey {
    /// Priority class ordinal.
    pub ordinal: u8,
    /// Earliest-execution instant.
    pub ready_at: Instant,
    /// Insertion sequence number.
    pub seq: u64,
}

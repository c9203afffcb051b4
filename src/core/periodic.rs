//! Periodic registry: recurring-execution handles keyed by task identity.
//!
//! Each periodic task owns a dedicated timer thread firing at a fixed rate.
//! The handle holds only the cancellation signal; cancelling wakes the thread
//! immediately (no waiting out the remainder of a period) and the thread is
//! detached, never joined.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use super::error::SchedulerError;

/// Cancellable registration backing one recurring task.
pub struct PeriodicHandle {
    /// Cancellation flag plus wake signal for the timer thread.
    signal: Arc<(Mutex<bool>, Condvar)>,
}

impl PeriodicHandle {
    /// Spawn the fixed-rate timer thread for a periodic task.
    ///
    /// `fire` runs directly on the timer thread every `period` after
    /// `initial_delay`, until the handle is cancelled. The caller bakes
    /// pause-checking, active-set tracking, and panic containment into
    /// `fire`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Spawn` if the OS refuses the thread.
    pub fn spawn<F>(
        id: &str,
        initial_delay: Duration,
        period: Duration,
        mut fire: F,
    ) -> Result<Self, SchedulerError>
    where
        F: FnMut() + Send + 'static,
    {
        let signal = Arc::new((Mutex::new(false), Condvar::new()));
        let thread_signal = Arc::clone(&signal);
        let thread_id = id.to_string();

        // Detached: cancellation goes through the signal, never a join.
        let _ = thread::Builder::new()
            .name(format!("ls-periodic-{id}"))
            .spawn(move || {
                let (lock, cv) = &*thread_signal;
                let mut next = Instant::now() + initial_delay;
                let mut guard = lock.lock();
                loop {
                    // Sleep until the next fixed-rate deadline, waking early
                    // only on cancellation.
                    while !*guard && Instant::now() < next {
                        let _ = cv.wait_until(&mut guard, next);
                    }
                    if *guard {
                        break;
                    }
                    drop(guard);
                    fire();
                    next += period;
                    guard = lock.lock();
                }
                debug!(id = %thread_id, "periodic timer exiting");
            })
            .map_err(|e| SchedulerError::Spawn(e.to_string()))?;

        Ok(Self { signal })
    }

    /// Signal the timer thread to stop. The thread never fires again after
    /// this returns, though an in-progress firing runs to completion.
    pub fn cancel(&self) {
        let (lock, cv) = &*self.signal;
        *lock.lock() = true;
        cv.notify_one();
    }
}

impl Drop for PeriodicHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Concurrency-safe map from task identity to its recurring registration.
#[derive(Default)]
pub struct PeriodicRegistry {
    handles: Mutex<HashMap<String, PeriodicHandle>>,
}

impl PeriodicRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle under an id, cancelling any existing registration
    /// first so no two timers ever fire for the same id.
    pub fn register(&self, id: &str, handle: PeriodicHandle) {
        let mut handles = self.handles.lock();
        if let Some(old) = handles.insert(id.to_string(), handle) {
            debug!(id, "replacing periodic registration");
            old.cancel();
        }
    }

    /// Cancel and remove the registration for an id. Returns whether one
    /// existed.
    pub fn cancel(&self, id: &str) -> bool {
        let removed = self.handles.lock().remove(id);
        match removed {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every registration, returning how many there were.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut handles = self.handles.lock();
            handles.drain().collect()
        };
        for (_, handle) in &drained {
            handle.cancel();
        }
        drained.len()
    }

    /// Number of active registrations.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Whether no registrations exist.
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

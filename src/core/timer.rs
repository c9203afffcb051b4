//! Wake timer: a single timer thread pointing at the next-soonest deadline.
//!
//! The dispatcher never busy-waits. When the head of the pending queue is not
//! yet ready it arms this timer; every queue mutation that could move the
//! minimum earlier re-arms it. The thread sleeps on a Condvar with
//! `wait_until`, so arming an earlier deadline or shutting down wakes it
//! immediately. A spurious wake-up only causes one harmless drain attempt.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use super::error::SchedulerError;

struct TimerState {
    /// Next instant to fire at, if armed.
    deadline: Option<Instant>,
    /// Exit flag for the timer thread.
    shutdown: bool,
}

/// One-shot re-armable wake-up timer backed by a dedicated thread.
pub struct WakeTimer {
    state: Arc<(Mutex<TimerState>, Condvar)>,
    /// Detached on shutdown; kept so the thread has an owner.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl WakeTimer {
    /// Spawn the timer thread. `on_fire` runs on the timer thread each time
    /// an armed deadline expires.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Spawn` if the OS refuses the thread.
    pub fn spawn<F>(on_fire: F) -> Result<Self, SchedulerError>
    where
        F: Fn() + Send + 'static,
    {
        let state = Arc::new((
            Mutex::new(TimerState {
                deadline: None,
                shutdown: false,
            }),
            Condvar::new(),
        ));

        let thread_state = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name("ls-timer".into())
            .spawn(move || {
                let (lock, cv) = &*thread_state;
                let mut guard = lock.lock();
                loop {
                    if guard.shutdown {
                        break;
                    }
                    match guard.deadline {
                        None => {
                            cv.wait(&mut guard);
                        }
                        Some(at) => {
                            if Instant::now() >= at {
                                guard.deadline = None;
                                drop(guard);
                                on_fire();
                                guard = lock.lock();
                            } else {
                                let _ = cv.wait_until(&mut guard, at);
                            }
                        }
                    }
                }
                debug!("wake timer exiting");
            })
            .map_err(|e| SchedulerError::Spawn(e.to_string()))?;

        Ok(Self {
            state,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Arm the timer for `at`. An already-armed earlier deadline wins; a
    /// later one is replaced.
    pub fn arm(&self, at: Instant) {
        let (lock, cv) = &*self.state;
        let mut guard = lock.lock();
        let earlier = guard.deadline.is_none_or(|current| at < current);
        if earlier {
            guard.deadline = Some(at);
            cv.notify_one();
        }
    }

    /// Stop the timer thread. Pending deadlines are discarded; the thread is
    /// signalled and detached, not joined.
    pub fn shutdown(&self) {
        let (lock, cv) = &*self.state;
        {
            let mut guard = lock.lock();
            guard.shutdown = true;
            guard.deadline = None;
        }
        cv.notify_one();
        // Detach; the thread exits as soon as it observes the flag.
        drop(self.handle.lock().take());
    }
}

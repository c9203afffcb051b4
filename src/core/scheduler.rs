//! Scheduler facade and dispatcher control loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;

use super::active::ActiveSet;
use super::error::SchedulerError;
use super::lanes::{Lane, Lanes};
use super::pending::PendingQueue;
use super::periodic::{PeriodicHandle, PeriodicRegistry};
use super::task::{Priority, TaskFn, WorkItem};
use super::timer::WakeTimer;

/// Shared scheduler internals. Lane jobs, the wake timer, and periodic timer
/// threads hold this only weakly, so dropping the facade tears everything
/// down without reference cycles.
struct Inner {
    pending: PendingQueue,
    active: ActiveSet,
    periodic: PeriodicRegistry,
    lanes: Lanes,
    /// Set after construction; the timer callback needs a weak handle back
    /// to these internals.
    timer: OnceLock<WakeTimer>,
    paused: AtomicBool,
    shut_down: AtomicBool,
    /// Monotonic sequence for deterministic tie-breaking among equal items.
    seq: AtomicU64,
}

/// The scheduling facade.
///
/// Construct one per process at the composition root (via
/// [`crate::builders::build_scheduler`]) and pass it by reference to callers;
/// there is no global instance. All operations are safe to call from any
/// thread.
///
/// Outcome conventions: `submit*` return `false` when rejected (paused, shut
/// down, or an invalid class/period) without enqueueing anything; `cancel*`
/// return whether anything was found. Neither is an error.
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Build a scheduler, spawning its lane and timer threads.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` for bad configuration and
    /// `SchedulerError::Spawn` if a thread cannot be started.
    pub fn new(config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let inner = Arc::new(Inner {
            pending: PendingQueue::new(),
            active: ActiveSet::new(),
            periodic: PeriodicRegistry::new(),
            lanes: Lanes::new(config)?,
            timer: OnceLock::new(),
            paused: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            seq: AtomicU64::new(0),
        });

        let weak = Arc::downgrade(&inner);
        let timer = WakeTimer::spawn(move || {
            if let Some(inner) = weak.upgrade() {
                inner.drain();
            }
        })?;
        // set() cannot fail: nothing else writes this cell.
        let _ = inner.timer.set(timer);

        debug!("scheduler initialized");
        Ok(Self { inner })
    }

    /// Submit a task to run as soon as possible.
    ///
    /// Equivalent to [`Self::submit_delayed`] with a zero delay. `Immediate`
    /// tasks run synchronously on the calling thread before this returns,
    /// even while paused. Returns `false` if the scheduler is paused (for
    /// non-immediate classes) or shut down.
    pub fn submit<F>(&self, id: &str, class: Priority, task: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.submit_delayed(id, class, Duration::ZERO, Arc::new(task))
    }

    /// Submit a task to run once `delay` has elapsed.
    ///
    /// A pending task with the same id is atomically replaced. The caller is
    /// never blocked waiting out the delay; only `Immediate` (which ignores
    /// the delay and the paused flag) blocks, for the duration of the task
    /// itself. Returns `false` if paused or shut down.
    pub fn submit_delayed<F>(&self, id: &str, class: Priority, delay: Duration, task: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.submit_delayed(id, class, delay, Arc::new(task))
    }

    /// Register a recurring task firing every `period` after `initial_delay`.
    ///
    /// An existing registration under the same id is cancelled first, so no
    /// two timers ever fire for one id. Each firing runs directly on the
    /// task's timer thread and is tracked in the active set for the duration
    /// of the call; firings that observe the paused flag are skipped.
    /// Returns `false` if paused, shut down, or `period` is zero.
    pub fn submit_periodic<F>(
        &self,
        id: &str,
        initial_delay: Duration,
        period: Duration,
        task: F,
    ) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.submit_periodic(id, initial_delay, period, Arc::new(task))
    }

    /// Cancel a one-shot task by id.
    ///
    /// Removes the item from the pending queue if still pending; otherwise
    /// best-effort removes its active-set tracking (an in-flight task cannot
    /// be interrupted). Returns whether anything was found.
    pub fn cancel(&self, id: &str) -> bool {
        self.inner.cancel(id)
    }

    /// Cancel a recurring task by id. Returns whether a registration existed.
    pub fn cancel_periodic(&self, id: &str) -> bool {
        let cancelled = self.inner.periodic.cancel(id);
        debug!(id, cancelled, "cancel periodic");
        cancelled
    }

    /// Drop every pending one-shot task, returning how many were removed.
    /// Active and periodic tasks are untouched.
    pub fn cancel_all(&self) -> usize {
        let drained = self.inner.pending.clear();
        info!(drained, "cancelled all pending tasks");
        drained
    }

    /// Suspend dispatch of non-immediate work. Armed timers still fire, but
    /// fired items stay queued until [`Self::resume`].
    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::Release);
        debug!("scheduler paused");
    }

    /// Resume dispatch and immediately drain work queued during the pause.
    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::Release);
        debug!("scheduler resumed");
        self.inner.drain();
    }

    /// Whether the scheduler is paused.
    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::Acquire)
    }

    /// Number of items awaiting dispatch. Snapshot read.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Number of currently executing items. Snapshot read.
    pub fn active_count(&self) -> usize {
        self.inner.active.len()
    }

    /// Number of registered periodic tasks. Snapshot read.
    pub fn periodic_count(&self) -> usize {
        self.inner.periodic.len()
    }

    /// Shut down: pause, cancel every periodic registration, clear the
    /// pending queue, and release the timer and lane threads.
    ///
    /// Non-blocking: still-active tasks are logged and left to finish on
    /// their own; they are never joined or interrupted. Idempotent.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl Inner {
    fn submit_delayed(self: &Arc<Self>, id: &str, class: Priority, delay: Duration, task: TaskFn) -> bool {
        if self.shut_down.load(Ordering::Acquire) {
            warn!(id, "scheduler is shut down, not scheduling task");
            return false;
        }

        // Immediate bypasses the queue and the paused flag entirely; the
        // caller observes completion before this returns.
        if class == Priority::Immediate {
            self.run_inline(id, &task);
            self.drain();
            return true;
        }

        if self.paused.load(Ordering::Acquire) {
            debug!(id, "scheduler is paused, not scheduling task");
            return false;
        }
        if class == Priority::Periodic {
            warn!(id, "periodic class requires submit_periodic, rejecting");
            return false;
        }

        let item = WorkItem {
            id: id.to_string(),
            class,
            task,
            ready_at: Instant::now() + delay,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
        };
        let ready_at = item.ready_at;
        self.pending.insert(item);
        debug!(id, %class, delay_ms = delay.as_millis() as u64, "scheduled task");

        if delay.is_zero() {
            self.drain();
        } else {
            self.arm_timer(ready_at);
        }
        true
    }

    fn submit_periodic(
        self: &Arc<Self>,
        id: &str,
        initial_delay: Duration,
        period: Duration,
        task: TaskFn,
    ) -> bool {
        if self.shut_down.load(Ordering::Acquire) {
            warn!(id, "scheduler is shut down, not scheduling periodic task");
            return false;
        }
        if self.paused.load(Ordering::Acquire) {
            debug!(id, "scheduler is paused, not scheduling periodic task");
            return false;
        }
        if period.is_zero() {
            warn!(id, "periodic task requires a non-zero period, rejecting");
            return false;
        }

        let weak = Arc::downgrade(self);
        let fire_id = id.to_string();
        let fire = move || {
            let Some(inner) = weak.upgrade() else { return };
            if inner.paused.load(Ordering::Acquire) {
                debug!(id = %fire_id, "paused, skipping periodic firing");
                return;
            }
            let token = inner.active.track(&fire_id, Priority::Periodic);
            run_task(&fire_id, Priority::Periodic, &task);
            inner.active.untrack(token);
        };

        match PeriodicHandle::spawn(id, initial_delay, period, fire) {
            Ok(handle) => {
                self.periodic.register(id, handle);
                debug!(
                    id,
                    period_ms = period.as_millis() as u64,
                    "scheduled periodic task"
                );
                true
            }
            Err(e) => {
                error!(id, error = %e, "failed to spawn periodic timer");
                false
            }
        }
    }

    fn cancel(&self, id: &str) -> bool {
        if self.pending.remove(id).is_some() {
            debug!(id, "cancelled pending task");
            return true;
        }
        // Not pending; best-effort stop tracking an in-flight execution.
        let removed = self.active.cancel(id);
        debug!(id, removed, "cancel");
        removed
    }

    /// The dispatcher: drain ready items in (class, ready_at, seq) order,
    /// re-arming the wake timer when the head is not yet ready. Lane
    /// completions re-invoke this, so a single call only ever hands off work
    /// that is ready right now.
    fn drain(self: &Arc<Self>) {
        loop {
            if self.shut_down.load(Ordering::Acquire) || self.paused.load(Ordering::Acquire) {
                return;
            }
            let Some(item) = self.pending.pop_ready_or_none(Instant::now()) else {
                if let Some(at) = self.pending.next_ready_at() {
                    self.arm_timer(at);
                }
                return;
            };
            self.dispatch(item);
        }
    }

    /// Move one ready item to the active set and route it to its lane.
    fn dispatch(self: &Arc<Self>, item: WorkItem) {
        let lane = match item.class {
            // Queue-submitted Immediate should not occur (it bypasses the
            // queue at submission), but run it inline rather than lose it.
            Priority::Immediate => {
                self.run_inline(&item.id, &item.task);
                return;
            }
            Priority::High => Lane::Main,
            Priority::Normal => Lane::General,
            Priority::Background | Priority::Periodic => Lane::Background,
        };

        let token = self.active.track(&item.id, item.class);
        let weak = Arc::downgrade(self);
        let job = Box::new(move || {
            run_task(&item.id, item.class, &item.task);
            if let Some(inner) = weak.upgrade() {
                inner.active.untrack(token);
                inner.drain();
            }
        });

        if !self.lanes.dispatch(lane, job) {
            // Lane already shut down; the job was dropped unrun.
            self.active.untrack(token);
        }
    }

    /// Run a task synchronously on the current thread, tracked for the
    /// duration of the call.
    fn run_inline(&self, id: &str, task: &TaskFn) {
        let token = self.active.track(id, Priority::Immediate);
        run_task(id, Priority::Immediate, task);
        self.active.untrack(token);
    }

    fn arm_timer(&self, at: Instant) {
        if let Some(timer) = self.timer.get() {
            timer.arm(at);
        }
    }

    fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        self.paused.store(true, Ordering::Release);

        let periodic_cancelled = self.periodic.cancel_all();
        let pending_cleared = self.pending.clear();
        if let Some(timer) = self.timer.get() {
            timer.shutdown();
        }
        self.lanes.shutdown();

        // Active tasks are not joined or interrupted; log and move on.
        info!(
            pending_cleared,
            periodic_cancelled,
            still_active = self.active.len(),
            "scheduler shut down"
        );
    }
}

/// Run one task invocation, containing panics at the lane boundary. A failed
/// task is logged and otherwise treated exactly like a successful one.
fn run_task(id: &str, class: Priority, task: &TaskFn) {
    if catch_unwind(AssertUnwindSafe(|| task())).is_err() {
        error!(id, %class, "task panicked");
    }
}

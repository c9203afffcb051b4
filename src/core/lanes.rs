//! Execution lanes: dedicated OS threads that actually run the work.
//!
//! Three thread-backed lanes plus inline execution on the caller:
//!
//! - **Main**: one thread, one channel. Items routed here run FIFO relative
//!   to each other, serial like a UI-affecting context.
//! - **General**: a shared pool of workers for normal-priority work.
//! - **Background**: a separate pool, isolated so bulk work cannot starve
//!   the general pool.
//!
//! Channels are unbounded: there is no admission control and submission never
//! fails due to load. Workers block on `recv`; dropping the senders unblocks
//! them for a clean shutdown. No task timeouts exist, so a hung job stalls
//! its worker — on the main lane that stalls the whole lane.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;

use super::error::SchedulerError;

/// A unit of work handed to a lane worker. Bookkeeping (active-set removal,
/// panic containment, drain continuation) is baked into the closure by the
/// dispatcher before routing.
pub type LaneJob = Box<dyn FnOnce() + Send + 'static>;

/// The thread-backed execution lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Single serial lane for high-priority work.
    Main,
    /// Shared general-purpose pool.
    General,
    /// Isolated low-priority pool.
    Background,
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::General => write!(f, "general"),
            Self::Background => write!(f, "background"),
        }
    }
}

/// The dispatch surface: owns the lane threads and their channels.
pub struct Lanes {
    /// Senders per lane. `Option` allows clean shutdown by dropping.
    main_tx: Mutex<Option<Sender<LaneJob>>>,
    general_tx: Mutex<Option<Sender<LaneJob>>>,
    background_tx: Mutex<Option<Sender<LaneJob>>>,
    /// Worker thread handles; detached on shutdown rather than joined.
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Lanes {
    /// Spawn the lane threads per configuration.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Spawn` if the OS refuses a thread.
    pub fn new(config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let (main_tx, main_rx) = unbounded::<LaneJob>();
        let (general_tx, general_rx) = unbounded::<LaneJob>();
        let (background_tx, background_rx) = unbounded::<LaneJob>();

        let mut workers = Vec::with_capacity(1 + config.general_workers + config.background_workers);

        workers.push(spawn_lane_worker("ls-main", config.thread_stack_size, main_rx)?);
        for i in 0..config.general_workers {
            workers.push(spawn_lane_worker(
                &format!("ls-gen-{i}"),
                config.thread_stack_size,
                general_rx.clone(),
            )?);
        }
        for i in 0..config.background_workers {
            workers.push(spawn_lane_worker(
                &format!("ls-bg-{i}"),
                config.thread_stack_size,
                background_rx.clone(),
            )?);
        }

        info!(
            general_workers = config.general_workers,
            background_workers = config.background_workers,
            "execution lanes initialized"
        );

        Ok(Self {
            main_tx: Mutex::new(Some(main_tx)),
            general_tx: Mutex::new(Some(general_tx)),
            background_tx: Mutex::new(Some(background_tx)),
            workers: Mutex::new(workers),
        })
    }

    /// Route a job to a lane. Returns `false` if the lane has shut down, in
    /// which case the job is dropped without running.
    pub fn dispatch(&self, lane: Lane, job: LaneJob) -> bool {
        let guard = match lane {
            Lane::Main => self.main_tx.lock(),
            Lane::General => self.general_tx.lock(),
            Lane::Background => self.background_tx.lock(),
        };
        let Some(tx) = guard.as_ref() else {
            warn!(%lane, "lane is shut down, dropping job");
            return false;
        };
        if tx.send(job).is_err() {
            warn!(%lane, "lane channel disconnected, dropping job");
            return false;
        }
        true
    }

    /// Drop every sender, unblocking all workers so they exit after draining
    /// whatever was already queued. Workers are detached, not joined.
    pub fn shutdown(&self) {
        *self.main_tx.lock() = None;
        *self.general_tx.lock() = None;
        *self.background_tx.lock() = None;

        let worker_count = self.workers.lock().len();
        debug!(worker_count, "lane senders dropped, workers will exit");
    }
}

/// Spawn one lane worker: block on the channel, run jobs until the senders
/// are dropped.
fn spawn_lane_worker(
    name: &str,
    stack_size: usize,
    rx: Receiver<LaneJob>,
) -> Result<JoinHandle<()>, SchedulerError> {
    let thread_name = name.to_string();
    thread::Builder::new()
        .name(thread_name.clone())
        .stack_size(stack_size)
        .spawn(move || {
            debug!(worker = %thread_name, "lane worker started");
            while let Ok(job) = rx.recv() {
                job();
            }
            debug!(worker = %thread_name, "lane worker exiting");
        })
        .map_err(|e| SchedulerError::Spawn(e.to_string()))
}

//! Core scheduling abstractions: queue, lanes, dispatcher, facade.

pub mod active;
pub mod error;
pub mod lanes;
pub mod pending;
pub mod periodic;
pub mod scheduler;
pub mod task;
pub mod timer;

pub use active::ActiveSet;
pub use error::{AppResult, SchedulerError};
pub use lanes::{Lane, Lanes};
pub use pending::PendingQueue;
pub use periodic::PeriodicRegistry;
pub use scheduler::Scheduler;
pub use task::{Priority, TaskFn, WorkItem};
pub use timer::WakeTimer;

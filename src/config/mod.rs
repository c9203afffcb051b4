//! Configuration models for lane sizing and validation.

pub mod scheduler;

pub use scheduler::SchedulerConfig;

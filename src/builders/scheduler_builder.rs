//! Construct a scheduler from configuration.

use crate::config::SchedulerConfig;
use crate::core::{Scheduler, SchedulerError};

/// Build a scheduler from validated configuration.
///
/// Intended for the process's composition root: construct once, pass by
/// reference to the subsystems that submit work. There is deliberately no
/// global instance.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidConfig` for bad configuration values and
/// `SchedulerError::Spawn` if lane or timer threads cannot be started.
pub fn build_scheduler(cfg: &SchedulerConfig) -> Result<Scheduler, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    Scheduler::new(cfg)
}

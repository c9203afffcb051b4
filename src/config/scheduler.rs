//! Scheduler configuration structures.

use serde::{Deserialize, Serialize};

/// Default stack size for lane worker threads (2 MiB).
const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

fn default_general_workers() -> usize {
    num_cpus::get().max(1)
}

fn default_background_workers() -> usize {
    (num_cpus::get() / 2).max(1)
}

const fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}

/// Sizing for the execution lanes.
///
/// The main lane is always exactly one thread (it is serial by contract);
/// only the two worker pools are configurable. Lane queues are unbounded, so
/// there is no queue-depth knob: submission never fails due to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Worker threads in the shared general-purpose pool.
    #[serde(default = "default_general_workers")]
    pub general_workers: usize,
    /// Worker threads in the isolated background pool.
    #[serde(default = "default_background_workers")]
    pub background_workers: usize,
    /// Stack size per lane worker thread, in bytes.
    #[serde(default = "default_stack_size")]
    pub thread_stack_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            general_workers: default_general_workers(),
            background_workers: default_background_workers(),
            thread_stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with CPU-derived defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the general pool worker count.
    #[must_use]
    pub const fn with_general_workers(mut self, count: usize) -> Self {
        self.general_workers = count;
        self
    }

    /// Set the background pool worker count.
    #[must_use]
    pub const fn with_background_workers(mut self, count: usize) -> Self {
        self.background_workers = count;
        self
    }

    /// Set the per-worker stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.general_workers == 0 {
            return Err("general_workers must be greater than 0".into());
        }
        if self.background_workers == 0 {
            return Err("background_workers must be greater than 0".into());
        }
        if self.thread_stack_size < 64 * 1024 {
            return Err("thread_stack_size must be at least 64 KiB".into());
        }
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation failure description.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

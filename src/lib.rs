//! # Lane Scheduler
//!
//! An in-process task scheduling core for AI assistant workloads.
//!
//! This library accepts opaque units of work tagged with a priority class,
//! orders them in a concurrency-safe pending queue, and dispatches them across
//! four distinct execution lanes: inline (on the caller), a single serial
//! "main" lane, a shared general-purpose worker pool, and an isolated
//! background worker pool. One-shot delayed execution, recurring (periodic)
//! execution, cooperative pause/resume, and best-effort cancellation are all
//! first-class operations.
//!
//! ## Core Problem Solved
//!
//! Assistant-style applications mix wildly different kinds of work on one
//! process:
//!
//! - **UI-adjacent work** must run serially and promptly (main lane)
//! - **Bulk analysis** must never starve interactive work (isolated pool)
//! - **Recurring probes** need targeted cancellation by identity
//! - **One identity, one pending task**: re-submitting under the same id must
//!   atomically replace the stale request
//!
//! ## Key Features
//!
//! - **Priority-class ordering**: lower ordinal always dispatches first when
//!   multiple items are simultaneously ready
//! - **Identity replace semantics**: at most one pending item per id
//! - **Timer re-arming**: a single wake timer always points at the
//!   next-soonest deadline; no busy-waiting
//! - **Pause/resume**: dispatch of non-immediate work suspends cooperatively;
//!   resume flushes the backlog without an external wake-up
//! - **Panic isolation**: a panicking task is caught at the lane boundary and
//!   never stops the dispatcher or its lane
//!
//! ## Example
//!
//! ```rust,ignore
//! use lane_scheduler::builders::build_scheduler;
//! use lane_scheduler::config::SchedulerConfig;
//! use lane_scheduler::core::Priority;
//! use std::time::Duration;
//!
//! let scheduler = build_scheduler(&SchedulerConfig::new().with_general_workers(4))?;
//!
//! // Run as soon as possible on the general pool
//! scheduler.submit("warm-cache", Priority::Normal, || warm_cache());
//!
//! // Run in 2 seconds, replacing any pending task with the same id
//! scheduler.submit_delayed("retry-sync", Priority::Background,
//!     Duration::from_secs(2), || sync());
//!
//! // Fire every 30 seconds after a 5 second lead-in
//! scheduler.submit_periodic("heartbeat",
//!     Duration::from_secs(5), Duration::from_secs(30), || heartbeat());
//!
//! scheduler.cancel_periodic("heartbeat");
//! scheduler.shutdown();
//! ```
//!
//! For complete examples, see `tests/scheduler_test.rs`.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: queue, lanes, dispatcher, facade.
pub mod core;
/// Configuration models for lane sizing and validation.
pub mod config;
/// Builders to construct a scheduler from configuration.
pub mod builders;
/// Shared utilities.
pub mod util;

//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing/telemetry. Users can install their own subscriber; this
/// helper installs a default env-based subscriber if none is set.
///
/// Honors `RUST_LOG`; defaults to `lane_scheduler=info` when unset. Thread
/// names are included because every scheduler thread is named (`ls-main`,
/// `ls-gen-{i}`, `ls-bg-{i}`, `ls-timer`, `ls-periodic-{id}`).
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lane_scheduler=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=rktri_bounds=trace`
/// to see per-frame state and level transitions.
///
/// # Example
/// ```no_run
/// rktri_bounds::core::logging::init();
/// log::info!("Traversal started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
}

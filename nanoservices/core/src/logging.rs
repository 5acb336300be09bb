use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for the `inspect_flow` binaries.
///
/// `RUST_LOG` wins when it is set; otherwise `default_level` (for example
/// `info` or `inspect_core=debug`) is used. Safe to call more than once: a
/// second initialization is quietly ignored.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

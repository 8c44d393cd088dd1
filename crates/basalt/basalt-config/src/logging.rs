use tracing_subscriber::EnvFilter;

/// Installs the process-wide `fmt` subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. Does nothing if a subscriber is
/// already installed, so hosts and tests can call it more than once.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

mod config;
mod logging;

pub use config::{BasaltConfig, ConfigError, RingSection};
pub use logging::init_tracing;

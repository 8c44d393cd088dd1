use basalt_ring::{RingConfig, RingConfigError};
use serde::Deserialize;
use std::path::Path;

/// Construction-time settings for a pipeline hosting a ring.
///
/// ```toml
/// log_level = "debug"
///
/// [ring]
/// capacity = 4096
/// version_granularity = 64
/// ```
#[derive(Deserialize, Debug)]
pub struct BasaltConfig {
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    #[serde(default)]
    pub ring: RingSection,
}

#[derive(Deserialize, Debug)]
pub struct RingSection {
    #[serde(default = "defaults::capacity")]
    pub capacity: usize,
    /// Defaults to `capacity` (one counter per slot).
    pub version_granularity: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid ring settings")]
    Invalid(#[from] RingConfigError),
}

mod defaults {
    pub fn log_level() -> String {
        "info".into()
    }

    pub fn capacity() -> usize {
        1 << 16 // 65536
    }
}

impl Default for RingSection {
    fn default() -> Self {
        Self {
            capacity: defaults::capacity(),
            version_granularity: None,
        }
    }
}

impl BasaltConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&toml_to_str)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: BasaltConfig = toml::from_str(s)?;
        tracing::debug!(?config, "loaded config");
        Ok(config)
    }

    /// Validates the `[ring]` section into a [`RingConfig`].
    pub fn ring_config(&self) -> Result<RingConfig, ConfigError> {
        let capacity = self.ring.capacity;
        let granularity = self.ring.version_granularity.unwrap_or(capacity);
        Ok(RingConfig::try_new(capacity, granularity)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = BasaltConfig::from_toml_str("").unwrap();
        assert_eq!(config.log_level, "info");
        let ring = config.ring_config().unwrap();
        assert_eq!(ring.capacity, 65536);
        assert_eq!(ring.version_granularity, 65536);
    }

    #[test]
    fn explicit_ring_section() {
        let config = BasaltConfig::from_toml_str(
            r#"
            log_level = "trace"

            [ring]
            capacity = 4096
            version_granularity = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "trace");
        assert_eq!(
            config.ring_config().unwrap(),
            RingConfig::with_granularity(4096, 64)
        );
    }

    #[test]
    fn invalid_ring_settings_are_reported_with_cause() {
        let config = BasaltConfig::from_toml_str("[ring]\ncapacity = 1000\n").unwrap();
        let err = config.ring_config().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(RingConfigError::CapacityNotPowerOfTwo(1000))
        ));
        assert_eq!(
            err.source().unwrap().to_string(),
            "capacity 1000 is not a power of two"
        );

        let config =
            BasaltConfig::from_toml_str("[ring]\ncapacity = 8\nversion_granularity = 16\n").unwrap();
        assert!(matches!(
            config.ring_config(),
            Err(ConfigError::Invalid(
                RingConfigError::GranularityExceedsCapacity { .. }
            ))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = BasaltConfig::from_toml_str("[ring\ncapacity = 8").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_capacity_is_a_parse_error() {
        let err = BasaltConfig::from_toml_str("[ring]\ncapacity = -4\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = BasaltConfig::load("/nonexistent/basalt.toml").unwrap_err();
        match err {
            ConfigError::Read { path, source } => {
                assert_eq!(path, "/nonexistent/basalt.toml");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

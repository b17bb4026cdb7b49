//! Coordinator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Configuration for a coordinator and its task.
///
/// Missing fields take their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// How long an operation may wait for its completion before it is
    /// failed locally. `None` waits forever.
    pub operation_timeout_secs: Option<u64>,

    /// How often the coordinator task looks for timed-out operations.
    /// Only used when a timeout is set.
    pub sweep_interval_ms: u64,

    /// Capacity of the coordinator task's command channel.
    pub command_channel_size: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            operation_timeout_secs: None,
            sweep_interval_ms: 1_000,
            command_channel_size: 64,
        }
    }
}

impl CoordinatorConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Returns the config unchanged if every value is usable.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.command_channel_size == 0 {
            return Err(ConfigError::Invalid(
                "command_channel_size must be positive".into(),
            ));
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sweep_interval_ms must be positive".into(),
            ));
        }
        Ok(self)
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_waits_forever() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.operation_timeout(), None);
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
        assert_eq!(config.command_channel_size, 64);
    }

    #[test]
    fn test_from_json_empty_object_uses_defaults() {
        let config = CoordinatorConfig::from_json("{}").expect("valid");
        assert_eq!(config, CoordinatorConfig::default());
    }

    #[test]
    fn test_from_json_reads_timeout() {
        let config =
            CoordinatorConfig::from_json(r#"{ "operation_timeout_secs": 30 }"#)
                .expect("valid");
        assert_eq!(config.operation_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_from_json_zero_channel_size_is_invalid() {
        let result =
            CoordinatorConfig::from_json(r#"{ "command_channel_size": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_json_malformed_is_parse_error() {
        let result = CoordinatorConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}

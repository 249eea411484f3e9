use crate::domain::config::SocketsConfig;
use crate::ports::outbound::ConfigProvider;

// ============================================================================
// StaticConfigProvider - In-code configuration
// ============================================================================

/// Configuration fixed at construction.
///
/// Useful for tests and firmware builds. For files, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: SocketsConfig,
}

impl StaticConfigProvider {
    /// Create with the reference defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with the given configuration.
    #[must_use]
    pub fn with_config(mut self, config: SocketsConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn sockets_config(&self) -> SocketsConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading (requires "config-file" feature)
// ============================================================================

#[cfg(feature = "config-file")]
mod toml_config {
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    use serde::Deserialize;
    use thiserror::Error;

    use super::*;
    use crate::domain::errors::SocketError;

    /// Configuration file structure.
    #[derive(Debug, Deserialize)]
    struct ConfigFile {
        #[serde(default)]
        sockets: SocketsSection,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(deny_unknown_fields)]
    struct SocketsSection {
        max_sockets: Option<usize>,
        send_timeout_ms: Option<u64>,
        receive_timeout_ms: Option<u64>,
        channel_lock_timeout_ms: Option<u64>,
        receive_lock_slack_ms: Option<u64>,
        receive_poll_timeout_ms: Option<u64>,
        receive_retry_delay_ms: Option<u64>,
        max_transfer_size: Option<usize>,
        max_driver_timeout_ms: Option<u64>,
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [sockets]
    /// max_sockets = 4
    /// send_timeout_ms = 10000
    /// receive_timeout_ms = 10000
    /// channel_lock_timeout_ms = 60000
    /// receive_lock_slack_ms = 5
    /// receive_poll_timeout_ms = 1
    /// receive_retry_delay_ms = 5
    /// max_transfer_size = 1200
    /// max_driver_timeout_ms = 30000
    /// ```
    ///
    /// Every key is optional; missing keys keep their defaults.
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        config: SocketsConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        ///
        /// # Errors
        ///
        /// Returns error if the file cannot be read, parsed or validated.
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                error: e.to_string(),
            })?;

            Self::parse(&content)
        }

        /// Parse configuration from a TOML string.
        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let s = file.sockets;
            let defaults = SocketsConfig::default();
            let ms = |value: Option<u64>, default: Duration| {
                value.map(Duration::from_millis).unwrap_or(default)
            };
            let config = SocketsConfig {
                max_sockets: s.max_sockets.unwrap_or(defaults.max_sockets),
                default_send_timeout: ms(s.send_timeout_ms, defaults.default_send_timeout),
                default_receive_timeout: ms(
                    s.receive_timeout_ms,
                    defaults.default_receive_timeout,
                ),
                channel_lock_timeout: ms(
                    s.channel_lock_timeout_ms,
                    defaults.channel_lock_timeout,
                ),
                receive_lock_slack: ms(s.receive_lock_slack_ms, defaults.receive_lock_slack),
                receive_poll_timeout: ms(
                    s.receive_poll_timeout_ms,
                    defaults.receive_poll_timeout,
                ),
                receive_retry_delay: ms(
                    s.receive_retry_delay_ms,
                    defaults.receive_retry_delay,
                ),
                max_transfer_size: s.max_transfer_size.unwrap_or(defaults.max_transfer_size),
                max_driver_timeout: ms(s.max_driver_timeout_ms, defaults.max_driver_timeout),
            };
            config.validate().map_err(ConfigError::Invalid)?;

            Ok(Self { config })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn sockets_config(&self) -> SocketsConfig {
            self.config.clone()
        }
    }

    /// Errors that can occur during config loading.
    #[derive(Debug, Clone, Error)]
    pub enum ConfigError {
        /// File I/O error.
        #[error("Failed to read config file '{path}': {error}")]
        Io { path: String, error: String },
        /// TOML parsing error.
        #[error("Failed to parse config: {0}")]
        Parse(String),
        /// Values parsed but rejected.
        #[error(transparent)]
        Invalid(SocketError),
    }

}

#[cfg(feature = "config-file")]
pub use toml_config::{ConfigError, TomlConfigProvider};

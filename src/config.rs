//! Lobby configuration, loaded from TOML with every field defaulted.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Runtime settings for the lobby service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct LobbyConfig {
    /// Address the HTTP transport binds to.
    #[setters(into)]
    host: String,

    /// Port the HTTP transport binds to.
    port: u16,

    /// Seconds between cursor reaper sweeps.
    reaper_interval_secs: u64,

    /// Page size used when a listing request names none.
    default_page_size: usize,

    /// Upper bound on a single notification delivery, in milliseconds.
    delivery_timeout_ms: u64,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            reaper_interval_secs: 30,
            default_page_size: 10,
            delivery_timeout_ms: 2000,
        }
    }
}

impl LobbyConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable, malformed, or fails
    /// [`LobbyConfig::validate`].
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(
            port = config.port,
            reaper_interval_secs = config.reaper_interval_secs,
            "Config loaded"
        );
        Ok(config)
    }

    /// Rejects settings the service cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero reaper interval or delivery timeout.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reaper_interval_secs == 0 {
            return Err(ConfigError::new("reaper_interval_secs must be at least 1".to_string()));
        }
        if self.delivery_timeout_ms == 0 {
            return Err(ConfigError::new("delivery_timeout_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Reaper sweep period.
    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs)
    }

    /// Notification delivery timeout.
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Azure CLI executable.
    pub az_path: PathBuf,
    /// Directory for CSV exports, generated scripts and run logs.
    pub output_dir: PathBuf,
    /// Per-VM ceiling when waiting for the `stopped` power state, in seconds.
    pub poll_timeout_secs: u64,
    /// Delay between power state polls, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            az_path: PathBuf::from("az"),
            output_dir: PathBuf::from("."),
            poll_timeout_secs: 300,
            poll_interval_secs: 10,
        }
    }
}

impl Config {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Apply environment overrides.
    fn with_env(mut self) -> Self {
        if let Ok(az) = std::env::var("AZFLEET_AZ_PATH") {
            if !az.trim().is_empty() {
                self.az_path = PathBuf::from(az);
            }
        }
        self
    }
}

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("azfleet")
}

/// Load configuration from file, falling back to defaults.
pub fn load_config() -> Config {
    let config_path = config_dir().join("config.toml");

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match parse_config(&content) {
                Ok(config) => return config.with_env(),
                Err(e) => tracing::warn!("Ignoring invalid config {:?}: {}", config_path, e),
            },
            Err(e) => tracing::warn!("Cannot read config {:?}: {}", config_path, e),
        }
    }

    Config::default().with_env()
}

/// Parse configuration TOML. Missing keys take their defaults.
pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

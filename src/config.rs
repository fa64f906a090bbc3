// ABOUTME: Configuration loading for cipherdesk.
// ABOUTME: Reads ~/.cipherdesk/config.toml, falling back to defaults for every field.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub workers: WorkerConfig,
}

/// Worker lifecycle tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// How long to wait for a worker to exit at shutdown before killing it.
    pub shutdown_timeout_ms: u64,
    /// Bounded capacity of the log record queue; overflow drops records.
    pub log_queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_ms: 1000,
            log_queue_capacity: 64,
        }
    }
}

impl WorkerConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Config {
    /// Load config from ~/.cipherdesk/config.toml, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cipherdesk")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.workers.shutdown_timeout_ms, 1000);
        assert_eq!(config.workers.log_queue_capacity, 64);
        assert_eq!(config.workers.shutdown_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn parse_config_toml() {
        let toml_str = r#"
[workers]
shutdown_timeout_ms = 250
log_queue_capacity = 16
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workers.shutdown_timeout_ms, 250);
        assert_eq!(config.workers.log_queue_capacity, 16);
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let toml_str = r#"
[workers]
shutdown_timeout_ms = 500
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workers.shutdown_timeout_ms, 500);
        assert_eq!(config.workers.log_queue_capacity, 64);
    }
}

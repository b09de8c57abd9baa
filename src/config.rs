use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::ConfigError;

pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.3;
pub const DEFAULT_WINDOW_SIZE: usize = 100;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub bus: BusConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Message bus endpoints. Channel identifiers are UDP ports on the
/// bus host; posts travel as JSON datagrams.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusConfig {
    pub host: String,
    pub input_port: u16,
    pub output_port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    pub fn load_or_default() -> Result<Self> {
        // Try config.toml first, then config.example.toml
        Self::load("config.toml")
            .or_else(|_| Self::load("config.example.toml"))
            .context("Failed to load configuration")
    }

    /// Reject invalid detector settings before any post is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detector.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize);
        }
        let threshold = self.detector.alert_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidAlertThreshold(threshold));
        }
        Ok(())
    }
}

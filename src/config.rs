//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-config.toml file.
//! It provides a centralized way to configure the NOAA prediction service, the fetch
//! window and search behaviour of a session, and where the chosen location is stored.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tide-config.toml";

/// Application configuration loaded from tide-config.toml
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// NOAA prediction service settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Fetch window and interaction settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// NOAA CO-OPS data getter settings.
///
/// Everything except the station and the time window is fixed per request.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Application tag NOAA asks clients to send
    pub application: String,
    /// Vertical datum (Mean Lower Low Water)
    pub datum: String,
    pub units: String,
    /// `h` for hourly predictions
    pub interval: String,
    pub time_zone: String,
    /// Whole-request timeout
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string(),
            application: "NOS.COOPS.TAC.WL".to_string(),
            datum: "MLLW".to_string(),
            units: "english".to_string(),
            interval: "h".to_string(),
            time_zone: "gmt".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Per-session fetch window and search settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hours of predictions requested before "now"
    pub lookback_hours: i64,
    /// Hours of predictions requested after "now"
    pub lookahead_hours: i64,
    /// Quiet period before a location search runs
    pub search_debounce_ms: u64,
    /// Samples kept on each side of "now" in the chart window
    pub context_radius: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            lookback_hours: 12,
            lookahead_hours: 24,
            search_debounce_ms: 300,
            context_radius: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Single-slot file holding the last selected location
    pub location_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            location_path: PathBuf::from("last_location.json"),
        }
    }
}

impl Config {
    /// Load configuration from tide-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write this configuration as pretty TOML.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}

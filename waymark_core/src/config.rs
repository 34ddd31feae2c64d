//! Configuration file support for waymark.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/waymark/config.toml`.

use crate::{Coords, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub map: MapConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Map view configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,

    /// Home position, the stand-in for a geolocation fix.
    #[serde(default)]
    pub home_lat: Option<f64>,
    #[serde(default)]
    pub home_lng: Option<f64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_zoom: default_zoom(),
            home_lat: None,
            home_lng: None,
        }
    }
}

impl MapConfig {
    /// Configured home position, if both halves are set.
    pub fn home_fix(&self) -> Option<Coords> {
        match (self.home_lat, self.home_lng) {
            (Some(lat), Some(lng)) => Some(Coords { lat, lng }),
            _ => None,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("waymark")
}

fn default_zoom() -> u8 {
    16
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("waymark").join("config.toml")
    }
}

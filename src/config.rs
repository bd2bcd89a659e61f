//! Application configuration
//!
//! Settings come from `config.json` in the user config directory, then
//! environment variables override individual fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Debug traces that can be switched on without rebuilding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    /// Trace distance calculations and list sorting decisions
    pub maps: bool,
    /// Trace photo cache hits, misses and fetch outcomes
    pub photos: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub google_maps_api_key: Option<String>,
    /// How long to wait for a position fix
    pub location_timeout_secs: u64,
    /// Age up to which a previous position fix is reused
    pub location_max_age_secs: u64,
    pub debug: DebugFlags,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            google_maps_api_key: None,
            location_timeout_secs: 30,
            location_max_age_secs: 300,
            debug: DebugFlags::default(),
        }
    }
}

impl AppConfig {
    /// Directory holding config.json and the stored token
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bean_score")
    }

    /// Load from the default location and apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_dir().join("config.json"));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load from a JSON file, falling back to defaults if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file, using defaults: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Override fields from environment variables.
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BEAN_SCORE_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(key) = lookup("BEAN_SCORE_MAPS_KEY").filter(|k| !k.is_empty()) {
            self.google_maps_api_key = Some(key);
        }
        if let Some(value) = lookup("BEAN_SCORE_DEBUG_MAPS") {
            self.debug.maps = parse_flag(&value);
        }
        if let Some(value) = lookup("BEAN_SCORE_DEBUG_PHOTOS") {
            self.debug.photos = parse_flag(&value);
        }
    }

    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }

    pub fn location_max_age(&self) -> Duration {
        Duration::from_secs(self.location_max_age_secs)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

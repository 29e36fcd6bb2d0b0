use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const STATIC_API_KEY_ENV: &str = "MAPVIEW_STATIC_API_KEY";
pub const GEOCODER_API_KEY_ENV: &str = "MAPVIEW_GEOCODER_API_KEY";
pub const SEARCH_API_KEY_ENV: &str = "MAPVIEW_SEARCH_API_KEY";

/// Configuration for the map service clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// API key for the static map service
    pub static_api_key: String,
    /// API key for the geocoder
    pub geocoder_api_key: String,
    /// API key for the organization search
    pub search_api_key: String,
    pub static_maps_url: String,
    pub geocoder_url: String,
    pub search_url: String,
    /// Requested map image size in pixels (the service caps this at 650x450)
    pub map_width: u32,
    pub map_height: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Response language for organization search
    pub lang: String,
    /// Free text sent with organization searches
    pub organization_query: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            static_api_key: String::new(),
            geocoder_api_key: String::new(),
            search_api_key: String::new(),
            static_maps_url: "https://static-maps.yandex.ru/v1".to_string(),
            geocoder_url: "https://geocode-maps.yandex.ru/1.x/".to_string(),
            search_url: "https://search-maps.yandex.ru/v1/".to_string(),
            map_width: 600,
            map_height: 450,
            timeout_secs: 10,
            lang: "ru_RU".to_string(),
            organization_query: "организация".to_string(),
        }
    }
}

impl MapConfig {
    /// Load configuration from a JSON file, or defaults if it doesn't exist.
    /// Fields missing from the file keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: MapConfig = serde_json::from_str(&data)
                .with_context(|| format!("Failed to parse config {}", path.display()))?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Write a default config to `path`, refusing to replace an existing
    /// file unless `overwrite` is set
    pub fn write_default(path: &Path, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            anyhow::bail!("{} already exists", path.display());
        }
        Self::default().save(path)?;
        log::info!("Wrote default config to {}", path.display());
        Ok(())
    }

    /// Override API keys from the environment
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(STATIC_API_KEY_ENV) {
            self.static_api_key = key;
        }
        if let Some(key) = non_empty(GEOCODER_API_KEY_ENV) {
            self.geocoder_api_key = key;
        }
        if let Some(key) = non_empty(SEARCH_API_KEY_ENV) {
            self.search_api_key = key;
        }
        self
    }

    /// "width,height" for the static map `size` parameter
    pub fn size_param(&self) -> String {
        format!("{},{}", self.map_width, self.map_height)
    }
}

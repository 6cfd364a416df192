use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_ONECALL_BASE: &str = "https://api.openweathermap.org/data/3.0/onecall";
pub const DEFAULT_GBFS_BASE: &str = "https://api-public.odpt.org/api/v4/gbfs/hellocycling";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 8;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Budget for answering one inbound request, upstream calls included.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// OpenWeather One Call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub upstream_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_ONECALL_BASE.to_string(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

/// Bike-share GBFS feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GbfsConfig {
    pub base_url: String,
}

impl Default for GbfsConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_GBFS_BASE.to_string() }
    }
}

/// Top-level configuration.
///
/// Example TOML:
/// [server]
/// bind_addr = "0.0.0.0:8080"
/// [weather]
/// api_key = "..."
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub gbfs: GbfsConfig,
}

impl Config {
    /// Load config from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };

        cfg.apply_overrides(
            env::var("OPENWEATHER_API_KEY").ok(),
            env::var("OPENWEATHER_ONECALL_BASE").ok(),
        );

        Ok(cfg)
    }

    /// Read configuration from a TOML file, or return defaults if it doesn't
    /// exist yet.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Environment wins over the file; empty values count as unset.
    fn apply_overrides(&mut self, api_key: Option<String>, onecall_base: Option<String>) {
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            self.weather.api_key = key;
        }
        if let Some(base) = onecall_base.filter(|base| !base.is_empty()) {
            self.weather.base_url = base;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.upstream_timeout_secs)
    }
}

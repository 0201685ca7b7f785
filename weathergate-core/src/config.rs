use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::retry::RetryConfig;

/// Default expiry for cached coordinates: one week.
pub const DEFAULT_COORDINATE_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Default per-call timeout for upstream requests.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default retry budget for transient upstream failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Credentials for the geocoding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk as TOML, with environment
/// overrides applied on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Example TOML:
    /// [geocoder]
    /// api_key = "..."
    pub geocoder: Option<GeocoderConfig>,

    /// Seconds a geocoded coordinate pair stays cached.
    #[serde(default = "default_coordinate_ttl_secs")]
    pub coordinate_ttl_secs: u64,

    /// Per-call timeout for upstream HTTP requests, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Retries after the first attempt for transient upstream failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_coordinate_ttl_secs() -> u64 {
    DEFAULT_COORDINATE_TTL_SECS
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoder: None,
            coordinate_ttl_secs: DEFAULT_COORDINATE_TTL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl Config {
    /// Load config from the platform default path, or return defaults if the
    /// file doesn't exist yet. Environment overrides apply either way.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let config = if path.exists() {
            Self::read_file(&path)?
        } else {
            Self::default()
        };

        config.with_env_overrides()
    }

    /// Load config from an explicit path, then apply environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::read_file(path)?.with_env_overrides()
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an environment-like lookup:
    /// - `OPENCAGE_API_KEY` replaces the geocoder credentials
    /// - `WEATHERGATE_COORDINATE_TTL_SECS`, `WEATHERGATE_HTTP_TIMEOUT_SECS`
    ///   and `WEATHERGATE_MAX_RETRIES` replace the matching knobs
    fn with_overrides<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = var("OPENCAGE_API_KEY") {
            self.geocoder = Some(GeocoderConfig { api_key });
        }
        if let Some(raw) = var("WEATHERGATE_COORDINATE_TTL_SECS") {
            self.coordinate_ttl_secs = raw
                .parse()
                .context("Failed to parse WEATHERGATE_COORDINATE_TTL_SECS")?;
        }
        if let Some(raw) = var("WEATHERGATE_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = raw
                .parse()
                .context("Failed to parse WEATHERGATE_HTTP_TIMEOUT_SECS")?;
        }
        if let Some(raw) = var("WEATHERGATE_MAX_RETRIES") {
            self.max_retries =
                raw.parse().context("Failed to parse WEATHERGATE_MAX_RETRIES")?;
        }

        Ok(self)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathergate", "weathergate")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the geocoder API key, or an actionable error when missing.
    pub fn geocoder_api_key(&self) -> Result<&str> {
        self.geocoder.as_ref().map(|g| g.api_key.as_str()).ok_or_else(|| {
            anyhow!(
                "No API key configured for the geocoding provider.\n\
                 Hint: set OPENCAGE_API_KEY, or add a [geocoder] section with api_key to config.toml."
            )
        })
    }

    pub fn coordinate_ttl(&self) -> Duration {
        Duration::from_secs(self.coordinate_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            ..RetryConfig::default()
        }
    }
}

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use defaults::*;
use duration_serde::duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub imaging: ImagingConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL applied by `set` when the caller does not pass one
    #[serde(with = "duration", default = "default_cache_ttl")]
    pub default_ttl: Duration,
}

/// Receipt image pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingConfig {
    /// Longest side of the normalized image, in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    /// JPEG quality for a fresh session (0.3-1.0)
    #[serde(default = "default_quality")]
    pub default_quality: f32,
    /// Smallest crop selection accepted, in displayed pixels
    #[serde(default = "default_min_crop_size")]
    pub min_crop_size: u32,
}

/// Backend (Apps Script web app) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Deployed web app URL; required only for commands that talk to the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(with = "duration", default = "default_request_timeout")]
    pub request_timeout: Duration,
    #[serde(with = "duration", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
}

fn default_max_dimension() -> u32 {
    DEFAULT_MAX_DIMENSION
}

fn default_quality() -> f32 {
    DEFAULT_JPEG_QUALITY
}

fn default_min_crop_size() -> u32 {
    DEFAULT_MIN_CROP_SIZE
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_cache_ttl(),
        }
    }
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            default_quality: default_quality(),
            min_crop_size: default_min_crop_size(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional TOML file and
    /// `RECEIPT_KIT_`-prefixed environment variables, in that order.
    ///
    /// Nested keys use `__` in variable names, e.g. `RECEIPT_KIT_CACHE__DEFAULT_TTL=10m`.
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_file {
            debug!("Merging configuration file: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, writing the defaults there first
    /// if it does not exist yet.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        let path = Path::new(config_file);
        if !path.exists() {
            let contents = toml::to_string_pretty(&Self::default())
                .map_err(|e| AppError::configuration(e.to_string()))?;
            std::fs::write(path, contents)?;
            info!("Created default config file: {}", config_file);
        }
        Self::load(Some(path))
    }

    /// Check value ranges the serde layer cannot express
    pub fn validate(&self) -> AppResult<()> {
        if self.cache.default_ttl.is_zero() {
            return Err(AppError::configuration("cache.default_ttl must be greater than zero"));
        }
        if self.imaging.max_dimension == 0 {
            return Err(AppError::configuration("imaging.max_dimension must be greater than zero"));
        }
        if !(MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&self.imaging.default_quality) {
            return Err(AppError::configuration(format!(
                "imaging.default_quality {} is outside {MIN_JPEG_QUALITY}-{MAX_JPEG_QUALITY}",
                self.imaging.default_quality
            )));
        }
        if self.imaging.min_crop_size == 0 {
            return Err(AppError::configuration("imaging.min_crop_size must be greater than zero"));
        }
        if let Some(endpoint) = &self.api.endpoint {
            url::Url::parse(endpoint).map_err(|e| {
                AppError::configuration(format!("api.endpoint '{endpoint}' is not a valid URL: {e}"))
            })?;
        }
        Ok(())
    }
}

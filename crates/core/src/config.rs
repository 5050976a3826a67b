//! Configuration types for the Propsearch core library
//!
//! Values are layered, lowest precedence first:
//!
//! 1. struct defaults
//! 2. an optional configuration file (YAML, TOML or JSON, chosen by extension)
//! 3. `PROPSEARCH__<SECTION>__<KEY>` environment variables
//! 4. the plain `PORT`, `GEOCODING_API_URL` and `GEOCODING_API_KEY` variables

use crate::{PropsearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for structured environment overrides
pub const ENV_PREFIX: &str = "PROPSEARCH";

/// Plain environment variable holding the geocoding endpoint
pub const GEOCODING_API_URL_VAR: &str = "GEOCODING_API_URL";

/// Plain environment variable holding the geocoding API key
pub const GEOCODING_API_KEY_VAR: &str = "GEOCODING_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Geocoding provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,
    /// Dataset source
    #[serde(default)]
    pub data: DataConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from an optional file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let builder = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option(
                "geocoding.api_url",
                std::env::var(GEOCODING_API_URL_VAR).ok(),
            )?
            .set_override_option(
                "geocoding.api_key",
                std::env::var(GEOCODING_API_KEY_VAR).ok(),
            )?;

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(
            "Configuration loaded (file: {})",
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(config)
    }

    /// Parse configuration from a YAML document without consulting the environment
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values that serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PropsearchError::configuration("server.port cannot be 0"));
        }

        if self.search.page_size == 0 {
            return Err(PropsearchError::configuration(
                "search.page_size must be at least 1",
            ));
        }

        if self.geocoding.timeout_seconds == 0 {
            return Err(PropsearchError::configuration(
                "geocoding.timeout_seconds must be at least 1",
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(PropsearchError::configuration(format!(
                "Unknown log format '{}'. Valid formats: {}",
                self.logging.format,
                valid_formats.join(", ")
            )));
        }

        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether to attach a permissive CORS layer
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
        }
    }
}

/// Geocoding provider settings
///
/// The endpoint is kept as raw text; it is only parsed when a request needs
/// it, so a bad value surfaces as a geocoding configuration failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base endpoint of the provider
    #[serde(default)]
    pub api_url: Option<String>,
    /// API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,
    /// Upper bound on a single provider call
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl GeocodingConfig {
    /// The configured endpoint, if it holds anything but whitespace
    pub fn endpoint(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// The configured API key, if it is non-empty
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Whether an endpoint has been supplied at all
    pub fn is_configured(&self) -> bool {
        self.endpoint().is_some()
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Search behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Dataset source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON file holding the property records; the bundled dataset is used when unset
    #[serde(default)]
    pub properties_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: pretty, compact or json
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    10
}

fn default_page_size() -> usize {
    crate::query::DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

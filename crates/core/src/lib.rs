//! Propsearch Core Library
//!
//! Domain layer for the Propsearch property listing service: the read-only
//! property dataset, the query engine that filters and paginates it, and the
//! geocoding adapter that turns a free-text address into a search origin.

pub mod config;
pub mod error;
pub mod geocoding;
pub mod property;
pub mod query;
pub mod repository;

// Re-export commonly used types
pub use crate::config::{
    AppConfig, DataConfig, GeocodingConfig, LoggingConfig, SearchConfig, ServerSettings,
};
pub use error::{ErrorCategory, PropsearchError, Result};
pub use geocoding::{Coordinates, Geocoder, GeocodingError, HttpGeocoder};
pub use property::{Property, PropertyDetail, PropertySummary};
pub use query::{
    FilterCriteria, LocationContext, Pagination, PropertyQueryEngine, SearchPage,
    DEFAULT_PAGE_SIZE, LOCATION_CONTEXT_RADIUS_METERS,
};
pub use repository::{InMemoryRepository, PropertyRepository};

/// Initialize logging with custom configuration
///
/// `level` accepts anything `EnvFilter` understands; `RUST_LOG` wins when set.
pub fn init_logging_with_config(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .map_err(|e| PropsearchError::configuration(format!("Invalid log level '{}': {}", level, e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "pretty" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        _ => {
            return Err(PropsearchError::configuration(format!(
                "Unknown log format: {}",
                format
            )));
        }
    };

    result.map_err(|e| PropsearchError::configuration(format!("Failed to initialize logger: {}", e)))
}

/// Initialize logging from the logging section of the configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    init_logging_with_config(&config.level, &config.format)
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.contains(VERSION));
        assert!(info.starts_with("propsearch-core"));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let result = init_logging_with_config("info", "xml");
        assert!(matches!(result, Err(PropsearchError::Configuration { .. })));
    }
}

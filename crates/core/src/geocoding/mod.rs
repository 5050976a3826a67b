//! Address geocoding
//!
//! Converts a free-text address into a coordinate pair through an external
//! HTTP provider. The [`Geocoder`] trait is the seam the HTTP layer depends
//! on; [`HttpGeocoder`] is the production implementation.

pub mod client;
pub mod extract;

pub use client::{HttpGeocoder, DEFAULT_RESULT_LIMIT};
pub use extract::extract_coordinates;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A latitude/longitude pair; values are not range-checked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Failures a geocoding call can report
///
/// Callers branch on the variant; the message is for display only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodingError {
    /// The call could not be completed: bad input, transport failure,
    /// non-success status or an unreadable body
    #[error("{message}")]
    Failed { message: String },

    /// The provider endpoint is missing or unusable
    #[error("{message}")]
    Configuration { message: String },

    /// The provider answered but no coordinate could be extracted
    #[error("{message}")]
    NotFound { message: String },
}

impl GeocodingError {
    /// Create a generic geocoding failure
    pub fn failed<S: Into<String>>(message: S) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Create a configuration failure
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not-found failure with the standard message
    pub fn not_found() -> Self {
        Self::NotFound {
            message: "No matching coordinates were found for the supplied address.".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Failed { message }
            | Self::Configuration { message }
            | Self::NotFound { message } => message,
        }
    }
}

/// Resolves addresses to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocode a single address
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_message() {
        let err = GeocodingError::configuration("GEOCODING_API_URL must be configured.");
        assert_eq!(err.to_string(), "GEOCODING_API_URL must be configured.");
        assert_eq!(err.message(), "GEOCODING_API_URL must be configured.");
    }

    #[test]
    fn test_not_found_default_message() {
        let err = GeocodingError::not_found();
        assert!(matches!(err, GeocodingError::NotFound { .. }));
        assert_eq!(
            err.to_string(),
            "No matching coordinates were found for the supplied address."
        );
    }
}

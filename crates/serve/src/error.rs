//! Error envelope returned by every failing endpoint
//!
//! All failures render as `{ "error": { "code": ..., "message": ... } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use propsearch_core::{GeocodingError, PropsearchError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Code for rejected client input
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

/// Code for unknown resources
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";

/// Code for failures on the server side
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

/// Message used when geocoding yields no coordinate
pub const GEOCODING_NO_RESULTS: &str = "No geocoding results were found for the supplied address.";

/// Message used for unanticipated failures
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// An error ready to be sent to the client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// 400 `INVALID_REQUEST`
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: INVALID_REQUEST,
            message: message.into(),
        }
    }

    /// 404 `RESOURCE_NOT_FOUND`
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: RESOURCE_NOT_FOUND,
            message: message.into(),
        }
    }

    /// 500 `INTERNAL_SERVER_ERROR`
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

/// Wire form of an error
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.message,
            },
        });

        (self.status, body).into_response()
    }
}

impl From<GeocodingError> for ApiError {
    fn from(err: GeocodingError) -> Self {
        match err {
            GeocodingError::NotFound { .. } => Self::invalid_request(GEOCODING_NO_RESULTS),
            GeocodingError::Configuration { message } => {
                error!("Geocoding is misconfigured: {}", message);
                Self::internal(message)
            }
            GeocodingError::Failed { message } => Self::invalid_request(message),
        }
    }
}

impl From<PropsearchError> for ApiError {
    fn from(err: PropsearchError) -> Self {
        if err.is_not_found() {
            return Self::not_found("Resource not found.");
        }

        error!(category = %err.category(), "Unhandled error: {}", err);
        Self::internal(UNEXPECTED_ERROR)
    }
}

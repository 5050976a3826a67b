//! HTTP handlers for the Propsearch serve crate

use crate::error::ApiError;
use crate::validation::validate_search_query;
use axum::{
    extract::{rejection::PathRejection, Path, RawQuery, State},
    response::Json,
};
use propsearch_core::{
    Geocoder, LocationContext, Pagination, PropertyDetail, PropertyQueryEngine, PropertySummary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PropertyQueryEngine>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    /// Create application state from an engine and a geocoder
    pub fn new(engine: PropertyQueryEngine, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            engine: Arc::new(engine),
            geocoder,
        }
    }
}

/// Body of `GET /properties`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub data: Vec<PropertySummary>,
    pub pagination: Pagination,
    /// Present only when an address was supplied and geocoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_context: Option<LocationContext>,
}

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Liveness probe
pub async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Search the listing collection
///
/// # Query Parameters
///
/// - `suburb`: exact suburb match, case-insensitive
/// - `minPrice` / `maxPrice`: inclusive price bounds
/// - `page`: 1-indexed page number (default: 1)
/// - `address`: free-text address, geocoded into `locationContext`
pub async fn handle_search_properties(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<SearchResponse>, ApiError> {
    let request = validate_search_query(query.as_deref()).map_err(|err| {
        warn!("Rejected property search: {}", err.message);
        err
    })?;

    let mut criteria = request.criteria;

    if let Some(address) = request.address.as_deref() {
        let coordinates = state.geocoder.geocode(address).await.map_err(|err| {
            warn!("Geocoding failed for '{}': {}", address, err);
            ApiError::from(err)
        })?;
        debug!(
            "Search origin resolved to ({}, {})",
            coordinates.latitude, coordinates.longitude
        );
        criteria.coordinates = Some(coordinates);
    }

    let page = state.engine.search(&criteria);

    info!(
        "Property search: suburb={:?}, minPrice={:?}, maxPrice={:?}, page={}, total={}",
        criteria.suburb, criteria.min_price, criteria.max_price, criteria.page, page.pagination.total
    );

    Ok(Json(SearchResponse {
        data: page
            .properties
            .iter()
            .map(|property| PropertySummary::from(*property))
            .collect(),
        pagination: page.pagination,
        location_context: page.location_context,
    }))
}

/// Look up a single listing by identifier
pub async fn handle_get_property(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<PropertyDetail>, ApiError> {
    let Path(id) = path.map_err(|rejection| {
        warn!("Rejected property id: {}", rejection.body_text());
        ApiError::invalid_request("Invalid property id.")
    })?;

    match state.engine.get_by_id(&id) {
        Ok(property) => {
            debug!("Property {} found", id);
            Ok(Json(PropertyDetail::from(property)))
        }
        Err(err) if err.is_not_found() => {
            info!("Property {} not found", id);
            Err(ApiError::not_found("Property not found."))
        }
        Err(err) => Err(ApiError::from(err)),
    }
}

/// Catch-all for unknown routes
pub async fn handle_not_found() -> ApiError {
    ApiError::not_found("Resource not found.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use propsearch_core::{Coordinates, GeocodingError, InMemoryRepository};

    struct FixedGeocoder(Result<Coordinates, GeocodingError>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn geocode(&self, _address: &str) -> Result<Coordinates, GeocodingError> {
            self.0.clone()
        }
    }

    fn state(geocoder: FixedGeocoder) -> AppState {
        let repository = Arc::new(InMemoryRepository::embedded().unwrap());
        AppState::new(PropertyQueryEngine::new(repository), Arc::new(geocoder))
    }

    fn unreachable_geocoder() -> FixedGeocoder {
        FixedGeocoder(Err(GeocodingError::failed("should not be called")))
    }

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = handle_health_check().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_search_without_address_skips_geocoding() {
        let result = handle_search_properties(
            State(state(unreachable_geocoder())),
            RawQuery(Some("suburb=west%20end".to_string())),
        )
        .await;

        let Json(body) = result.unwrap();
        assert!(!body.data.is_empty());
        assert!(body.location_context.is_none());
    }

    #[tokio::test]
    async fn test_search_with_address_attaches_context() {
        let origin = Coordinates {
            latitude: -27.47,
            longitude: 153.02,
        };
        let result = handle_search_properties(
            State(state(FixedGeocoder(Ok(origin)))),
            RawQuery(Some("address=1+George+St+Brisbane".to_string())),
        )
        .await;

        let Json(body) = result.unwrap();
        assert_eq!(body.location_context, Some(LocationContext::new(origin)));
    }

    #[tokio::test]
    async fn test_validation_runs_before_geocoding() {
        let result = handle_search_properties(
            State(state(unreachable_geocoder())),
            RawQuery(Some("address=Queen+St&page=0".to_string())),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "page must be a positive integer when provided.");
    }

    #[tokio::test]
    async fn test_get_property_not_found() {
        let err = handle_get_property(
            State(state(unreachable_geocoder())),
            Ok(Path("unknown".to_string())),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Property not found.");
    }
}

//! HTTP geocoding provider client

use super::{extract_coordinates, Coordinates, Geocoder, GeocodingError};
use crate::config::{GeocodingConfig, GEOCODING_API_URL_VAR};
use crate::{PropsearchError, Result};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// `limit` sent to the provider when the endpoint does not already carry one
pub const DEFAULT_RESULT_LIMIT: u32 = 1;

/// Geocoder backed by a configurable HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: Client,
    config: GeocodingConfig,
}

impl HttpGeocoder {
    /// Create a geocoder; the endpoint itself is only checked per request
    pub fn new(config: GeocodingConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PropsearchError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeocodingConfig {
        &self.config
    }

    /// Build the provider URL for an address
    ///
    /// Query parameters already on the endpoint are kept, except `address`
    /// and `key` which are always replaced.
    pub fn build_request_url(&self, address: &str) -> std::result::Result<Url, GeocodingError> {
        let endpoint = self.config.endpoint().ok_or_else(|| {
            GeocodingError::configuration(format!("{} must be configured.", GEOCODING_API_URL_VAR))
        })?;

        let mut url = Url::parse(endpoint)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| {
                GeocodingError::configuration(format!(
                    "{} is not a valid URL.",
                    GEOCODING_API_URL_VAR
                ))
            })?;

        let preserved: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| name != "address" && name != "key")
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        let has_limit = preserved.iter().any(|(name, _)| name == "limit");

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            pairs.extend_pairs(preserved.iter());
            pairs.append_pair("address", address);
            if !has_limit {
                pairs.append_pair("limit", &DEFAULT_RESULT_LIMIT.to_string());
            }
            if let Some(key) = self.config.key() {
                pairs.append_pair("key", key);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> std::result::Result<Coordinates, GeocodingError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodingError::failed(
                "address must be provided as a non-empty string.",
            ));
        }

        let url = self.build_request_url(address)?;
        debug!("Geocoding address '{}'", address);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!("Geocoding transport failure: {}", e);
                GeocodingError::failed(format!("Failed to call geocoding service: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoding provider answered HTTP {}", status);
            return Err(GeocodingError::failed(format!(
                "Geocoding request failed with status {}.",
                status.as_u16()
            )));
        }

        let invalid_body =
            || GeocodingError::failed("Geocoding service returned an invalid JSON response.");

        let body = response.text().await.map_err(|_| invalid_body())?;
        let payload: Value = serde_json::from_str(&body).map_err(|_| invalid_body())?;

        match extract_coordinates(&payload) {
            Some(coordinates) => {
                debug!(
                    "Geocoded '{}' to ({}, {})",
                    address, coordinates.latitude, coordinates.longitude
                );
                Ok(coordinates)
            }
            None => {
                debug!("No usable coordinates for '{}'", address);
                Err(GeocodingError::not_found())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn geocoder(api_url: Option<String>, api_key: Option<&str>) -> HttpGeocoder {
        HttpGeocoder::new(GeocodingConfig {
            api_url,
            api_key: api_key.map(str::to_string),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_build_request_url_defaults() {
        let geocoder = geocoder(Some("https://geo.example.com/search".to_string()), None);
        let url = geocoder.build_request_url("1 George St Brisbane").unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("address".to_string(), "1 George St Brisbane".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(url.path(), "/search");
    }

    #[test]
    fn test_build_request_url_preserves_and_replaces() {
        let geocoder = geocoder(
            Some("https://geo.example.com/search?limit=5&region=qld&key=old&address=x".to_string()),
            Some("secret"),
        );
        let url = geocoder.build_request_url("Ann St").unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "5".to_string()),
                ("region".to_string(), "qld".to_string()),
                ("address".to_string(), "Ann St".to_string()),
                ("key".to_string(), "secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_endpoint_is_configuration_error() {
        let err = geocoder(None, None).build_request_url("x").unwrap_err();
        assert_eq!(
            err,
            GeocodingError::configuration("GEOCODING_API_URL must be configured.")
        );
    }

    #[test]
    fn test_malformed_endpoint_is_configuration_error() {
        for endpoint in ["not a url", "/relative/path", "ftp://geo.example.com"] {
            let err = geocoder(Some(endpoint.to_string()), None)
                .build_request_url("x")
                .unwrap_err();
            assert_eq!(
                err,
                GeocodingError::configuration("GEOCODING_API_URL is not a valid URL.")
            );
        }
    }

    #[tokio::test]
    async fn test_blank_address_is_generic_failure() {
        let err = geocoder(None, None).geocode("   ").await.unwrap_err();
        assert!(matches!(err, GeocodingError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_geocode_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/geocode")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("address".into(), "1 George St Brisbane".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
                Matcher::UrlEncoded("key".into(), "secret".into()),
            ]))
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"features":[{"geometry":{"coordinates":[153.02,-27.47]}}]}"#)
            .create_async()
            .await;

        let geocoder = geocoder(Some(format!("{}/geocode", server.url())), Some("secret"));
        let coordinates = geocoder.geocode("  1 George St Brisbane ").await.unwrap();

        assert_eq!(
            coordinates,
            Coordinates {
                latitude: -27.47,
                longitude: 153.02
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/geocode")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = geocoder(Some(format!("{}/geocode", server.url())), None)
            .geocode("Queen St")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GeocodingError::failed("Geocoding request failed with status 503.")
        );
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/geocode")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = geocoder(Some(format!("{}/geocode", server.url())), None)
            .geocode("Queen St")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GeocodingError::failed("Geocoding service returned an invalid JSON response.")
        );
    }

    #[tokio::test]
    async fn test_payload_without_coordinates_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/geocode")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create_async()
            .await;

        let err = geocoder(Some(format!("{}/geocode", server.url())), None)
            .geocode("Nowhere Rd")
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on port 1
        let err = geocoder(Some("http://127.0.0.1:1/geocode".to_string()), None)
            .geocode("Queen St")
            .await
            .unwrap_err();

        match err {
            GeocodingError::Failed { message } => {
                assert!(message.starts_with("Failed to call geocoding service:"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

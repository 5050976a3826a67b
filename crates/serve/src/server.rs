//! Server module for the Propsearch serve crate

use crate::api::create_routes;
use crate::handlers::AppState;
use axum::{http::Method, Router};
use propsearch_core::{
    AppConfig, HttpGeocoder, InMemoryRepository, PropertyQueryEngine, PropsearchError, Result,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Propsearch HTTP server
pub struct PropsearchServer {
    config: AppConfig,
    app: Router,
}

impl PropsearchServer {
    /// Load the dataset, wire the geocoder and build the router
    pub fn new(config: AppConfig) -> Result<Self> {
        let state = build_state(&config)?;
        let app = create_app(state, config.server.cors_enabled);

        Ok(Self { config, app })
    }

    /// Start the server and run until Ctrl-C
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| PropsearchError::validation(format!("Invalid address {}: {}", addr, e)))?;

        let listener = tokio::net::TcpListener::bind(socket_addr)
            .await
            .map_err(|e| PropsearchError::network(format!("Failed to bind to {}: {}", addr, e)))?;

        tracing::info!("Propsearch listening on http://{}", addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| PropsearchError::network(format!("Server error: {}", e)))?;

        tracing::info!("Propsearch stopped");
        Ok(())
    }

    /// Get the server configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The fully layered router
    pub fn app(&self) -> Router {
        self.app.clone()
    }
}

/// Build shared state from configuration
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let repository = InMemoryRepository::load(config.data.properties_path.as_deref())?;
    let engine =
        PropertyQueryEngine::new(Arc::new(repository)).with_page_size(config.search.page_size);

    if !config.geocoding.is_configured() {
        tracing::warn!("Geocoding endpoint is not configured; address searches will fail");
    }
    let geocoder = HttpGeocoder::new(config.geocoding.clone())?;

    Ok(AppState::new(engine, Arc::new(geocoder)))
}

/// Create the Axum application with middleware
pub fn create_app(state: AppState, cors_enabled: bool) -> Router {
    let mut app = create_routes()
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);

        app = app.layer(cors);
    }

    app
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: AppConfig,
}

impl ServerBuilder {
    /// Create a new server builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.server.cors_enabled = enabled;
        self
    }

    /// Set the geocoding endpoint
    pub fn geocoding_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.geocoding.api_url = Some(url.into());
        self
    }

    /// Set the geocoding API key
    pub fn geocoding_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.geocoding.api_key = Some(key.into());
        self
    }

    /// Serve records from a JSON file instead of the bundled dataset
    pub fn properties_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.data.properties_path = Some(path.into());
        self
    }

    /// Set the page size
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.search.page_size = page_size;
        self
    }

    /// Validate the configuration and build the server
    pub fn build(self) -> Result<PropsearchServer> {
        self.config.validate()?;
        PropsearchServer::new(self.config)
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let builder = ServerBuilder::new()
            .host("0.0.0.0")
            .port(8080)
            .geocoding_url("https://geo.example.com/search")
            .geocoding_key("secret")
            .cors(false)
            .page_size(10);

        assert_eq!(builder.config.server.host, "0.0.0.0");
        assert_eq!(builder.config.server.port, 8080);
        assert_eq!(
            builder.config.geocoding.endpoint(),
            Some("https://geo.example.com/search")
        );
        assert_eq!(builder.config.geocoding.key(), Some("secret"));
        assert!(!builder.config.server.cors_enabled);
        assert_eq!(builder.config.search.page_size, 10);
    }

    #[test]
    fn test_build_with_bundled_dataset() {
        let server = ServerBuilder::new().port(0).build();
        assert!(server.is_err(), "port 0 is rejected by validation");

        let server = ServerBuilder::new().port(4000).build().unwrap();
        assert_eq!(server.config().server.port, 4000);
    }

    #[test]
    fn test_build_with_missing_dataset_fails() {
        let result = ServerBuilder::new()
            .properties_path("/nonexistent/properties.json")
            .build();
        assert!(matches!(result, Err(PropsearchError::Dataset { .. })));
    }
}

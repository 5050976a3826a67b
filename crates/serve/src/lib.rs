//! Propsearch Serve Library
//!
//! HTTP interface for the Propsearch property listing service.
//!
//! # Endpoints
//!
//! - `GET /health`
//! - `GET /properties?suburb=&minPrice=&maxPrice=&page=&address=`
//! - `GET /properties/:id`

pub mod api;
pub mod error;
pub mod handlers;
pub mod server;
pub mod validation;

pub use api::{create_routes, router};
pub use error::ApiError;
pub use handlers::{AppState, SearchResponse};
pub use server::{build_state, create_app, PropsearchServer, ServerBuilder};

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

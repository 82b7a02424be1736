//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared state handed to handlers
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response envelope and payload DTOs
//! - `errors.rs`: failure envelopes

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use fxsignal_infra::{InferenceService, ServiceConfig};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router against real OS processes.
pub fn build_app(config: &ServiceConfig) -> Router {
    build_app_with(config, InferenceService::from_config(config))
}

/// Build the router around an already wired service.
pub fn build_app_with(config: &ServiceConfig, service: InferenceService) -> Router {
    let services = Arc::new(services::AppServices::new(service));

    routes::router()
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring CORS origin that is not a valid header value");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

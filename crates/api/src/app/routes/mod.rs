use axum::{
    routing::{get, post},
    Router,
};

pub mod signal;
pub mod system;

/// Router for every endpoint; unknown paths fall through to a 404 envelope.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::info))
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .route("/api/signal", get(signal::current_signal))
        .route("/api/train", post(signal::train))
        .route("/api/refresh", post(signal::refresh))
        .fallback(system::not_found)
}

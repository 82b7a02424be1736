use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, http::Uri, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::app::dto::{ApiResponse, HealthStatus, SystemMetrics};
use crate::app::services::AppServices;

pub async fn info() -> impl IntoResponse {
    Json(json!({
        "service": "fxsignal",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
        "endpoints": {
            "health": "GET /health",
            "metrics": "GET /metrics",
            "signal": "GET /api/signal",
            "train": "POST /api/train",
            "refresh": "POST /api/refresh",
        },
    }))
}

/// Always 200; unhealthy is reported in the body.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let report = services.inference.health().await;
    Json(ApiResponse::ok(HealthStatus::from(report)))
}

pub async fn metrics(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let metrics = SystemMetrics::new(
        services.metrics.snapshot(),
        services.inference.last_prediction_time(),
    );
    Json(ApiResponse::ok(metrics))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not Found",
            "path": uri.path(),
            "timestamp": Utc::now(),
        })),
    )
}

use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};
use tracing::info;

use crate::app::dto::{ApiResponse, TrainResult};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn current_signal(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.inference.current_signal().await {
        Ok(record) => {
            services.metrics.record_prediction();
            Json(ApiResponse::ok(record)).into_response()
        }
        Err(e) => errors::orchestration_error_to_response("failed to get prediction", e),
    }
}

pub async fn refresh(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.inference.refresh().await {
        Ok(record) => {
            services.metrics.record_prediction();
            Json(ApiResponse::ok(record)).into_response()
        }
        Err(e) => errors::orchestration_error_to_response("failed to refresh prediction", e),
    }
}

pub async fn train(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    info!("model training requested");
    match services.inference.train().await {
        Ok(report) => Json(ApiResponse::ok(TrainResult::from(report))).into_response(),
        Err(e) => errors::orchestration_error_to_response("training failed", e),
    }
}

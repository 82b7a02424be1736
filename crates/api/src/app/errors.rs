use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use fxsignal_infra::{OrchestrationError, PipelineError};

use crate::app::dto::ApiResponse;

/// Failure envelope for an orchestration error; `context` prefixes the message.
pub fn orchestration_error_to_response(context: &str, err: OrchestrationError) -> Response {
    let status = match err {
        OrchestrationError::Pipeline(PipelineError::AlreadyRunning) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    error!(code = err.code(), error = %err, "{context}");
    json_error(status, format!("{context}: {err}"))
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::failure(message))).into_response()
}

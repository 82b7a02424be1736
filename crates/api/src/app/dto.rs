use chrono::{DateTime, Utc};
use serde::Serialize;

use fxsignal_ai::PipelineStage;
use fxsignal_infra::{HealthReport, PipelineReport, RunId};
use fxsignal_observability::MetricsSnapshot;

// -------------------------
// Envelope
// -------------------------

/// `{success, data?, error?, timestamp}` wrapper around every API payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub python_available: bool,
    pub model_loaded: bool,
    pub api_timestamp: DateTime<Utc>,
}

impl From<HealthReport> for HealthStatus {
    fn from(report: HealthReport) -> Self {
        Self {
            status: if report.healthy() {
                HealthState::Healthy
            } else {
                HealthState::Unhealthy
            },
            python_available: report.runtime_available,
            model_loaded: report.artifact_available,
            api_timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    /// Milliseconds since the service started.
    pub uptime: u64,
    /// Resident memory in MiB.
    pub memory_usage: f64,
    pub last_prediction_time: Option<DateTime<Utc>>,
    pub total_predictions: u64,
}

impl SystemMetrics {
    pub fn new(snapshot: MetricsSnapshot, last_prediction_time: Option<DateTime<Utc>>) -> Self {
        Self {
            uptime: snapshot.uptime.as_millis() as u64,
            memory_usage: snapshot.memory_usage_mb,
            last_prediction_time,
            total_predictions: snapshot.predictions_served,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct TrainResult {
    pub trained: bool,
    pub run_id: RunId,
    pub stages: Vec<StageTiming>,
}

impl From<PipelineReport> for TrainResult {
    fn from(report: PipelineReport) -> Self {
        Self {
            trained: true,
            run_id: report.run_id,
            stages: report
                .stages
                .into_iter()
                .map(|s| StageTiming {
                    stage: s.stage,
                    elapsed_ms: s.elapsed_ms,
                })
                .collect(),
        }
    }
}

//! Pipeline run types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use fxsignal_ai::PipelineStage;

use crate::process::ProcessError;

/// Identifier of one pipeline run (time-ordered, for log correlation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the pipeline is (or where the last run ended).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    FetchData,
    EngineerFeatures,
    Train,
    InvalidateCache,
    Succeeded,
    Failed { stage: PipelineStage, reason: String },
}

impl PipelineState {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            PipelineState::FetchData
                | PipelineState::EngineerFeatures
                | PipelineState::Train
                | PipelineState::InvalidateCache
        )
    }
}

impl From<PipelineStage> for PipelineState {
    fn from(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::FetchData => PipelineState::FetchData,
            PipelineStage::EngineerFeatures => PipelineState::EngineerFeatures,
            PipelineStage::Train => PipelineState::Train,
        }
    }
}

/// Timing of one completed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub elapsed_ms: u64,
}

/// Outcome of a fully successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: RunId,
    pub stages: Vec<StageReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// How a stage's stderr affects its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StderrPolicy {
    /// Only exit status and timeout matter.
    Ignore,
    /// Non-empty stderr fails the stage unless it contains the marker.
    AllowMarker(String),
}

impl Default for StderrPolicy {
    /// Informational logging from the scripts goes to stderr and carries `INFO`.
    fn default() -> Self {
        Self::AllowMarker("INFO".to_string())
    }
}

impl StderrPolicy {
    pub fn check(&self, stderr: &str) -> Result<(), StageFailure> {
        match self {
            StderrPolicy::Ignore => Ok(()),
            StderrPolicy::AllowMarker(marker) => {
                let stderr = stderr.trim();
                if stderr.is_empty() || stderr.contains(marker.as_str()) {
                    Ok(())
                } else {
                    Err(StageFailure::UnexpectedDiagnostics {
                        stderr: stderr.to_string(),
                    })
                }
            }
        }
    }
}

/// Why a single stage failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageFailure {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("unexpected diagnostic output: {stderr}")]
    UnexpectedDiagnostics { stderr: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("a training run is already in progress")]
    AlreadyRunning,

    #[error("stage {stage} failed: {cause}")]
    StageFailed {
        stage: PipelineStage,
        #[source]
        cause: StageFailure,
    },
}

impl PipelineError {
    /// Stage that failed, if the run got that far.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(*stage),
            PipelineError::AlreadyRunning => None,
        }
    }
}

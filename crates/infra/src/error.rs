//! Errors surfaced by [`InferenceService`](crate::InferenceService).

use thiserror::Error;

use fxsignal_ai::ParseError;

use crate::pipeline::PipelineError;
use crate::process::ProcessError;

/// Everything that can go wrong between an HTTP handler and the external process.
///
/// All variants are recoverable: the caller gets a failure response and may
/// retry explicitly. Nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The detached task driving the work panicked or was aborted.
    #[error("background task failed: {0}")]
    Internal(String),
}

impl OrchestrationError {
    /// Stable machine-readable code for logs and responses.
    pub fn code(&self) -> &'static str {
        match self {
            OrchestrationError::Process(e) => e.code(),
            OrchestrationError::Parse(ParseError::NoStructuredOutput) => "no_structured_output",
            OrchestrationError::Parse(ParseError::MalformedRecord(_)) => "malformed_record",
            OrchestrationError::Pipeline(PipelineError::AlreadyRunning) => "training_in_progress",
            OrchestrationError::Pipeline(PipelineError::StageFailed { .. }) => "stage_failed",
            OrchestrationError::Internal(_) => "internal_error",
        }
    }
}

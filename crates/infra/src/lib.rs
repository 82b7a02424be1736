//! Infrastructure layer: external processes, the prediction cache, the
//! retraining pipeline and the availability probe.
//!
//! [`InferenceService`] is the façade the HTTP layer talks to; everything else
//! is exposed for wiring and tests.

pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod probe;
pub mod process;
pub mod service;

#[cfg(test)]
mod testing;

pub use cache::{PredictionCache, PREDICTION_TTL};
pub use config::{ConfigError, RuntimeLayout, ServiceConfig, StageBudgets};
pub use error::OrchestrationError;
pub use pipeline::{PipelineError, PipelineOrchestrator, PipelineReport, PipelineState, RunId, StderrPolicy};
pub use probe::{AvailabilityProbe, HealthReport};
pub use process::{ProcessError, ProcessInvocation, ProcessInvoker, ProcessOutput, TokioProcessInvoker};
pub use service::InferenceService;

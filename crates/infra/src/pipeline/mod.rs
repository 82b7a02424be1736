//! Retraining pipeline: fetch data → engineer features → train → invalidate cache.
//!
//! ## Design
//!
//! - Linear state machine, no branching, no retry
//! - Fail-fast: the first failing stage ends the run; later stages never start
//! - No rollback: files written by earlier stages stay where they are
//! - At most one run in flight; a second request is rejected, not queued
//!
//! ## Components
//!
//! - `types`: run id, state, report, stderr policy, errors
//! - `orchestrator`: [`PipelineOrchestrator`], which drives a run

pub mod orchestrator;
pub mod types;

pub use orchestrator::PipelineOrchestrator;
pub use types::{PipelineError, PipelineReport, PipelineState, RunId, StageFailure, StageReport, StderrPolicy};

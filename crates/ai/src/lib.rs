//! `fxsignal-ai`
//!
//! **Responsibility:** boundary to the external inference process.
//!
//! This crate knows the process's *contract*, never its numerics:
//! - which scripts make up the retraining pipeline, in which order, with which budget
//! - how to pull a [`PredictionRecord`](fxsignal_core::PredictionRecord) out of free-form output
//!
//! It does not spawn anything; infra owns processes.

pub mod parser;
pub mod stage;

pub use parser::{parse, ParseError};
pub use stage::{PipelineStage, INFERENCE_SCRIPT, INFERENCE_TIMEOUT};

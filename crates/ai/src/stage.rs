//! Retraining pipeline stage descriptors.
//!
//! Stages are stateless: a stage is its position in the fixed order, the script
//! it runs, and its default time budget. Run state lives with the orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Script producing a single prediction on stdout.
pub const INFERENCE_SCRIPT: &str = "predict.py";

/// Default time budget for the inference call.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(60);

/// Process stages of the retraining pipeline, in execution order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    FetchData,
    EngineerFeatures,
    Train,
}

impl PipelineStage {
    /// Fixed total order of the pipeline.
    pub const ORDERED: [PipelineStage; 3] = [
        PipelineStage::FetchData,
        PipelineStage::EngineerFeatures,
        PipelineStage::Train,
    ];

    pub fn script(&self) -> &'static str {
        match self {
            PipelineStage::FetchData => "fetch_data.py",
            PipelineStage::EngineerFeatures => "feature_engineer.py",
            PipelineStage::Train => "train_model.py",
        }
    }

    /// Budget used when configuration does not override it.
    pub fn default_timeout(&self) -> Duration {
        match self {
            PipelineStage::FetchData => Duration::from_secs(120),
            PipelineStage::EngineerFeatures => Duration::from_secs(120),
            PipelineStage::Train => Duration::from_secs(300),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::FetchData => "fetch_data",
            PipelineStage::EngineerFeatures => "engineer_features",
            PipelineStage::Train => "train",
        }
    }
}

impl core::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

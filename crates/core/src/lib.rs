//! `fxsignal-core`: domain vocabulary for prediction signals.
//!
//! This crate contains **pure domain** types (no process, cache or HTTP concerns).

pub mod error;
pub mod record;
pub mod signal;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use record::PredictionRecord;
pub use signal::{ClassProbabilities, FeatureReadings, Signal};
pub use value_object::ValueObject;

//! The prediction record produced by one inference run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::signal::{ClassProbabilities, FeatureReadings, Signal};

/// One complete, validated prediction.
///
/// Fields are private: a record is either decoded whole from process output
/// (deserialization runs the same checks as [`PredictionRecord::new`]) or not at
/// all. There is no way to hold a partially filled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PredictionRecordWire")]
pub struct PredictionRecord {
    signal: Signal,
    confidence: f64,
    timestamp: DateTime<Utc>,
    predicted_class: u8,
    class_probabilities: ClassProbabilities,
    latest_features: FeatureReadings,
}

#[derive(Deserialize)]
struct PredictionRecordWire {
    signal: Signal,
    confidence: f64,
    timestamp: DateTime<Utc>,
    predicted_class: u8,
    class_probabilities: ClassProbabilities,
    latest_features: FeatureReadings,
}

impl TryFrom<PredictionRecordWire> for PredictionRecord {
    type Error = DomainError;

    fn try_from(w: PredictionRecordWire) -> Result<Self, Self::Error> {
        Self::new(
            w.signal,
            w.confidence,
            w.class_probabilities,
            w.latest_features,
            w.predicted_class,
            w.timestamp,
        )
    }
}

impl PredictionRecord {
    pub fn new(
        signal: Signal,
        confidence: f64,
        class_probabilities: ClassProbabilities,
        latest_features: FeatureReadings,
        predicted_class: u8,
        timestamp: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !(confidence.is_finite() && (0.0..=1.0).contains(&confidence)) {
            return Err(DomainError::validation(format!(
                "confidence must be in [0, 1], got {confidence}"
            )));
        }
        if Signal::from_class_index(predicted_class).is_none() {
            return Err(DomainError::validation(format!(
                "predicted_class must be 0, 1 or 2, got {predicted_class}"
            )));
        }

        Ok(Self {
            signal,
            confidence,
            timestamp,
            predicted_class,
            class_probabilities,
            latest_features,
        })
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// When the inference process produced this record.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn predicted_class(&self) -> u8 {
        self.predicted_class
    }

    pub fn class_probabilities(&self) -> &ClassProbabilities {
        &self.class_probabilities
    }

    pub fn latest_features(&self) -> &FeatureReadings {
        &self.latest_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "signal": "LONG",
            "confidence": 0.82,
            "timestamp": "2024-03-01T09:30:00.123456Z",
            "predicted_class": 1,
            "class_probabilities": {"SHORT": 0.10, "LONG": 0.82, "NO_TRADE": 0.08},
            "latest_features": {"close": 150.12, "return_1m": 0.0002, "rsi": 61.5, "hour": 9}
        })
    }

    #[test]
    fn decodes_complete_record() {
        let rec: PredictionRecord = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(rec.signal(), Signal::Long);
        assert_eq!(rec.confidence(), 0.82);
        assert_eq!(rec.predicted_class(), 1);
        assert_eq!(rec.latest_features().hour(), 9);
        assert_eq!(rec.class_probabilities().get(Signal::NoTrade), 0.08);
    }

    #[test]
    fn confidence_above_one_is_rejected() {
        let mut v = sample_json();
        v["confidence"] = json!(1.5);
        let err = serde_json::from_value::<PredictionRecord>(v).unwrap_err();
        assert!(err.to_string().contains("confidence"));
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut v = sample_json();
        v.as_object_mut().unwrap().remove("class_probabilities");
        assert!(serde_json::from_value::<PredictionRecord>(v).is_err());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut v = sample_json();
        v["model_version"] = json!("lgbm-3");
        assert!(serde_json::from_value::<PredictionRecord>(v).is_ok());
    }

    #[test]
    fn serializes_back_to_wire_names() {
        let rec: PredictionRecord = serde_json::from_value(sample_json()).unwrap();
        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["signal"], "LONG");
        assert_eq!(out["class_probabilities"]["NO_TRADE"], 0.08);
        assert_eq!(out["latest_features"]["return_1m"], 0.0002);
    }
}

//! Signal classification and the value objects that accompany it.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Allowed drift of the probability sum away from exactly 1.0.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// Three-way trading signal emitted by the inference process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Long,
    Short,
    NoTrade,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Short, Signal::Long, Signal::NoTrade];

    /// Class index used by the model (`SHORT = 0`, `LONG = 1`, `NO_TRADE = 2`).
    pub fn class_index(&self) -> u8 {
        match self {
            Signal::Short => 0,
            Signal::Long => 1,
            Signal::NoTrade => 2,
        }
    }

    pub fn from_class_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Long => "LONG",
            Signal::Short => "SHORT",
            Signal::NoTrade => "NO_TRADE",
        }
    }
}

impl core::fmt::Display for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category probability distribution.
///
/// Invariant: every probability is finite and non-negative, and the three sum
/// to 1 within [`PROBABILITY_SUM_TOLERANCE`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClassProbabilitiesWire")]
pub struct ClassProbabilities {
    #[serde(rename = "SHORT")]
    short: f64,
    #[serde(rename = "LONG")]
    long: f64,
    #[serde(rename = "NO_TRADE")]
    no_trade: f64,
}

#[derive(Deserialize)]
struct ClassProbabilitiesWire {
    #[serde(rename = "SHORT")]
    short: f64,
    #[serde(rename = "LONG")]
    long: f64,
    #[serde(rename = "NO_TRADE")]
    no_trade: f64,
}

impl TryFrom<ClassProbabilitiesWire> for ClassProbabilities {
    type Error = DomainError;

    fn try_from(w: ClassProbabilitiesWire) -> Result<Self, Self::Error> {
        Self::new(w.short, w.long, w.no_trade)
    }
}

impl ClassProbabilities {
    pub fn new(short: f64, long: f64, no_trade: f64) -> DomainResult<Self> {
        let p = Self {
            short,
            long,
            no_trade,
        };
        p.validate()?;
        Ok(p)
    }

    pub fn get(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Short => self.short,
            Signal::Long => self.long,
            Signal::NoTrade => self.no_trade,
        }
    }

    pub fn sum(&self) -> f64 {
        self.short + self.long + self.no_trade
    }
}

impl ValueObject for ClassProbabilities {
    fn validate(&self) -> DomainResult<()> {
        for signal in Signal::ALL {
            let p = self.get(signal);
            if !p.is_finite() || p < 0.0 {
                return Err(DomainError::validation(format!(
                    "probability for {signal} must be a finite non-negative number, got {p}"
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(DomainError::invariant(format!(
                "class probabilities must sum to 1, got {sum:.6}"
            )));
        }
        Ok(())
    }
}

/// Feature readings the model saw for the latest bar.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FeatureReadingsWire")]
pub struct FeatureReadings {
    close: f64,
    return_1m: f64,
    rsi: f64,
    hour: u8,
}

#[derive(Deserialize)]
struct FeatureReadingsWire {
    close: f64,
    return_1m: f64,
    rsi: f64,
    hour: u8,
}

impl TryFrom<FeatureReadingsWire> for FeatureReadings {
    type Error = DomainError;

    fn try_from(w: FeatureReadingsWire) -> Result<Self, Self::Error> {
        Self::new(w.close, w.return_1m, w.rsi, w.hour)
    }
}

impl FeatureReadings {
    pub fn new(close: f64, return_1m: f64, rsi: f64, hour: u8) -> DomainResult<Self> {
        let f = Self {
            close,
            return_1m,
            rsi,
            hour,
        };
        f.validate()?;
        Ok(f)
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn return_1m(&self) -> f64 {
        self.return_1m
    }

    pub fn rsi(&self) -> f64 {
        self.rsi
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }
}

impl ValueObject for FeatureReadings {
    fn validate(&self) -> DomainResult<()> {
        for (name, v) in [
            ("close", self.close),
            ("return_1m", self.return_1m),
            ("rsi", self.rsi),
        ] {
            if !v.is_finite() {
                return Err(DomainError::validation(format!(
                    "feature {name} must be finite, got {v}"
                )));
            }
        }
        if self.hour > 23 {
            return Err(DomainError::validation(format!(
                "feature hour must be in 0..=23, got {}",
                self.hour
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_uses_model_class_indices() {
        assert_eq!(Signal::from_class_index(0), Some(Signal::Short));
        assert_eq!(Signal::from_class_index(1), Some(Signal::Long));
        assert_eq!(Signal::from_class_index(2), Some(Signal::NoTrade));
        assert_eq!(Signal::from_class_index(3), None);
        assert_eq!(Signal::NoTrade.class_index(), 2);
    }

    #[test]
    fn signal_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_string(&Signal::NoTrade).unwrap(), "\"NO_TRADE\"");
        let s: Signal = serde_json::from_str("\"LONG\"").unwrap();
        assert_eq!(s, Signal::Long);
        assert!(serde_json::from_str::<Signal>("\"UNKNOWN\"").is_err());
    }

    #[test]
    fn probabilities_must_sum_to_one() {
        assert!(ClassProbabilities::new(0.10, 0.82, 0.08).is_ok());
        assert!(ClassProbabilities::new(0.3334, 0.3333, 0.3333).is_ok());

        let err = ClassProbabilities::new(0.5, 0.5, 0.5).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn probabilities_reject_negative_and_nan() {
        assert!(ClassProbabilities::new(-0.1, 1.0, 0.1).is_err());
        assert!(ClassProbabilities::new(f64::NAN, 0.5, 0.5).is_err());
    }

    #[test]
    fn probabilities_deserialize_through_validation() {
        let ok: ClassProbabilities =
            serde_json::from_str(r#"{"SHORT":0.1,"LONG":0.82,"NO_TRADE":0.08}"#).unwrap();
        assert_eq!(ok.get(Signal::Long), 0.82);

        let bad = serde_json::from_str::<ClassProbabilities>(r#"{"SHORT":0.9,"LONG":0.9,"NO_TRADE":0.9}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn feature_hour_is_bounded() {
        assert!(FeatureReadings::new(150.0, 0.0001, 55.0, 23).is_ok());
        assert!(FeatureReadings::new(150.0, 0.0001, 55.0, 24).is_err());
        assert!(FeatureReadings::new(f64::INFINITY, 0.0, 55.0, 1).is_err());
    }
}

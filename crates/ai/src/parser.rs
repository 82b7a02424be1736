//! Extraction of a [`PredictionRecord`] from raw inference output.
//!
//! The inference script may print arbitrary diagnostic lines before (or
//! after) its result. The contract is: the **last top-level JSON object** in
//! the text is the result. Objects nested inside another object are part of
//! that object, not candidates of their own.

use serde_json::Value as JsonValue;
use thiserror::Error;

use fxsignal_core::PredictionRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No well-formed JSON object appears anywhere in the output.
    #[error("no structured output found in process output")]
    NoStructuredOutput,

    /// A JSON object was found but it is not a valid prediction record.
    #[error("malformed prediction record: {0}")]
    MalformedRecord(String),
}

/// Decode the last structured block of `raw` into a [`PredictionRecord`].
pub fn parse(raw: &str) -> Result<PredictionRecord, ParseError> {
    let block = last_object(raw).ok_or(ParseError::NoStructuredOutput)?;
    serde_json::from_value(block).map_err(|e| ParseError::MalformedRecord(e.to_string()))
}

/// Scan left to right for top-level JSON objects and keep the last one.
///
/// After a successful decode the scan resumes past the object, so braces
/// inside it are never revisited.
fn last_object(raw: &str) -> Option<JsonValue> {
    let mut last = None;
    let mut pos = 0;

    while let Some(offset) = raw[pos..].find('{') {
        let start = pos + offset;
        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<JsonValue>();

        match stream.next() {
            Some(Ok(value @ JsonValue::Object(_))) => {
                pos = start + stream.byte_offset();
                last = Some(value);
            }
            _ => pos = start + 1,
        }
    }

    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxsignal_core::Signal;
    use proptest::prelude::*;

    const RECORD: &str = r#"{
  "signal": "LONG",
  "confidence": 0.82,
  "timestamp": "2024-03-01T09:30:00.000000Z",
  "predicted_class": 1,
  "class_probabilities": {
    "SHORT": 0.1,
    "LONG": 0.82,
    "NO_TRADE": 0.08
  },
  "latest_features": {
    "close": 150.12,
    "return_1m": 0.0002,
    "rsi": 61.5,
    "hour": 9
  }
}"#;

    #[test]
    fn parses_bare_record() {
        let rec = parse(RECORD).unwrap();
        assert_eq!(rec.signal(), Signal::Long);
        assert_eq!(rec.confidence(), 0.82);
        assert_eq!(rec.class_probabilities().get(Signal::Short), 0.1);
    }

    #[test]
    fn skips_log_lines_before_the_record() {
        let raw = format!(
            "2024-03-01 09:29:58 - fetch_data - INFO - fetched 1440 rows\n\
             loading model from models/usdjpy_model.pkl\n{RECORD}\n"
        );
        assert_eq!(parse(&raw).unwrap(), parse(RECORD).unwrap());
    }

    #[test]
    fn last_top_level_block_wins() {
        let earlier = RECORD.replace("\"LONG\",", "\"SHORT\",").replace("\"predicted_class\": 1", "\"predicted_class\": 0");
        let raw = format!("{earlier}\nsome progress line\n{RECORD}");
        assert_eq!(parse(&raw).unwrap().signal(), Signal::Long);
    }

    #[test]
    fn stray_braces_in_logs_are_ignored() {
        let raw = format!("params={{max_depth: 6}} not json\n{RECORD}\ntrailing }} brace");
        assert_eq!(parse(&raw).unwrap().signal(), Signal::Long);
    }

    #[test]
    fn no_object_is_no_structured_output() {
        assert_eq!(parse(""), Err(ParseError::NoStructuredOutput));
        assert_eq!(
            parse("Traceback (most recent call last):\n  File \"predict.py\"\n"),
            Err(ParseError::NoStructuredOutput)
        );
        assert_eq!(parse("[1, 2, 3]"), Err(ParseError::NoStructuredOutput));
    }

    #[test]
    fn confidence_out_of_range_is_malformed() {
        let raw = RECORD.replace("\"confidence\": 0.82", "\"confidence\": 1.5");
        assert!(matches!(parse(&raw), Err(ParseError::MalformedRecord(_))));
    }

    #[test]
    fn probabilities_not_summing_to_one_is_malformed() {
        let raw = RECORD.replace("\"NO_TRADE\": 0.08", "\"NO_TRADE\": 0.5");
        assert!(matches!(parse(&raw), Err(ParseError::MalformedRecord(_))));
    }

    #[test]
    fn unrelated_trailing_object_is_malformed() {
        let raw = format!("{RECORD}\n{{\"status\": \"done\"}}");
        assert!(matches!(parse(&raw), Err(ParseError::MalformedRecord(_))));
    }

    #[test]
    fn nan_in_record_falls_back_to_nested_object() {
        // json.dumps emits bare NaN, which is not JSON. The outer block fails to
        // decode, so the last decodable object is an inner map.
        let raw = RECORD.replace("\"rsi\": 61.5", "\"rsi\": NaN");
        assert!(matches!(parse(&raw), Err(ParseError::MalformedRecord(_))));
    }

    fn noise_line() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 :.,_=-]{0,60}"
    }

    proptest! {
        #[test]
        fn record_survives_any_surrounding_noise(
            before in prop::collection::vec(noise_line(), 0..8),
            after in prop::collection::vec(noise_line(), 0..4),
        ) {
            let raw = format!("{}\n{RECORD}\n{}", before.join("\n"), after.join("\n"));
            prop_assert_eq!(parse(&raw).unwrap(), parse(RECORD).unwrap());
        }
    }
}

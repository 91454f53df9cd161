//! Classification of telemetry JSON payloads into typed scalar metrics.

use crate::entity::{Channel, EntityTopic};
use crate::error::{Error, Result};
use crate::types::{DataType, ScalarValue};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Outcome of classifying one JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A value with a direct Sparkplug scalar mapping.
    Scalar(ScalarValue),
    /// Objects, arrays and nulls; these produce no metric.
    Unsupported,
}

impl Classification {
    /// Classifies a JSON value by its type.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(v) => Classification::Scalar(ScalarValue::Double(v)),
                None => Classification::Unsupported,
            },
            Value::Bool(b) => Classification::Scalar(ScalarValue::Boolean(*b)),
            Value::String(s) => Classification::Scalar(ScalarValue::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => Classification::Unsupported,
        }
    }
}

/// A named scalar metric extracted from a telemetry payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedMetric {
    /// Metric name as published in BIRTH certificates.
    pub name: String,
    /// Current value.
    pub value: ScalarValue,
}

impl TypedMetric {
    /// Creates a metric.
    pub fn new(name: impl Into<String>, value: ScalarValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The Sparkplug datatype of the current value.
    pub fn datatype(&self) -> DataType {
        self.value.datatype()
    }
}

/// The metrics of one telemetry message and the instant they apply to.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Payload `time`, or the bus receive time.
    pub timestamp: DateTime<Utc>,
    /// Metrics in payload order.
    pub metrics: Vec<TypedMetric>,
}

impl Measurement {
    /// The timestamp in milliseconds since Unix epoch, clamped at zero.
    pub fn timestamp_millis(&self) -> u64 {
        u64::try_from(self.timestamp.timestamp_millis()).unwrap_or(0)
    }
}

/// Turns a telemetry payload received on `topic` into typed metrics.
///
/// An empty payload is a clear on the alarm channel and carries nothing on the
/// other channels. Malformed JSON and non-object payloads are errors.
pub fn classify(topic: &EntityTopic, payload: &[u8], received: DateTime<Utc>) -> Result<Measurement> {
    let text = std::str::from_utf8(payload)?;

    let object = if text.trim().is_empty() {
        if topic.channel != Channel::Alarm {
            return Ok(Measurement {
                timestamp: received,
                metrics: Vec::new(),
            });
        }
        Map::new()
    } else {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(object) => object,
            other => {
                return Err(Error::InvalidPayload(format!(
                    "expected a JSON object, got {}",
                    json_type(&other)
                )))
            }
        }
    };

    let timestamp = resolve_time(&object, received);
    let metrics = match topic.channel {
        Channel::Measurement => measurement_metrics(&object),
        Channel::Event => vec![TypedMetric::new(
            format!("Event/{}", topic.subtype_or_default()),
            ScalarValue::String(text_field(&object)),
        )],
        Channel::Alarm => {
            let text = text_field(&object);
            let prefix = format!("Alarm/{}", topic.subtype_or_default());
            vec![
                TypedMetric::new(format!("{}/Active", prefix), ScalarValue::Boolean(!text.is_empty())),
                TypedMetric::new(format!("{}/Text", prefix), ScalarValue::String(text)),
            ]
        }
    };

    Ok(Measurement { timestamp, metrics })
}

fn measurement_metrics(object: &Map<String, Value>) -> Vec<TypedMetric> {
    object
        .iter()
        .filter(|(key, _)| key.as_str() != "time")
        .filter_map(|(key, value)| match Classification::of(value) {
            Classification::Scalar(scalar) => Some(TypedMetric::new(key.as_str(), scalar)),
            Classification::Unsupported => None,
        })
        .collect()
}

fn text_field(object: &Map<String, Value>) -> String {
    object
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Uses the payload's string `time` when it parses as RFC 3339.
fn resolve_time(object: &Map<String, Value>, received: DateTime<Utc>) -> DateTime<Utc> {
    match object.get("time").and_then(Value::as_str) {
        Some(time) => match DateTime::parse_from_rfc3339(time) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(err) => {
                log::debug!("ignoring unparseable time {:?}: {}", time, err);
                received
            }
        },
        None => received,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn topic(t: &str) -> EntityTopic {
        EntityTopic::parse(t).unwrap()
    }

    fn received() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 25, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_measurement_types() {
        let payload = br#"{"time":"2026-01-15T08:30:00Z","temperature":23.5,"active":true,"status":"ok","nested":{"a":1},"list":[1,2],"nothing":null}"#;
        let m = classify(&topic("te/device/s///m/"), payload, received()).unwrap();

        assert_eq!(
            m.metrics,
            vec![
                TypedMetric::new("temperature", ScalarValue::Double(23.5)),
                TypedMetric::new("active", ScalarValue::Boolean(true)),
                TypedMetric::new("status", ScalarValue::String("ok".to_string())),
            ]
        );
        assert_eq!(m.timestamp, Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_time_only_measurement_is_empty() {
        let m = classify(&topic("te/device/s///m/"), br#"{"time":"2026-01-15T08:30:00Z"}"#, received()).unwrap();
        assert!(m.metrics.is_empty());
    }

    #[test]
    fn test_numeric_time_falls_back_to_receive_time() {
        let m = classify(&topic("te/device/s///m/"), br#"{"time":1700000000,"v":1}"#, received()).unwrap();
        assert_eq!(m.timestamp, received());
    }

    #[test]
    fn test_event_metric() {
        let m = classify(&topic("te/device/s///e/login"), br#"{"text":"user logged in"}"#, received()).unwrap();
        assert_eq!(
            m.metrics,
            vec![TypedMetric::new("Event/login", ScalarValue::String("user logged in".to_string()))]
        );

        let m = classify(&topic("te/device/s///e/"), br#"{}"#, received()).unwrap();
        assert_eq!(m.metrics, vec![TypedMetric::new("Event/default", ScalarValue::String(String::new()))]);
    }

    #[test]
    fn test_alarm_raise_and_clear() {
        let raised = classify(&topic("te/device/s///a/HighTemp"), br#"{"text":"too hot","severity":"major"}"#, received()).unwrap();
        assert_eq!(raised.metrics[0], TypedMetric::new("Alarm/HighTemp/Active", ScalarValue::Boolean(true)));
        assert_eq!(raised.metrics[1], TypedMetric::new("Alarm/HighTemp/Text", ScalarValue::String("too hot".to_string())));

        let cleared = classify(&topic("te/device/s///a/HighTemp"), b"  \n", received()).unwrap();
        assert_eq!(cleared.metrics[0].value, ScalarValue::Boolean(false));
        assert_eq!(cleared.metrics[1].value, ScalarValue::String(String::new()));
        assert_eq!(cleared.timestamp, received());
    }

    #[test]
    fn test_empty_payload_on_other_channels() {
        for t in ["te/device/s///m/", "te/device/s///e/x"] {
            let m = classify(&topic(t), b"", received()).unwrap();
            assert!(m.metrics.is_empty());
        }
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(classify(&topic("te/device/s///m/"), b"{not json", received()), Err(Error::Json(_))));
        assert!(matches!(classify(&topic("te/device/s///m/"), b"[1,2]", received()), Err(Error::InvalidPayload(_))));
        assert!(matches!(classify(&topic("te/device/s///m/"), &[0xff, 0xfe], received()), Err(Error::Utf8Error(_))));
    }
}

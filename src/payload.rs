//! Sparkplug payload building and parsing.
//!
//! This is the binary codec: [`Payload::serialize`] and [`Payload::parse`]
//! convert between the typed payload and the Sparkplug B protobuf encoding.

use crate::error::{Error, Result};
use crate::proto;
use crate::proto::payload::metric::Value as WireValue;
use crate::types::{DataType, Metric, MetricValue};
use prost::Message as _;

/// Highest sequence number a payload may carry.
pub const MAX_SEQ: u64 = 255;

/// A Sparkplug payload builder for creating BIRTH, DATA, and other messages.
///
/// Metrics added after [`set_timestamp`](Self::set_timestamp) carry the
/// payload timestamp as their own timestamp.
///
/// # Example
///
/// ```
/// use sparkplug_flows::PayloadBuilder;
///
/// let mut builder = PayloadBuilder::new();
/// builder
///     .set_timestamp(1_700_000_000_000)
///     .add_double_with_alias("Temperature", 1, 20.5)
///     .add_bool_with_alias("Active", 2, true);
///
/// let bytes = builder.serialize()?;
/// # Ok::<(), sparkplug_flows::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    payload: Payload,
}

impl PayloadBuilder {
    /// Creates a new, empty payload builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the payload-level timestamp in milliseconds since Unix epoch.
    pub fn set_timestamp(&mut self, timestamp: u64) -> &mut Self {
        self.payload.timestamp = Some(timestamp);
        self
    }

    /// Sets the sequence number.
    pub fn set_seq(&mut self, seq: u64) -> &mut Self {
        self.payload.seq = Some(seq);
        self
    }

    /// Sets the payload UUID.
    pub fn set_uuid(&mut self, uuid: impl Into<String>) -> &mut Self {
        self.payload.uuid = Some(uuid.into());
        self
    }

    /// Adds a fully specified metric as-is.
    pub fn add_metric(&mut self, metric: Metric) -> &mut Self {
        self.payload.metrics.push(metric);
        self
    }

    fn push(&mut self, name: Option<&str>, alias: Option<u64>, value: MetricValue) -> &mut Self {
        let datatype = value.datatype();
        self.add_metric(Metric {
            name: name.map(str::to_string),
            alias,
            timestamp: self.payload.timestamp,
            datatype,
            value,
        })
    }

    /// Adds a 32-bit integer metric by name.
    pub fn add_int32(&mut self, name: &str, value: i32) -> &mut Self {
        self.push(Some(name), None, MetricValue::Int32(value))
    }

    /// Adds a 64-bit integer metric by name.
    pub fn add_int64(&mut self, name: &str, value: i64) -> &mut Self {
        self.push(Some(name), None, MetricValue::Int64(value))
    }

    /// Adds a float metric by name.
    pub fn add_float(&mut self, name: &str, value: f32) -> &mut Self {
        self.push(Some(name), None, MetricValue::Float(value))
    }

    /// Adds a double metric by name.
    pub fn add_double(&mut self, name: &str, value: f64) -> &mut Self {
        self.push(Some(name), None, MetricValue::Double(value))
    }

    /// Adds a boolean metric by name.
    pub fn add_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.push(Some(name), None, MetricValue::Boolean(value))
    }

    /// Adds a string metric by name.
    pub fn add_string(&mut self, name: &str, value: &str) -> &mut Self {
        self.push(Some(name), None, MetricValue::String(value.to_string()))
    }

    // Birth certificate metrics: name and alias.

    /// Adds a double metric with both name and alias.
    pub fn add_double_with_alias(&mut self, name: &str, alias: u64, value: f64) -> &mut Self {
        self.push(Some(name), Some(alias), MetricValue::Double(value))
    }

    /// Adds a boolean metric with both name and alias.
    pub fn add_bool_with_alias(&mut self, name: &str, alias: u64, value: bool) -> &mut Self {
        self.push(Some(name), Some(alias), MetricValue::Boolean(value))
    }

    /// Adds a string metric with both name and alias.
    pub fn add_string_with_alias(&mut self, name: &str, alias: u64, value: &str) -> &mut Self {
        self.push(Some(name), Some(alias), MetricValue::String(value.to_string()))
    }

    /// Adds a metric with name and alias whose value is the explicit null marker.
    pub fn add_null_with_alias(&mut self, name: &str, alias: u64, datatype: DataType) -> &mut Self {
        self.add_metric(Metric {
            name: Some(name.to_string()),
            alias: Some(alias),
            timestamp: self.payload.timestamp,
            datatype,
            value: MetricValue::Null,
        })
    }

    // Report-by-exception metrics: alias only.

    /// Adds a double metric by alias only.
    pub fn add_double_by_alias(&mut self, alias: u64, value: f64) -> &mut Self {
        self.push(None, Some(alias), MetricValue::Double(value))
    }

    /// Adds a boolean metric by alias only.
    pub fn add_bool_by_alias(&mut self, alias: u64, value: bool) -> &mut Self {
        self.push(None, Some(alias), MetricValue::Boolean(value))
    }

    /// Adds a string metric by alias only.
    pub fn add_string_by_alias(&mut self, alias: u64, value: &str) -> &mut Self {
        self.push(None, Some(alias), MetricValue::String(value.to_string()))
    }

    /// Serializes the payload to Sparkplug B protobuf bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.payload.serialize()
    }

    /// Finishes building and returns the payload.
    pub fn build(self) -> Payload {
        self.payload
    }
}

/// A Sparkplug payload.
///
/// Produced either by [`PayloadBuilder::build`] or by [`Payload::parse`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload {
    timestamp: Option<u64>,
    seq: Option<u64>,
    uuid: Option<String>,
    metrics: Vec<Metric>,
}

impl Payload {
    /// Parses a Sparkplug payload from binary protobuf data.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let wire = proto::Payload::decode(data)?;
        Ok(Self {
            timestamp: wire.timestamp,
            seq: wire.seq,
            uuid: wire.uuid,
            metrics: wire.metrics.into_iter().map(metric_from_wire).collect(),
        })
    }

    /// Serializes the payload to binary protobuf data.
    ///
    /// Either the whole payload is encoded or an error is returned.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        if let Some(seq) = self.seq {
            if seq > MAX_SEQ {
                return Err(Error::InvalidSequence(seq));
            }
        }

        let wire = proto::Payload {
            timestamp: self.timestamp,
            metrics: self.metrics.iter().map(metric_to_wire).collect(),
            seq: self.seq,
            uuid: self.uuid.clone(),
            body: None,
        };

        let mut buf = Vec::with_capacity(wire.encoded_len());
        wire.encode(&mut buf)?;
        Ok(buf)
    }

    /// Gets the payload-level timestamp, if present.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Gets the payload-level sequence number, if present.
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Gets the payload UUID, if present.
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    /// Returns the number of metrics in the payload.
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    /// Gets a metric at the specified index.
    pub fn metric_at(&self, index: usize) -> Result<&Metric> {
        self.metrics.get(index).ok_or(Error::InvalidMetricIndex {
            index,
            count: self.metrics.len(),
        })
    }

    /// Returns an iterator over all metrics in the payload.
    pub fn metrics(&self) -> std::slice::Iter<'_, Metric> {
        self.metrics.iter()
    }

    /// Consumes the payload, returning its metrics.
    pub fn into_metrics(self) -> Vec<Metric> {
        self.metrics
    }
}

// Signed values travel as the two's complement bits of the unsigned wire field.
fn value_to_wire(value: &MetricValue) -> Option<WireValue> {
    let wire = match value {
        MetricValue::Int8(v) => WireValue::IntValue(i32::from(*v) as u32),
        MetricValue::Int16(v) => WireValue::IntValue(i32::from(*v) as u32),
        MetricValue::Int32(v) => WireValue::IntValue(*v as u32),
        MetricValue::Int64(v) => WireValue::LongValue(*v as u64),
        MetricValue::UInt8(v) => WireValue::IntValue(u32::from(*v)),
        MetricValue::UInt16(v) => WireValue::IntValue(u32::from(*v)),
        MetricValue::UInt32(v) => WireValue::IntValue(*v),
        MetricValue::UInt64(v) => WireValue::LongValue(*v),
        MetricValue::Float(v) => WireValue::FloatValue(*v),
        MetricValue::Double(v) => WireValue::DoubleValue(*v),
        MetricValue::Boolean(v) => WireValue::BooleanValue(*v),
        MetricValue::String(v) => WireValue::StringValue(v.clone()),
        MetricValue::DateTime(v) => WireValue::LongValue(*v),
        MetricValue::Null => return None,
    };
    Some(wire)
}

fn value_from_wire(datatype: DataType, value: WireValue) -> MetricValue {
    match value {
        WireValue::IntValue(v) => match datatype {
            DataType::Int8 => MetricValue::Int8(v as i32 as i8),
            DataType::Int16 => MetricValue::Int16(v as i32 as i16),
            DataType::UInt8 => MetricValue::UInt8(v as u8),
            DataType::UInt16 => MetricValue::UInt16(v as u16),
            DataType::UInt32 => MetricValue::UInt32(v),
            _ => MetricValue::Int32(v as i32),
        },
        WireValue::LongValue(v) => match datatype {
            DataType::UInt64 => MetricValue::UInt64(v),
            DataType::DateTime => MetricValue::DateTime(v),
            _ => MetricValue::Int64(v as i64),
        },
        WireValue::FloatValue(v) => MetricValue::Float(v),
        WireValue::DoubleValue(v) => MetricValue::Double(v),
        WireValue::BooleanValue(v) => MetricValue::Boolean(v),
        WireValue::StringValue(v) => MetricValue::String(v),
    }
}

fn metric_to_wire(metric: &Metric) -> proto::payload::Metric {
    let value = value_to_wire(&metric.value);
    proto::payload::Metric {
        name: metric.name.clone(),
        alias: metric.alias,
        timestamp: metric.timestamp,
        datatype: Some(metric.datatype.into()),
        is_historical: None,
        is_transient: None,
        is_null: value.is_none().then_some(true),
        value,
    }
}

fn metric_from_wire(wire: proto::payload::Metric) -> Metric {
    let declared = DataType::from(wire.datatype.unwrap_or_default());
    let value = match wire.value {
        Some(value) if !wire.is_null.unwrap_or(false) => value_from_wire(declared, value),
        _ => MetricValue::Null,
    };
    // Third-party publishers sometimes omit the datatype; infer it from the value.
    let datatype = match declared {
        DataType::Unknown => value.datatype(),
        declared => declared,
    };
    Metric {
        name: wire.name,
        alias: wire.alias,
        timestamp: wire.timestamp,
        datatype,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_signed_int_round_trip() {
        let mut builder = PayloadBuilder::new();
        builder.add_metric(Metric {
            name: Some("i8".to_string()),
            alias: None,
            timestamp: None,
            datatype: DataType::Int8,
            value: MetricValue::Int8(-5),
        });
        builder.add_int64("i64", i64::MIN);

        let payload = Payload::parse(&builder.serialize().unwrap()).unwrap();
        assert_eq!(payload.metric_at(0).unwrap().value, MetricValue::Int8(-5));
        assert_eq!(payload.metric_at(1).unwrap().value, MetricValue::Int64(i64::MIN));
    }

    #[test]
    fn test_null_metric_sets_is_null() {
        let mut builder = PayloadBuilder::new();
        builder.add_null_with_alias("missing", 3, DataType::Double);

        let wire = proto::Payload::decode(builder.serialize().unwrap().as_slice()).unwrap();
        assert_eq!(wire.metrics[0].is_null, Some(true));
        assert!(wire.metrics[0].value.is_none());
        assert_eq!(wire.metrics[0].datatype, Some(10));
    }

    #[test]
    fn test_missing_datatype_is_inferred() {
        let wire = proto::Payload {
            metrics: vec![proto::payload::Metric {
                name: Some("count".to_string()),
                value: Some(WireValue::IntValue(7)),
                ..Default::default()
            }],
            ..Default::default()
        };
        let payload = Payload::parse(&wire.encode_to_vec()).unwrap();
        let metric = payload.metric_at(0).unwrap();
        assert_eq!(metric.datatype, DataType::Int32);
        assert_eq!(metric.value, MetricValue::Int32(7));
    }

    #[test]
    fn test_seq_out_of_range_is_rejected() {
        let mut builder = PayloadBuilder::new();
        builder.set_seq(256);
        assert!(matches!(builder.serialize(), Err(Error::InvalidSequence(256))));
    }
}

//! Common types for the Sparkplug flows.

use serde::{Deserialize, Serialize};

/// Sparkplug data types.
///
/// The discriminants are the datatype constants carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
#[repr(u32)]
pub enum DataType {
    /// Unknown or unsupported type
    Unknown = 0,
    /// Signed 8-bit integer
    Int8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Signed 32-bit integer
    Int32 = 3,
    /// Signed 64-bit integer
    Int64 = 4,
    /// Unsigned 8-bit integer
    UInt8 = 5,
    /// Unsigned 16-bit integer
    UInt16 = 6,
    /// Unsigned 32-bit integer
    UInt32 = 7,
    /// Unsigned 64-bit integer
    UInt64 = 8,
    /// 32-bit floating point
    Float = 9,
    /// 64-bit floating point
    Double = 10,
    /// Boolean value
    Boolean = 11,
    /// String value
    String = 12,
    /// DateTime value (milliseconds since Unix epoch)
    DateTime = 13,
    /// Text value
    Text = 14,
}

impl From<u32> for DataType {
    fn from(dt: u32) -> Self {
        match dt {
            1 => DataType::Int8,
            2 => DataType::Int16,
            3 => DataType::Int32,
            4 => DataType::Int64,
            5 => DataType::UInt8,
            6 => DataType::UInt16,
            7 => DataType::UInt32,
            8 => DataType::UInt64,
            9 => DataType::Float,
            10 => DataType::Double,
            11 => DataType::Boolean,
            12 => DataType::String,
            13 => DataType::DateTime,
            14 => DataType::Text,
            _ => DataType::Unknown,
        }
    }
}

impl From<DataType> for u32 {
    fn from(dt: DataType) -> Self {
        dt as u32
    }
}

/// Metric value type.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Signed 8-bit integer value
    Int8(i8),
    /// Signed 16-bit integer value
    Int16(i16),
    /// Signed 32-bit integer value
    Int32(i32),
    /// Signed 64-bit integer value
    Int64(i64),
    /// Unsigned 8-bit integer value
    UInt8(u8),
    /// Unsigned 16-bit integer value
    UInt16(u16),
    /// Unsigned 32-bit integer value
    UInt32(u32),
    /// Unsigned 64-bit integer value
    UInt64(u64),
    /// 32-bit floating point value
    Float(f32),
    /// 64-bit floating point value
    Double(f64),
    /// Boolean value
    Boolean(bool),
    /// String value
    String(String),
    /// DateTime value in milliseconds since Unix epoch
    DateTime(u64),
    /// Null value
    Null,
}

impl MetricValue {
    /// Returns true for the explicit null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, MetricValue::Null)
    }

    /// The datatype a value is published under when none is declared.
    pub fn datatype(&self) -> DataType {
        match self {
            MetricValue::Int8(_) => DataType::Int8,
            MetricValue::Int16(_) => DataType::Int16,
            MetricValue::Int32(_) => DataType::Int32,
            MetricValue::Int64(_) => DataType::Int64,
            MetricValue::UInt8(_) => DataType::UInt8,
            MetricValue::UInt16(_) => DataType::UInt16,
            MetricValue::UInt32(_) => DataType::UInt32,
            MetricValue::UInt64(_) => DataType::UInt64,
            MetricValue::Float(_) => DataType::Float,
            MetricValue::Double(_) => DataType::Double,
            MetricValue::Boolean(_) => DataType::Boolean,
            MetricValue::String(_) => DataType::String,
            MetricValue::DateTime(_) => DataType::DateTime,
            MetricValue::Null => DataType::Unknown,
        }
    }
}

/// A scalar value the outbound path can publish.
///
/// Serialized untagged so a persisted `lastValue` is the plain JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Published as [`DataType::Double`]
    Double(f64),
    /// Published as [`DataType::Boolean`]
    Boolean(bool),
    /// Published as [`DataType::String`]
    String(String),
}

impl ScalarValue {
    /// The Sparkplug datatype this value is published under.
    pub fn datatype(&self) -> DataType {
        match self {
            ScalarValue::Double(_) => DataType::Double,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::String(_) => DataType::String,
        }
    }

    /// Returns the value only if it can be published as `datatype`.
    ///
    /// Integral JSON numbers read back from storage are already doubles, so
    /// this is a pure datatype check.
    pub fn coerce(self, datatype: DataType) -> Option<ScalarValue> {
        if self.datatype() == datatype {
            Some(self)
        } else {
            None
        }
    }
}

impl From<ScalarValue> for MetricValue {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Double(v) => MetricValue::Double(v),
            ScalarValue::Boolean(v) => MetricValue::Boolean(v),
            ScalarValue::String(v) => MetricValue::String(v),
        }
    }
}

/// Metric information.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Metric name (absent on alias-only DATA metrics)
    pub name: Option<String>,
    /// Metric alias (if present)
    pub alias: Option<u64>,
    /// Metric timestamp in milliseconds since Unix epoch (if present)
    pub timestamp: Option<u64>,
    /// Data type
    pub datatype: DataType,
    /// Metric value (or Null)
    pub value: MetricValue,
}

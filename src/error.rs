//! Error types for the Sparkplug flows.

use thiserror::Error;

/// Result type alias for Sparkplug flow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while translating between telemetry and Sparkplug B.
#[derive(Error, Debug)]
pub enum Error {
    /// A topic did not follow the expected grammar.
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// A required configuration field is absent or empty.
    #[error("Missing required configuration: {field}")]
    MissingConfig {
        /// The configuration field that is missing
        field: &'static str,
    },

    /// A telemetry payload was well-formed JSON but not usable.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 conversion error.
    #[error("Invalid UTF-8 string: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    /// Failed to serialize a payload.
    #[error("Failed to serialize payload: buffer too small (need at least {required} bytes)")]
    SerializeFailed {
        /// The required buffer size in bytes
        required: usize,
    },

    /// Failed to parse a payload.
    #[error("Failed to parse payload: {0}")]
    ParseFailed(#[from] prost::DecodeError),

    /// Invalid metric index.
    #[error("Invalid metric index: {index} (payload has {count} metrics)")]
    InvalidMetricIndex {
        /// The invalid index that was requested
        index: usize,
        /// The actual metric count in the payload
        count: usize,
    },

    /// A payload sequence number outside 0-255.
    #[error("Invalid sequence number: {0} (must be 0-255)")]
    InvalidSequence(u64),
}

impl From<prost::EncodeError> for Error {
    fn from(err: prost::EncodeError) -> Self {
        Error::SerializeFailed {
            required: err.required_capacity(),
        }
    }
}

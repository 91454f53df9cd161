//! Sparkplug B protocol adapter flows for an edge gateway's message router.
//!
//! This library translates between the gateway's entity/measurement data
//! model and the Sparkplug B MQTT SCADA protocol. Both directions run as
//! message-at-a-time flows: the host runtime hands in one bus message and
//! republishes whatever comes back.
//!
//! # Features
//!
//! - **Report by Exception**: DATA messages carry only the metrics that arrived
//! - **Stable aliases**: per-device alias registries kept in injected state
//! - **BIRTH reissue**: a retained BIRTH is republished whenever a device grows
//!   a new metric, replaying the last known value of every other metric
//! - **Pure Rust codec**: Sparkplug B payloads encoded with `prost`
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`Publisher`]: telemetry (measurements, events, alarms) to Sparkplug B
//! - [`Subscriber`]: Sparkplug B DATA and BIRTH to flat measurements
//! - [`PayloadBuilder`]: Build payloads with type-safe metric additions
//! - [`Payload`]: Parse and read received payloads
//! - [`DeviceRegistry`] and [`SequenceCounter`]: protocol state, persisted
//!   through a [`KeyValueStore`]
//!
//! # Example: Publisher
//!
//! ```
//! use chrono::Utc;
//! use sparkplug_flows::{MemoryStore, Message, Payload, Publisher, PublisherConfig};
//!
//! # fn main() -> Result<(), sparkplug_flows::Error> {
//! let config = PublisherConfig::new("my-factory", "gateway01");
//! let mut publisher = Publisher::new(config, MemoryStore::new());
//!
//! let output = publisher.on_message(&Message::new(
//!     Utc::now(),
//!     "te/device/sensor01///m/",
//!     r#"{"temperature":23.5}"#,
//! ));
//!
//! // First contact: a retained DBIRTH, then the DDATA
//! assert_eq!(output.len(), 2);
//! assert!(output[0].is_retained());
//!
//! let birth = Payload::parse(&output[0].payload)?;
//! assert_eq!(birth.metric_at(0)?.name.as_deref(), Some("temperature"));
//!
//! let data = Payload::parse(&output[1].payload)?;
//! assert_eq!(data.metric_at(0)?.name, None);
//! assert_eq!(data.metric_at(0)?.alias, Some(0));
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Subscriber
//!
//! ```
//! use chrono::Utc;
//! use sparkplug_flows::{MemoryStore, Message, PayloadBuilder, Subscriber, SubscriberConfig};
//!
//! # fn main() -> Result<(), sparkplug_flows::Error> {
//! let mut data = PayloadBuilder::new();
//! data.add_double("voltage", 230.1).add_bool("running", true);
//!
//! let mut subscriber = Subscriber::new(SubscriberConfig::new(), MemoryStore::new());
//! let output = subscriber.on_message(&Message::new(
//!     Utc::now(),
//!     "spBv1.0/factory/NDATA/gateway01",
//!     data.serialize()?,
//! ));
//!
//! assert_eq!(output[0].topic, "te/device/gateway01///m/");
//! let body: serde_json::Value = serde_json::from_slice(&output[0].payload)?;
//! assert_eq!(body["running"], 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[allow(missing_docs)]
pub mod proto;

pub mod classify;
pub mod entity;
pub mod error;
pub mod message;
pub mod payload;
pub mod publisher;
pub mod registry;
pub mod sequence;
pub mod store;
pub mod subscriber;
pub mod topic;
pub mod types;

pub use classify::{classify, Classification, Measurement, TypedMetric};
pub use entity::{Channel, EntityTopic};
pub use error::{Error, Result};
pub use message::{Message, MqttFlags, QoS};
pub use payload::{Payload, PayloadBuilder};
pub use publisher::{Publisher, PublisherConfig};
pub use registry::{DeviceRegistry, RegistryEntry};
pub use sequence::SequenceCounter;
pub use store::{KeyValueStore, MemoryStore};
pub use subscriber::{Subscriber, SubscriberConfig};
pub use topic::{MessageType, ParsedTopic, Scope, SparkplugTopic};
pub use types::{DataType, Metric, MetricValue, ScalarValue};

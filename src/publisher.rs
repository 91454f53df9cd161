//! Sparkplug publisher: translates device telemetry into Sparkplug B.
//!
//! Each measurement, event or alarm message published on an entity topic is
//! turned into a DATA message for the matching Sparkplug device (or the edge
//! node itself), preceded by a retained BIRTH certificate whenever the
//! device's alias registry grew.

use crate::classify::{classify, Measurement};
use crate::entity::EntityTopic;
use crate::error::{Error, Result};
use crate::message::{Message, MqttFlags};
use crate::payload::PayloadBuilder;
use crate::registry::{DeviceRegistry, RegistryEntry};
use crate::sequence::SequenceCounter;
use crate::store::KeyValueStore;
use crate::topic::{MessageType, SparkplugTopic};
use crate::types::{Metric, MetricValue, ScalarValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a Sparkplug Publisher.
///
/// Deserializes from the runtime's flow configuration, e.g.
/// `{"groupId": "my-factory", "edgeNodeId": "gateway01", "debug": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherConfig {
    /// Sparkplug group ID.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Edge node identifier.
    #[serde(default)]
    pub edge_node_id: Option<String>,
    /// Log dropped messages.
    #[serde(default)]
    pub debug: bool,
}

impl PublisherConfig {
    /// Creates a new publisher configuration.
    pub fn new(group_id: impl Into<String>, edge_node_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            edge_node_id: Some(edge_node_id.into()),
            debug: false,
        }
    }

    /// Enables or disables debug logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Parses the configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns `(group_id, edge_node_id)`, failing if either is missing or empty.
    pub fn identity(&self) -> Result<(&str, &str)> {
        let group_id = required(&self.group_id, "groupId")?;
        let edge_node_id = required(&self.edge_node_id, "edgeNodeId")?;
        Ok((group_id, edge_node_id))
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingConfig { field }),
    }
}

/// A Sparkplug Publisher for one edge node.
///
/// The publisher handles:
/// - Per-device alias registries (names in BIRTH, aliases in DATA)
/// - BIRTH reissue when a device reports a metric for the first time
/// - The node-wide sequence number
///
/// Messages must be handed in one at a time, in arrival order: aliases and
/// sequence numbers are derived from processing order.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use sparkplug_flows::{MemoryStore, Message, Publisher, PublisherConfig};
///
/// let config = PublisherConfig::new("my-factory", "gateway01");
/// let mut publisher = Publisher::new(config, MemoryStore::new());
///
/// let input = Message::new(Utc::now(), "te/device/sensor01///m/", r#"{"temperature":23.5}"#);
/// let output = publisher.on_message(&input);
///
/// assert_eq!(output[0].topic, "spBv1.0/my-factory/DBIRTH/gateway01/sensor01");
/// assert_eq!(output[1].topic, "spBv1.0/my-factory/DDATA/gateway01/sensor01");
/// ```
pub struct Publisher<S: KeyValueStore> {
    config: PublisherConfig,
    store: S,
}

impl<S: KeyValueStore> Publisher<S> {
    /// Creates a new Publisher with the given configuration and state store.
    pub fn new(config: PublisherConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Replaces the configuration; it applies from the next message on.
    pub fn set_config(&mut self, config: PublisherConfig) {
        self.config = config;
    }

    /// Returns the state store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the publisher, returning its state store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Translates one bus message, returning the messages to publish.
    ///
    /// Failures are logged and yield no output.
    pub fn on_message(&mut self, message: &Message) -> Vec<Message> {
        match self.process(message) {
            Ok(output) => output,
            Err(err @ Error::MissingConfig { .. }) => {
                log::warn!("sparkplug publisher: {}", err);
                Vec::new()
            }
            Err(err) => {
                if self.config.debug {
                    log::debug!("sparkplug publisher: dropping message on {}: {}", message.topic, err);
                }
                Vec::new()
            }
        }
    }

    /// Translates one bus message.
    ///
    /// State (alias registry and sequence number) is only written once every
    /// output payload has been encoded.
    pub fn process(&mut self, message: &Message) -> Result<Vec<Message>> {
        let (group_id, edge_node_id) = self.config.identity()?;

        let Some(entity) = EntityTopic::parse(&message.topic) else {
            return Ok(Vec::new());
        };

        let measurement = classify(&entity, &message.payload, message.time)?;
        if measurement.metrics.is_empty() {
            return Ok(Vec::new());
        }

        let device_id = entity.device_id.as_str();
        let (registry, needs_birth) =
            DeviceRegistry::load(&self.store, device_id).assign_or_update(&measurement.metrics);
        let mut seq = SequenceCounter::load(&self.store);

        let mut output = Vec::with_capacity(2);
        if needs_birth {
            let topic = SparkplugTopic::for_device(group_id, edge_node_id, device_id, MessageType::birth);
            let payload = birth_payload(&registry, &measurement, seq.advance())?;
            output.push(
                Message::new(measurement.timestamp, topic.to_string(), payload)
                    .with_flags(MqttFlags::birth()),
            );
        }

        let topic = SparkplugTopic::for_device(group_id, edge_node_id, device_id, MessageType::data);
        let payload = data_payload(&registry, &measurement, seq.advance())?;
        output.push(Message::new(measurement.timestamp, topic.to_string(), payload));

        registry.save(&mut self.store, device_id)?;
        seq.save(&mut self.store);

        if self.config.debug {
            log::debug!(
                "sparkplug publisher: {} metric(s) from {} (birth: {}, seq: {:?})",
                measurement.metrics.len(),
                device_id,
                needs_birth,
                seq.last()
            );
        }
        Ok(output)
    }
}

/// A metric under its registered alias and datatype.
fn registered_metric(
    name: Option<&str>,
    entry: &RegistryEntry,
    value: Option<ScalarValue>,
    timestamp: u64,
) -> Metric {
    Metric {
        name: name.map(str::to_string),
        alias: Some(entry.alias),
        timestamp: Some(timestamp),
        datatype: entry.datatype,
        value: value.map_or(MetricValue::Null, MetricValue::from),
    }
}

/// BIRTH: every registered metric with name and alias. Live values win,
/// then the last known value, then an explicit null.
fn birth_payload(registry: &DeviceRegistry, measurement: &Measurement, seq: u8) -> Result<Vec<u8>> {
    let timestamp = measurement.timestamp_millis();
    let live: HashMap<&str, &ScalarValue> = measurement
        .metrics
        .iter()
        .map(|metric| (metric.name.as_str(), &metric.value))
        .collect();

    let mut builder = PayloadBuilder::new();
    builder.set_timestamp(timestamp).set_seq(u64::from(seq));
    for (name, entry) in registry.entries_by_alias() {
        let value = match live.get(name) {
            Some(value) => Some((*value).clone()),
            None => entry.replay_value(),
        };
        builder.add_metric(registered_metric(Some(name), entry, value, timestamp));
    }
    builder.serialize()
}

/// DATA: only the incoming metrics, by alias.
fn data_payload(registry: &DeviceRegistry, measurement: &Measurement, seq: u8) -> Result<Vec<u8>> {
    let timestamp = measurement.timestamp_millis();

    let mut builder = PayloadBuilder::new();
    builder.set_timestamp(timestamp).set_seq(u64::from(seq));
    for metric in &measurement.metrics {
        if let Some(entry) = registry.get(&metric.name) {
            builder.add_metric(registered_metric(None, entry, Some(metric.value.clone()), timestamp));
        }
    }
    builder.serialize()
}

//! Sparkplug subscriber: translates received Sparkplug B data into telemetry.
//!
//! `NBIRTH`, `DBIRTH`, `NDATA` and `DDATA` payloads are flattened into one
//! measurement per message on the target device's measurement topic. Death
//! certificates, commands and STATE messages are ignored.

use crate::entity::EntityTopic;
use crate::error::Result;
use crate::message::Message;
use crate::payload::Payload;
use crate::store::KeyValueStore;
use crate::topic::ParsedTopic;
use crate::types::MetricValue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Configuration for a Sparkplug Subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberConfig {
    /// Log dropped messages and skipped metrics.
    #[serde(default)]
    pub debug: bool,
}

impl SubscriberConfig {
    /// Creates a new subscriber configuration.
    pub fn new() -> Self {
        Self::default()
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
}

/// A Sparkplug Subscriber turning Sparkplug B messages into measurements.
///
/// Metrics published by alias only are resolved through the alias map of the
/// last BIRTH certificate seen for the same device; metrics that cannot be
/// named are skipped.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use sparkplug_flows::{MemoryStore, Message, PayloadBuilder, Subscriber, SubscriberConfig};
///
/// let mut builder = PayloadBuilder::new();
/// builder.set_timestamp(1_772_013_600_000).add_double("temperature", 23.5);
/// let payload = builder.serialize()?;
///
/// let mut subscriber = Subscriber::new(SubscriberConfig::new(), MemoryStore::new());
/// let output = subscriber.on_message(&Message::new(
///     Utc::now(),
///     "spBv1.0/my-factory/DDATA/gateway01/sensor01",
///     payload,
/// ));
///
/// assert_eq!(output[0].topic, "te/device/sensor01///m/");
/// # Ok::<(), sparkplug_flows::Error>(())
/// ```
pub struct Subscriber<S: KeyValueStore> {
    config: SubscriberConfig,
    store: S,
}

impl<S: KeyValueStore> Subscriber<S> {
    /// Creates a new Subscriber with the given configuration and state store.
    pub fn new(config: SubscriberConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &SubscriberConfig {
        &self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: SubscriberConfig) {
        self.config = config;
    }

    /// Returns the state store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Translates one bus message, returning the measurements to publish.
    ///
    /// Undecodable payloads are logged (in debug mode) and yield no output.
    pub fn on_message(&mut self, message: &Message) -> Vec<Message> {
        match self.process(message) {
            Ok(output) => output,
            Err(err) => {
                if self.config.debug {
                    log::debug!("sparkplug subscriber: dropping message on {}: {}", message.topic, err);
                }
                Vec::new()
            }
        }
    }

    /// Translates one bus message.
    pub fn process(&mut self, message: &Message) -> Result<Vec<Message>> {
        let Ok(ParsedTopic::Sparkplug(topic)) = ParsedTopic::parse(&message.topic) else {
            return Ok(Vec::new());
        };
        if !topic.message_type.carries_metrics() {
            return Ok(Vec::new());
        }
        let target = topic.target_device();

        let payload = Payload::parse(&message.payload)?;

        let names_key = format!("names:{}/{}/{}", topic.group_id, topic.edge_node_id, target);
        let names = if topic.message_type.is_birth() {
            let names = birth_names(&payload);
            self.store.set(&names_key, serde_json::to_value(&names)?);
            names
        } else {
            self.load_names(&names_key)
        };

        let time = match payload.timestamp() {
            Some(ts) if ts > 0 => i64::try_from(ts)
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .unwrap_or(message.time),
            _ => message.time,
        };

        let mut body = Map::new();
        for metric in payload.metrics() {
            let Some(value) = telemetry_value(&metric.value) else {
                continue;
            };
            let name = match metric.name.as_deref().filter(|name| !name.is_empty()) {
                Some(name) => name,
                None => match metric.alias.and_then(|alias| names.get(&alias)) {
                    Some(name) => name.as_str(),
                    None => {
                        if self.config.debug {
                            log::debug!("sparkplug subscriber: no name for alias {:?} on {}", metric.alias, message.topic);
                        }
                        continue;
                    }
                },
            };
            if name == "time" {
                continue;
            }
            body.insert(name.to_string(), value);
        }

        if body.is_empty() {
            return Ok(Vec::new());
        }

        body.insert(
            "time".to_string(),
            Value::String(time.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        let payload = serde_json::to_vec(&Value::Object(body))?;
        Ok(vec![Message::new(
            time,
            EntityTopic::measurement_topic(target),
            payload,
        )])
    }

    fn load_names(&self, key: &str) -> BTreeMap<u64, String> {
        match self.store.get(key) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
                log::warn!("discarding corrupt alias names under {}: {}", key, err);
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        }
    }
}

/// The alias map announced by a BIRTH certificate.
fn birth_names(payload: &Payload) -> BTreeMap<u64, String> {
    payload
        .metrics()
        .filter_map(|metric| match (metric.alias, metric.name.as_deref()) {
            (Some(alias), Some(name)) if !name.is_empty() => Some((alias, name.to_string())),
            _ => None,
        })
        .collect()
}

/// Numeric telemetry for a metric value. Booleans become 1/0; strings,
/// datetimes, nulls and non-finite floats are not forwarded.
fn telemetry_value(value: &MetricValue) -> Option<Value> {
    match value {
        MetricValue::Int8(v) => Some(Value::from(*v)),
        MetricValue::Int16(v) => Some(Value::from(*v)),
        MetricValue::Int32(v) => Some(Value::from(*v)),
        MetricValue::Int64(v) => Some(Value::from(*v)),
        MetricValue::UInt8(v) => Some(Value::from(*v)),
        MetricValue::UInt16(v) => Some(Value::from(*v)),
        MetricValue::UInt32(v) => Some(Value::from(*v)),
        MetricValue::UInt64(v) => Some(Value::from(*v)),
        MetricValue::Float(v) => Number::from_f64(f64::from(*v)).map(Value::Number),
        MetricValue::Double(v) => Number::from_f64(*v).map(Value::Number),
        MetricValue::Boolean(v) => Some(Value::from(u8::from(*v))),
        MetricValue::String(_) | MetricValue::DateTime(_) | MetricValue::Null => None,
    }
}

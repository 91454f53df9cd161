//! Bus messages exchanged with the host runtime.

use chrono::{DateTime, Utc};

/// MQTT quality of service levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum QoS {
    /// Fire and forget
    #[default]
    AtMostOnce = 0,
    /// Acknowledged delivery
    AtLeastOnce = 1,
    /// Assured single delivery
    ExactlyOnce = 2,
}

/// Transport flags requested for an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MqttFlags {
    /// Whether the broker should retain the message.
    pub retain: bool,
    /// Delivery guarantee.
    pub qos: QoS,
}

impl MqttFlags {
    /// Flags for a Sparkplug BIRTH certificate: retained, QoS 1.
    pub fn birth() -> Self {
        Self {
            retain: true,
            qos: QoS::AtLeastOnce,
        }
    }
}

/// A message received from or handed back to the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Receive time of an inbound message; measurement time of an outbound one.
    pub time: DateTime<Utc>,
    /// MQTT topic string.
    pub topic: String,
    /// Raw payload data.
    pub payload: Vec<u8>,
    /// Transport flags; `None` publishes with the runtime defaults.
    pub mqtt: Option<MqttFlags>,
}

impl Message {
    /// Creates a message with default transport flags.
    pub fn new(time: DateTime<Utc>, topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            time,
            topic: topic.into(),
            payload: payload.into(),
            mqtt: None,
        }
    }

    /// Sets the transport flags.
    pub fn with_flags(mut self, flags: MqttFlags) -> Self {
        self.mqtt = Some(flags);
        self
    }

    /// True if the message asks to be retained.
    pub fn is_retained(&self) -> bool {
        self.mqtt.is_some_and(|flags| flags.retain)
    }
}

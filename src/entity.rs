//! Internal entity topic parsing.
//!
//! Entity topics address a device and one of its data channels:
//! `te/device/{id}///{channel}/{subtype}`.

use std::fmt;

/// Data channels the Sparkplug publisher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Measurements (`m`)
    Measurement,
    /// Events (`e`)
    Event,
    /// Alarms (`a`)
    Alarm,
}

impl Channel {
    /// Returns the single-letter topic segment for this channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Measurement => "m",
            Channel::Event => "e",
            Channel::Alarm => "a",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "m" => Some(Channel::Measurement),
            "e" => Some(Channel::Event),
            "a" => Some(Channel::Alarm),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed entity topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTopic {
    /// The device the message belongs to.
    pub device_id: String,
    /// The data channel.
    pub channel: Channel,
    /// Measurement type, event type or alarm type; empty when absent.
    pub subtype: String,
}

impl EntityTopic {
    /// Parses an entity topic, returning `None` for anything that is not a
    /// device measurement, event or alarm topic.
    ///
    /// ```
    /// use sparkplug_flows::{Channel, EntityTopic};
    ///
    /// let topic = EntityTopic::parse("te/device/sensor01///a/HighTemp").unwrap();
    /// assert_eq!(topic.device_id, "sensor01");
    /// assert_eq!(topic.channel, Channel::Alarm);
    /// assert_eq!(topic.subtype, "HighTemp");
    /// ```
    pub fn parse(topic: &str) -> Option<Self> {
        let parts: Vec<&str> = topic.split('/').collect();
        if parts.len() < 6 || parts[0] != "te" || parts[1] != "device" {
            return None;
        }

        let channel = Channel::from_segment(parts[5])?;
        Some(Self {
            device_id: parts[2].to_string(),
            channel,
            subtype: parts.get(6).map(|s| s.to_string()).unwrap_or_default(),
        })
    }

    /// The measurement topic of a device, as written by the Sparkplug subscriber.
    pub fn measurement_topic(device_id: &str) -> String {
        format!("te/device/{}///m/", device_id)
    }

    /// Returns the subtype, or `"default"` when the topic carries none.
    pub fn subtype_or_default(&self) -> &str {
        if self.subtype.is_empty() {
            "default"
        } else {
            &self.subtype
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_measurement_without_type() {
        let topic = EntityTopic::parse("te/device/sensor01///m/").unwrap();
        assert_eq!(topic.device_id, "sensor01");
        assert_eq!(topic.channel, Channel::Measurement);
        assert_eq!(topic.subtype, "");
        assert_eq!(topic.subtype_or_default(), "default");
    }

    #[test]
    fn test_parse_event_with_type() {
        let topic = EntityTopic::parse("te/device/plc01///e/door_open").unwrap();
        assert_eq!(topic.channel, Channel::Event);
        assert_eq!(topic.subtype_or_default(), "door_open");
    }

    #[test]
    fn test_parse_without_trailing_segment() {
        let topic = EntityTopic::parse("te/device/plc01///m").unwrap();
        assert_eq!(topic.subtype, "");
    }

    #[test]
    fn test_rejects_unknown_channel() {
        assert!(EntityTopic::parse("te/device/sensor01///twin/config").is_none());
        assert!(EntityTopic::parse("te/device/sensor01///cmd/restart").is_none());
    }

    #[test]
    fn test_rejects_short_or_foreign_topics() {
        assert!(EntityTopic::parse("te/device/sensor01").is_none());
        assert!(EntityTopic::parse("tedge/measurements").is_none());
        assert!(EntityTopic::parse("c8y/device/sensor01///m/").is_none());
    }
}

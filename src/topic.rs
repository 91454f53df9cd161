//! Sparkplug topic parsing and construction.
//!
//! Sparkplug B topics follow the format:
//! - `spBv1.0/{group_id}/{message_type}/{edge_node_id}[/{device_id}]`
//! - `STATE/{scada_host_id}`

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Namespace prefix of every Sparkplug B topic.
pub const NAMESPACE: &str = "spBv1.0";

/// Whether a message concerns the edge node itself or one of its devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `N*` messages.
    Node,
    /// `D*` messages.
    Device,
}

/// Sparkplug message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Node Birth - published when a node comes online
    NBirth,
    /// Node Death - published when a node goes offline
    NDeath,
    /// Node Data - published when node metrics change
    NData,
    /// Node Command - command sent to a node
    NCmd,
    /// Device Birth - published when a device comes online or grows a metric
    DBirth,
    /// Device Death - published when a device goes offline
    DDeath,
    /// Device Data - published when device metrics change
    DData,
    /// Device Command - command sent to a device
    DCmd,
    /// State - SCADA host application state
    State,
}

const MNEMONICS: [(MessageType, &str); 9] = [
    (MessageType::NBirth, "NBIRTH"),
    (MessageType::NDeath, "NDEATH"),
    (MessageType::NData, "NDATA"),
    (MessageType::NCmd, "NCMD"),
    (MessageType::DBirth, "DBIRTH"),
    (MessageType::DDeath, "DDEATH"),
    (MessageType::DData, "DDATA"),
    (MessageType::DCmd, "DCMD"),
    (MessageType::State, "STATE"),
];

impl MessageType {
    /// Returns the mnemonic used in MQTT topics.
    pub fn as_str(self) -> &'static str {
        MNEMONICS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("STATE", |(_, mnemonic)| *mnemonic)
    }

    /// Node or device scope; `None` for STATE.
    pub fn scope(self) -> Option<Scope> {
        match self {
            MessageType::NBirth | MessageType::NDeath | MessageType::NData | MessageType::NCmd => {
                Some(Scope::Node)
            }
            MessageType::DBirth | MessageType::DDeath | MessageType::DData | MessageType::DCmd => {
                Some(Scope::Device)
            }
            MessageType::State => None,
        }
    }

    /// NBIRTH or DBIRTH.
    pub fn is_birth(self) -> bool {
        matches!(self, MessageType::NBirth | MessageType::DBirth)
    }

    /// NDATA or DDATA.
    pub fn is_data(self) -> bool {
        matches!(self, MessageType::NData | MessageType::DData)
    }

    /// Birth certificates and data messages: the types that carry metric values.
    pub fn carries_metrics(self) -> bool {
        self.is_birth() || self.is_data()
    }

    /// The birth certificate type for `scope`.
    pub fn birth(scope: Scope) -> Self {
        match scope {
            Scope::Node => MessageType::NBirth,
            Scope::Device => MessageType::DBirth,
        }
    }

    /// The data message type for `scope`.
    pub fn data(scope: Scope) -> Self {
        match scope {
            Scope::Node => MessageType::NData,
            Scope::Device => MessageType::DData,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MNEMONICS
            .iter()
            .find(|(_, mnemonic)| *mnemonic == s)
            .map(|(kind, _)| *kind)
            .ok_or_else(|| Error::InvalidTopic(format!("unknown message type: {}", s)))
    }
}

/// The address of a Sparkplug message published by an edge node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparkplugTopic {
    /// The message type.
    pub message_type: MessageType,
    /// The group ID.
    pub group_id: String,
    /// The edge node ID.
    pub edge_node_id: String,
    /// The device ID; `None` when the topic has no (or an empty) device segment.
    pub device_id: Option<String>,
}

impl SparkplugTopic {
    /// Builds the topic under which `edge_node_id` reports for `device_id`.
    ///
    /// A device named like the edge node is the node itself and gets the
    /// `N*` form without a device segment.
    ///
    /// ```
    /// use sparkplug_flows::{MessageType, SparkplugTopic};
    ///
    /// let topic = SparkplugTopic::for_device("my-factory", "gateway01", "sensor01", MessageType::data);
    /// assert_eq!(topic.to_string(), "spBv1.0/my-factory/DDATA/gateway01/sensor01");
    ///
    /// let topic = SparkplugTopic::for_device("my-factory", "gateway01", "gateway01", MessageType::birth);
    /// assert_eq!(topic.to_string(), "spBv1.0/my-factory/NBIRTH/gateway01");
    /// ```
    pub fn for_device(
        group_id: &str,
        edge_node_id: &str,
        device_id: &str,
        message_type: impl Fn(Scope) -> MessageType,
    ) -> Self {
        let scope = if device_id == edge_node_id {
            Scope::Node
        } else {
            Scope::Device
        };
        Self {
            message_type: message_type(scope),
            group_id: group_id.to_string(),
            edge_node_id: edge_node_id.to_string(),
            device_id: (scope == Scope::Device).then(|| device_id.to_string()),
        }
    }

    /// The device the message is about: the device segment of a `D*` message,
    /// otherwise the edge node.
    pub fn target_device(&self) -> &str {
        match (self.message_type.scope(), self.device_id.as_deref()) {
            (Some(Scope::Device), Some(device_id)) => device_id,
            _ => &self.edge_node_id,
        }
    }
}

impl fmt::Display for SparkplugTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            NAMESPACE, self.group_id, self.message_type, self.edge_node_id
        )?;
        if let Some(device_id) = &self.device_id {
            write!(f, "/{}", device_id)?;
        }
        Ok(())
    }
}

/// A parsed Sparkplug topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTopic {
    /// An edge node or device message.
    Sparkplug(SparkplugTopic),
    /// A STATE topic for SCADA host application state.
    State {
        /// The SCADA host ID.
        host_id: String,
    },
}

impl ParsedTopic {
    /// Parses a Sparkplug topic string.
    ///
    /// A node message with a trailing device segment, or a device message
    /// without one, is accepted as is; [`SparkplugTopic::target_device`]
    /// resolves which device it concerns.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparkplug_flows::{MessageType, ParsedTopic};
    ///
    /// let topic = ParsedTopic::parse("spBv1.0/Energy/DDATA/Gateway01/Sensor01")?;
    /// assert_eq!(topic.message_type(), Some(MessageType::DData));
    ///
    /// let topic = ParsedTopic::parse("STATE/ScadaHost01")?;
    /// assert_eq!(topic.message_type(), None);
    /// # Ok::<(), sparkplug_flows::Error>(())
    /// ```
    pub fn parse(topic: &str) -> Result<Self> {
        let parts: Vec<&str> = topic.split('/').collect();

        if let ["STATE", host_id] = parts.as_slice() {
            return Ok(ParsedTopic::State {
                host_id: host_id.to_string(),
            });
        }

        let [namespace, group_id, message_type, edge_node_id, rest @ ..] = parts.as_slice() else {
            return Err(Error::InvalidTopic(format!(
                "expected at least 4 segments in '{}'",
                topic
            )));
        };

        if *namespace != NAMESPACE {
            return Err(Error::InvalidTopic(format!(
                "expected namespace '{}', got '{}'",
                NAMESPACE, namespace
            )));
        }

        Ok(ParsedTopic::Sparkplug(SparkplugTopic {
            message_type: message_type.parse()?,
            group_id: group_id.to_string(),
            edge_node_id: edge_node_id.to_string(),
            device_id: rest
                .first()
                .filter(|device_id| !device_id.is_empty())
                .map(|device_id| device_id.to_string()),
        }))
    }

    /// Returns the message type, if this is a Sparkplug message.
    pub fn message_type(&self) -> Option<MessageType> {
        match self {
            ParsedTopic::Sparkplug(topic) => Some(topic.message_type),
            ParsedTopic::State { .. } => None,
        }
    }

    /// Returns the Sparkplug message address, unless this is a STATE topic.
    pub fn as_sparkplug(&self) -> Option<&SparkplugTopic> {
        match self {
            ParsedTopic::Sparkplug(topic) => Some(topic),
            ParsedTopic::State { .. } => None,
        }
    }
}

impl FromStr for ParsedTopic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ParsedTopic::parse(s)
    }
}

impl fmt::Display for ParsedTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedTopic::Sparkplug(topic) => fmt::Display::fmt(topic, f),
            ParsedTopic::State { host_id } => write!(f, "STATE/{}", host_id),
        }
    }
}

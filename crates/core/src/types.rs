//! Wire-level value types shared by the REST and SSE surfaces

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of server notification a client can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// A model was deployed
    ModelChanged,
    /// The deployed model was started, paused or stopped
    ModelStateChanged,
    /// An event channel fired
    EventChannelTransmission,
    /// Data flowed over a specific data channel (needs a channel id)
    DataChannelTransmission,
    /// A component property changed
    PropertyChanged,
}

impl EventCategory {
    /// All categories, in declaration order
    pub const ALL: [EventCategory; 5] = [
        EventCategory::ModelChanged,
        EventCategory::ModelStateChanged,
        EventCategory::EventChannelTransmission,
        EventCategory::DataChannelTransmission,
        EventCategory::PropertyChanged,
    ];

    /// Name used on the wire and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::ModelChanged => "model_changed",
            EventCategory::ModelStateChanged => "model_state_changed",
            EventCategory::EventChannelTransmission => "event_channel_transmission",
            EventCategory::DataChannelTransmission => "data_channel_transmission",
            EventCategory::PropertyChanged => "property_changed",
        }
    }

    /// Whether subscribing requires a channel id
    pub fn requires_channel_id(&self) -> bool {
        matches!(self, EventCategory::DataChannelTransmission)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// Datatype label of a component port
///
/// Only ever used as a label; the client never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDatatype {
    #[default]
    Unknown,
    Boolean,
    Byte,
    Char,
    Integer,
    Double,
    String,
}

impl PortDatatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortDatatype::Unknown => "unknown",
            PortDatatype::Boolean => "boolean",
            PortDatatype::Byte => "byte",
            PortDatatype::Char => "char",
            PortDatatype::Integer => "integer",
            PortDatatype::Double => "double",
            PortDatatype::String => "string",
        }
    }

    /// Parse the text body of the port datatype resource
    ///
    /// Case-insensitive; anything unrecognized is `Unknown`.
    pub fn from_wire(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "boolean" => PortDatatype::Boolean,
            "byte" => PortDatatype::Byte,
            "char" => PortDatatype::Char,
            "integer" => PortDatatype::Integer,
            "double" => PortDatatype::Double,
            "string" => PortDatatype::String,
            _ => PortDatatype::Unknown,
        }
    }
}

impl fmt::Display for PortDatatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

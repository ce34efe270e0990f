//! `padbot-types` – shared vocabulary of the Padbot mapper.
//!
//! Holds the cached robot status record, the addressable property names,
//! the dispatch event emitted for every navigation command, the JSON shapes
//! the host platform hands to the mapper, and the crate-spanning error type.

pub mod protocol;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

pub use protocol::{ProtocolCommonConfig, ProtocolConfig, VisitorConfig};

/// Sentinel for an unknown string-valued field.
pub const UNKNOWN: &str = "UNKNOWN";

/// Sentinel for an unknown battery percentage.
pub const UNKNOWN_BATTERY: i64 = -1;

/// Robot status as reported by `GET /status`.
///
/// Fields absent from the response body decode to their JSON defaults
/// (`0` / empty string); they are not validated further.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RobotStatus {
    pub battery_percentage: i64,
    pub battery_status: String,
    pub action_status: String,
    pub navigation_status: String,
    pub robot_location: String,
}

impl RobotStatus {
    /// A record with every field at its unknown sentinel.
    pub fn unknown() -> Self {
        Self {
            battery_percentage: UNKNOWN_BATTERY,
            battery_status: UNKNOWN.to_string(),
            action_status: UNKNOWN.to_string(),
            navigation_status: UNKNOWN.to_string(),
            robot_location: UNKNOWN.to_string(),
        }
    }

    /// `true` when every field holds its sentinel.
    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }

    /// Render the field behind `property` as the string handed to the host.
    pub fn field(&self, property: Property) -> String {
        match property {
            Property::BatteryPercentage => self.battery_percentage.to_string(),
            Property::BatteryStatus => self.battery_status.clone(),
            Property::ActionStatus => self.action_status.clone(),
            Property::NavigationStatus => self.navigation_status.clone(),
            Property::RobotLocation => self.robot_location.clone(),
        }
    }

    /// Like [`field`][Self::field], but an empty value reads as `"UNKNOWN"`.
    pub fn value_of(&self, property: Property) -> String {
        let value = self.field(property);
        if value.is_empty() { UNKNOWN.to_string() } else { value }
    }
}

/// A named, externally addressable piece of robot state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    BatteryPercentage,
    BatteryStatus,
    ActionStatus,
    NavigationStatus,
    /// The only writable property: writing it sends the robot somewhere.
    RobotLocation,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::BatteryPercentage,
        Property::BatteryStatus,
        Property::ActionStatus,
        Property::NavigationStatus,
        Property::RobotLocation,
    ];

    /// Wire name used by the host platform.
    pub fn name(self) -> &'static str {
        match self {
            Property::BatteryPercentage => "batteryPercentage",
            Property::BatteryStatus => "batteryStatus",
            Property::ActionStatus => "actionStatus",
            Property::NavigationStatus => "navigationStatus",
            Property::RobotLocation => "robotLocation",
        }
    }

    pub fn is_writable(self) -> bool {
        matches!(self, Property::RobotLocation)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = PadbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| PadbotError::UnknownProperty(s.to_string()))
    }
}

/// Result of a property read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyRead {
    /// The cached value; never empty.
    Value(String),
    /// The requested name is not a known property.
    Unknown,
}

impl PropertyRead {
    /// Collapse into the string the host expects, `"UNKNOWN"` for unknown names.
    pub fn into_string(self) -> String {
        match self {
            PropertyRead::Value(v) => v,
            PropertyRead::Unknown => UNKNOWN.to_string(),
        }
    }
}

/// What happened to one navigation command after it left the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "detail")]
pub enum DispatchOutcome {
    /// The gateway answered `200 OK`.
    Delivered,
    /// The gateway answered with another status code.
    Rejected { status: u16 },
    /// The request never produced a response.
    Failed { reason: String },
}

/// Observability record published for every dispatched navigation command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// The `targetPoint` that was sent.
    pub target: String,
    pub outcome: DispatchOutcome,
}

impl DispatchEvent {
    pub fn new(target: impl Into<String>, outcome: DispatchOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            target: target.into(),
            outcome,
        }
    }
}

/// Errors surfaced synchronously to the host platform.
///
/// Runtime network failures never appear here; they are absorbed by the
/// pollers and the dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadbotError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),
}

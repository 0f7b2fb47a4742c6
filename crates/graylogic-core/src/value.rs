// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dynamic state/capability model.
//!
//! State values are typed per capability rather than accepted as an
//! untyped free-form map at the registry boundary (see the design note on
//! dynamic state maps).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A verb-level affordance of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    OnOff,
    Dim,
    Position,
    Tilt,
    TemperatureSet,
    TemperatureRead,
}

impl Capability {
    /// The canonical state-map key this capability is published under.
    pub fn state_key(self) -> &'static str {
        match self {
            Self::OnOff => "on",
            Self::Dim => "level",
            Self::Position => "position",
            Self::Tilt => "tilt",
            Self::TemperatureSet => "temperature_set",
            Self::TemperatureRead => "temperature",
        }
    }

    /// Whether `value` is a legal reading/setting for this capability.
    pub fn accepts(self, value: &CapabilityValue) -> bool {
        match (self, value) {
            (Self::OnOff, CapabilityValue::Bool(_)) => true,
            (Self::Dim | Self::Position | Self::Tilt, CapabilityValue::Percent(_)) => true,
            (Self::TemperatureSet | Self::TemperatureRead, CapabilityValue::Celsius(c)) => {
                (-50.0..=100.0).contains(c)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state_key())
    }
}

/// A dynamically-typed device state or command parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    Bool(bool),
    /// 0..=100.
    Percent(u8),
    Celsius(f32),
    Enum(String),
    Int(i32),
}

impl CapabilityValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_percent(&self) -> Option<u8> {
        match self {
            Self::Percent(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_celsius(&self) -> Option<f32> {
        match self {
            Self::Celsius(c) => Some(*c),
            _ => None,
        }
    }
}

/// A device's live state map, keyed by [`Capability::state_key`].
pub type StateMap = BTreeMap<String, CapabilityValue>;

/// A domain-level command accepted by the command router (§4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DomainCommand {
    On,
    Off,
    Toggle,
    /// Relative dim step; sign and magnitude are protocol-specific.
    Dim { step: i8 },
    SetLevel { level: u8 },
    SetPosition { position: u8 },
    SetTilt { tilt: u8 },
    SetSetpoint { celsius: f32 },
    Stop,
}

impl DomainCommand {
    /// The capability required to accept this command.
    pub fn required_capability(&self) -> Capability {
        match self {
            Self::On | Self::Off | Self::Toggle => Capability::OnOff,
            Self::Dim { .. } | Self::SetLevel { .. } => Capability::Dim,
            Self::SetPosition { .. } | Self::Stop => Capability::Position,
            Self::SetTilt { .. } => Capability::Tilt,
            Self::SetSetpoint { .. } => Capability::TemperatureSet,
        }
    }

    /// Validate parameter ranges independent of device capabilities.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::SetLevel { level } | Self::SetPosition { position: level } if *level > 100 => {
                Err(format!("{level} out of range 0..=100"))
            }
            Self::SetTilt { tilt } if *tilt > 100 => Err(format!("{tilt} out of range 0..=100")),
            Self::SetSetpoint { celsius } if !(5.0..=35.0).contains(celsius) => {
                Err(format!("{celsius} out of range 5.0..=35.0"))
            }
            _ => Ok(()),
        }
    }

    /// Builds a command from a wire-level `(command, parameters)` pair, as
    /// carried by an MQTT command payload or an HTTP command body — both
    /// split the verb from its parameters, whereas this type's own
    /// `#[serde(tag = "command")]` shape expects them merged into one
    /// object. Used at every boundary that accepts a domain command from
    /// outside the process.
    pub fn from_wire(command: &str, parameters: &serde_json::Value) -> Result<Self, AppError> {
        let mut object = match parameters {
            serde_json::Value::Object(map) => map.clone(),
            serde_json::Value::Null => serde_json::Map::new(),
            _ => return Err(AppError::InvalidArgument("parameters must be an object".to_owned())),
        };
        object.insert("command".to_owned(), serde_json::Value::String(command.to_owned()));
        serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| AppError::InvalidArgument(format!("invalid command parameters: {e}")))
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorType {
    /// Head section actuator
    Head,
    /// Feet section actuator
    Feet,
}

impl MotorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorType::Head => "head",
            MotorType::Feet => "feet",
        }
    }
}

impl fmt::Display for MotorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single motor instruction. Setting neither direction stops the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorCommand {
    pub motor: MotorType,
    pub up: bool,
    pub down: bool,
}

impl MotorCommand {
    pub fn new(motor: MotorType, up: bool, down: bool) -> Self {
        Self { motor, up, down }
    }

    pub fn raise(motor: MotorType) -> Self {
        Self::new(motor, true, false)
    }

    pub fn lower(motor: MotorType) -> Self {
        Self::new(motor, false, true)
    }

    pub fn stop(motor: MotorType) -> Self {
        Self::new(motor, false, false)
    }

    /// Query pairs understood by the `set` endpoint, e.g. `headu` and `headd`.
    pub fn query_params(&self) -> [(String, bool); 2] {
        [
            (format!("{}u", self.motor), self.up),
            (format!("{}d", self.motor), self.down),
        ]
    }
}

/// Status payload reported by the bed controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Head section position
    pub head_position: i32,
    /// Feet section position
    pub feet_position: i32,
}

/// Result of sending a motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The device answered 200
    Success,
    /// The device answered with any other status
    Rejected { status: StatusCode },
    /// No response was received
    Unreachable,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }
}

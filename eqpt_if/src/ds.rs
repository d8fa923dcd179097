//! # Driver Station Signals
//!
//! The driver station supplies the operating mode of the robot, which is polled every control
//! cycle, and the field configuration code, which is supplied once at the start of the match.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Source of the current operating mode.
pub trait ModeSource {
    fn mode(&self) -> OperatingMode;
}

/// Source of the field configuration code.
pub trait FieldConfigSource {
    /// The raw field configuration code, or `None` if nothing has been received yet.
    fn field_config_code(&self) -> Option<String>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Operating modes of the robot.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum OperatingMode {
    /// Robot disabled, all outputs must be zero
    Disabled,

    /// Autonomous period of the match
    Autonomous,

    /// Driver controlled period of the match
    Teleop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OperatingMode {
    /// Returns true if the robot is enabled in this mode.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, OperatingMode::Disabled)
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        OperatingMode::Disabled
    }
}

//! # Sensor Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum raw value returned by an analog channel (12 bit converter).
pub const ANALOG_MAX_RAW: u16 = 4095;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Access to the analog inputs.
pub trait AnalogInterface {
    /// Read the raw value of an analog channel, between 0 and [`ANALOG_MAX_RAW`].
    fn read_analog(&self, channel: AnalogChannel) -> u16;
}

/// Access to the digital inputs.
pub trait DigitalInterface {
    /// Read the state of a limit switch, `true` if it is asserted.
    fn read_limit_switch(&self, switch: LimitSwitch) -> bool;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Analog channels wired to the three way start position switch.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum AnalogChannel {
    /// The "high" leg of the start position switch
    StartPosHigh,

    /// The "low" leg of the start position switch
    StartPosLow,
}

/// Limit switches along the lift mast.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum LimitSwitch {
    LiftTop,
    LiftMiddle,
    LiftBottom,
}

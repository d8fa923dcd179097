//! # Sensor adapter
//!
//! Converts the raw sensor readings of the robot into classified values. No filtering is performed,
//! encoder counts and limit switches are passed through as read.
//!
//! The starting position of the robot is selected with a three way switch wired across two analog
//! channels, the "high" and "low" legs:
//!
//! | high      | low       | position |
//! |-----------|-----------|----------|
//! | < 500     | < 500     | Middle   |
//! | > 3000    | any       | Right    |
//! | otherwise | > 3000    | Left     |
//! | otherwise | otherwise | Unknown  |

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::{self, Display};

use eqpt_if::{
    AnalogChannel, AnalogInterface, DigitalInterface, DriveSide, EncoderInterface, LimitSwitch,
};
use log::debug;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Thresholds used to classify the start position switch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensParams {
    /// Both channels must read below this raw value for the Middle position.
    pub middle_max_raw: u16,

    /// A channel reading above this raw value selects its side.
    pub side_min_raw: u16,
}

/// A start position reading along with the raw values it was classified from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPosReading {
    pub high_raw: u16,
    pub low_raw: u16,
    pub position: StartPosition,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Starting position of the robot on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartPosition {
    Left,
    Middle,
    Right,

    /// The switch readings matched none of the positions.
    Unknown,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Classify the start position from the raw values of the two switch channels.
pub fn classify_position(high_raw: u16, low_raw: u16, params: &SensParams) -> StartPosition {
    if high_raw < params.middle_max_raw && low_raw < params.middle_max_raw {
        StartPosition::Middle
    } else if high_raw > params.side_min_raw {
        StartPosition::Right
    } else if low_raw > params.side_min_raw {
        StartPosition::Left
    } else {
        StartPosition::Unknown
    }
}

/// Read and classify the start position switch.
pub fn read_start_position<A>(eqpt: &A, params: &SensParams) -> StartPosReading
where
    A: AnalogInterface + ?Sized,
{
    let high_raw = eqpt.read_analog(AnalogChannel::StartPosHigh);
    let low_raw = eqpt.read_analog(AnalogChannel::StartPosLow);
    let position = classify_position(high_raw, low_raw, params);

    debug!(
        "Start position switch: high = {}, low = {} -> {}",
        high_raw, low_raw, position
    );

    StartPosReading {
        high_raw,
        low_raw,
        position,
    }
}

/// Snapshot of the encoder counts of both drivetrain sides, indexed by [`DriveSide::index`].
pub fn encoder_counts<E>(eqpt: &E) -> [i64; 2]
where
    E: EncoderInterface + ?Sized,
{
    [
        eqpt.encoder_count(DriveSide::Left),
        eqpt.encoder_count(DriveSide::Right),
    ]
}

/// Returns true if the given limit switch is asserted.
pub fn limit_switch<D>(eqpt: &D, switch: LimitSwitch) -> bool
where
    D: DigitalInterface + ?Sized,
{
    eqpt.read_limit_switch(switch)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SensParams {
    fn default() -> Self {
        Self {
            middle_max_raw: 500,
            side_min_raw: 3000,
        }
    }
}

impl StartPosition {
    pub fn is_known(&self) -> bool {
        !matches!(self, StartPosition::Unknown)
    }
}

impl Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartPosition::Left => write!(f, "Left"),
            StartPosition::Middle => write!(f, "Middle"),
            StartPosition::Right => write!(f, "Right"),
            StartPosition::Unknown => write!(f, "Unknown"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(high: u16, low: u16) -> StartPosition {
        classify_position(high, low, &SensParams::default())
    }

    #[test]
    fn both_channels_low_is_middle() {
        assert_eq!(classify(0, 0), StartPosition::Middle);
        assert_eq!(classify(499, 499), StartPosition::Middle);
    }

    #[test]
    fn high_channel_selects_right() {
        assert_eq!(classify(4000, 0), StartPosition::Right);
        // The high channel takes precedence when both legs read high
        assert_eq!(classify(4000, 4000), StartPosition::Right);
    }

    #[test]
    fn low_channel_selects_left() {
        assert_eq!(classify(0, 4000), StartPosition::Left);
        assert_ne!(classify(0, 4000), StartPosition::Right);
    }

    #[test]
    fn ambiguous_readings_are_unknown() {
        assert_eq!(classify(2000, 2000), StartPosition::Unknown);
        assert_eq!(classify(500, 0), StartPosition::Unknown);
        assert_eq!(classify(3000, 3000), StartPosition::Unknown);
        assert!(!classify(2000, 2000).is_known());
    }
}

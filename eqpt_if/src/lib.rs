//! # Equipment interface crate.
//!
//! Provides the interfaces between the robot's control software and its equipment: the drivetrain
//! and auxiliary actuators, the sensors, and the driver station signals.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator and sensor identifiers and capability traits
pub mod eqpt;

/// Driver station signals (operating mode and field configuration)
pub mod ds;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use ds::{FieldConfigSource, ModeSource, OperatingMode};
pub use eqpt::{
    mech::{AuxActId, DriveSide, EncoderInterface, MotorInterface, VelocityGains},
    sens::{AnalogChannel, AnalogInterface, DigitalInterface, LimitSwitch},
    EqptError,
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The full set of capabilities of the robot.
///
/// Any type implementing all of the individual capability traits is a `RobotEqpt`, which allows
/// the autonomous sequencer to be generic over real and simulated hardware.
pub trait RobotEqpt:
    MotorInterface + EncoderInterface + AnalogInterface + DigitalInterface + ModeSource + FieldConfigSource
{
}

impl<T> RobotEqpt for T where
    T: MotorInterface
        + EncoderInterface
        + AnalogInterface
        + DigitalInterface
        + ModeSource
        + FieldConfigSource
{
}

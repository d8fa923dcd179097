//! # Mechanisms Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Command access to the motor controllers.
///
/// Each drivetrain side is driven by a master motor controller running its own closed velocity
/// loop. Followers on the same side are slaved to the master by the hardware bring-up and are not
/// visible here.
pub trait MotorInterface {
    /// Load the velocity loop gains into the controller of the given side.
    ///
    /// This is performed once during initialisation, the gains are not recomputed afterwards.
    fn configure_gains(&mut self, side: DriveSide, gains: &VelocityGains) -> Result<(), EqptError>;

    /// Set the velocity demand of a drivetrain side.
    ///
    /// Units: encoder counts per 100 ms
    fn set_velocity(&mut self, side: DriveSide, counts_per_100ms: f64);

    /// Bring a drivetrain side to a stop (zero velocity demand).
    fn stop(&mut self, side: DriveSide);

    /// Set the percentage output of an auxiliary actuator.
    ///
    /// Units: normalised, between -1 and +1
    fn set_output(&mut self, act: AuxActId, percent: f64);
}

/// Access to the quadrature encoders of the drivetrain.
pub trait EncoderInterface {
    /// Get the cumulative encoder count of a drivetrain side since it was last reset.
    fn encoder_count(&self, side: DriveSide) -> i64;

    /// Overwrite the encoder position of a drivetrain side, used to zero the reference.
    fn set_position(&mut self, side: DriveSide, position: i64);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Gains of a motor controller's internal velocity loop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VelocityGains {
    /// Feed-forward gain
    pub k_f: f64,

    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    #[serde(default)]
    pub k_i: f64,

    /// Derivative gain
    #[serde(default)]
    pub k_d: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Sides of the differential drivetrain.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum DriveSide {
    Left,
    Right,
}

/// IDs of the auxiliary (non-drivetrain) actuators.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum AuxActId {
    /// Forklift raising the grabbed cube
    Lift,

    /// Pneumatic gripper holding the cube
    Gripper,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveSide {
    /// Both sides, in the order they are commanded.
    pub const BOTH: [DriveSide; 2] = [DriveSide::Left, DriveSide::Right];

    /// Index of the side, for storing per-side data in arrays.
    pub fn index(self) -> usize {
        match self {
            DriveSide::Left => 0,
            DriveSide::Right => 1,
        }
    }
}

impl Display for DriveSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveSide::Left => write!(f, "left"),
            DriveSide::Right => write!(f, "right"),
        }
    }
}

impl VelocityGains {
    /// Returns true if every gain is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.k_f, self.k_p, self.k_i, self.k_d]
            .iter()
            .all(|g| g.is_finite() && *g >= 0.0)
    }
}

//! # Equipment Interface
//!
//! This module defines the identifiers of every piece of equipment on the robot and the traits
//! through which the control software accesses them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Mechanisms: drivetrain motor controllers, encoders and auxiliary actuators
pub mod mech;

/// Sensors: analog start position switch and digital limit switches
pub mod sens;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors reported by equipment implementations.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("Equipment {0} did not acknowledge the configuration within the timeout")]
    ConfigTimeout(String),

    #[error("Equipment {0} is not available")]
    Unavailable(String),

    #[error("Invalid calibration value for {0}: {1}")]
    InvalidCalibration(String, f64),
}

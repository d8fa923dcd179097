//! Parameters structure for the motion primitive engine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use super::conv::ConversionConsts;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the motion primitives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {

    // ---- GEOMETRY ----

    /// Conversion between goals and encoder counts.
    pub conv: ConversionConsts,

    // ---- CONVERGENCE ----

    /// A translation is complete once both sides are within this many counts
    /// of the target.
    pub translate_deadband_counts: f64,

    /// Velocity demand used while translating.
    ///
    /// Units: encoder counts per 100 ms
    pub drive_speed: f64,

    /// Velocity demand magnitude used while rotating.
    ///
    /// Units: encoder counts per 100 ms
    pub turn_speed: f64,

    /// Angle of the fixed left quarter turn.
    ///
    /// Units: degrees
    pub fixed_turn_left_deg: f64,

    /// Angle of the fixed right quarter turn.
    ///
    /// Units: degrees
    pub fixed_turn_right_deg: f64,

    // ---- TIMING ----

    /// Time the drivetrain is held stopped after a translation completes.
    ///
    /// Units: seconds
    pub translate_settle_s: f64,

    /// Time the drivetrain is held stopped after a rotation completes.
    ///
    /// Units: seconds
    pub rotate_settle_s: f64,

    /// Maximum duration of a translation before it is aborted.
    ///
    /// Units: seconds
    pub translate_timeout_s: f64,

    /// Maximum duration of a rotation before it is aborted.
    ///
    /// Units: seconds
    pub rotate_timeout_s: f64,

    /// Maximum duration of a lift movement before it is aborted.
    ///
    /// Units: seconds
    pub lift_timeout_s: f64,

    // ---- AUXILIARY ACTUATORS ----

    /// Lift output while raising.
    pub lift_up_output: f64,

    /// Lift output while lowering.
    pub lift_down_output: f64,

    /// Lift output holding the lift in place once it has arrived.
    pub lift_hold_output: f64,

    /// Gripper output which opens the gripper.
    pub gripper_open_output: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            conv: ConversionConsts::default(),
            translate_deadband_counts: 150.0,
            drive_speed: 925.0,
            turn_speed: 925.0,
            fixed_turn_left_deg: 87.75,
            fixed_turn_right_deg: 90.0,
            translate_settle_s: 0.3,
            rotate_settle_s: 0.0,
            translate_timeout_s: 12.0,
            rotate_timeout_s: 4.0,
            lift_timeout_s: 3.0,
            lift_up_output: 0.75,
            lift_down_output: -0.6,
            lift_hold_output: 0.1,
            gripper_open_output: 1.0,
        }
    }
}

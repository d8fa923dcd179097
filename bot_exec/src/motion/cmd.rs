//! Commands passed into the motion primitive engine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::MotionParams;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A movement goal to be executed by a motion primitive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MotionCmd {
    /// Drive forwards in a straight line.
    ///
    /// Units: inches
    Translate { distance_in: f64 },

    /// Turn anticlockwise on the spot.
    ///
    /// Units: degrees
    RotateLeft { angle_deg: f64 },

    /// Turn clockwise on the spot.
    ///
    /// Units: degrees
    RotateRight { angle_deg: f64 },

    /// Drive the lift until it reaches the middle limit switch.
    MoveToHeight { up: bool },

    /// Open the gripper, releasing the held cube.
    OpenGripper,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCmd {

    /// The fixed left quarter turn.
    pub fn rotate_left_fixed(params: &MotionParams) -> Self {
        MotionCmd::RotateLeft { angle_deg: params.fixed_turn_left_deg }
    }

    /// The fixed right quarter turn.
    pub fn rotate_right_fixed(params: &MotionParams) -> Self {
        MotionCmd::RotateRight { angle_deg: params.fixed_turn_right_deg }
    }

    /// Determine if the command is valid.
    ///
    /// Goals must be finite and not negative, the direction of motion is
    /// given by the command itself.
    pub fn is_valid(&self) -> bool {
        match self {
            MotionCmd::Translate { distance_in: v }
            | MotionCmd::RotateLeft { angle_deg: v }
            | MotionCmd::RotateRight { angle_deg: v } => v.is_finite() && *v >= 0.0,
            MotionCmd::MoveToHeight { .. } | MotionCmd::OpenGripper => true,
        }
    }
}

impl Display for MotionCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionCmd::Translate { distance_in } =>
                write!(f, "translate({:.2} in)", distance_in),
            MotionCmd::RotateLeft { angle_deg } =>
                write!(f, "rotate_left({:.2} deg)", angle_deg),
            MotionCmd::RotateRight { angle_deg } =>
                write!(f, "rotate_right({:.2} deg)", angle_deg),
            MotionCmd::MoveToHeight { up: true } => write!(f, "move_to_height(up)"),
            MotionCmd::MoveToHeight { up: false } => write!(f, "move_to_height(down)"),
            MotionCmd::OpenGripper => write!(f, "open_gripper"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_turns_use_the_angle_primitives() {
        let params = MotionParams::default();

        assert_eq!(
            MotionCmd::rotate_left_fixed(&params),
            MotionCmd::RotateLeft { angle_deg: 87.75 }
        );
        assert_eq!(
            MotionCmd::rotate_right_fixed(&params),
            MotionCmd::RotateRight { angle_deg: 90.0 }
        );
    }

    #[test]
    fn negative_and_non_finite_goals_are_invalid() {
        assert!(MotionCmd::Translate { distance_in: 0.0 }.is_valid());
        assert!(!MotionCmd::Translate { distance_in: -1.0 }.is_valid());
        assert!(!MotionCmd::RotateLeft { angle_deg: f64::NAN }.is_valid());
        assert!(!MotionCmd::RotateRight { angle_deg: f64::INFINITY }.is_valid());
        assert!(MotionCmd::OpenGripper.is_valid());
    }
}

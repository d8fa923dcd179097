//! # Autonomous routine table
//!
//! The routines run in the autonomous period are described declaratively, one entry per
//! combination of start position and near element ownership. Distances in the table are in the
//! units the routines were measured in and are converted to inches when the plan is built, the
//! motion engine never receives feet.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};

use super::AutoSeqError;
use crate::{
    field::{FieldConfig, FieldSide},
    motion::{feet_to_inches, MotionCmd, MotionParams},
    sens::StartPosition,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// All autonomous routines, keyed on start position and near element ownership.
pub const PLAN_TABLE: [PlanEntry; 6] = [
    PlanEntry {
        start: StartPosition::Middle,
        near: FieldSide::Left,
        scores: true,
        steps: &[
            StepDesc::Drive(Distance::Feet(4.5)),
            StepDesc::TurnLeft(90.0),
            StepDesc::Drive(Distance::Feet(4.8)),
            StepDesc::TurnRight(90.0),
            StepDesc::LiftUp,
            StepDesc::Drive(Distance::Feet(4.5)),
            StepDesc::OpenGripper,
        ],
    },
    PlanEntry {
        start: StartPosition::Middle,
        near: FieldSide::Right,
        scores: true,
        steps: &[
            StepDesc::Drive(Distance::Feet(4.5)),
            StepDesc::TurnRight(90.0),
            StepDesc::Drive(Distance::Feet(4.8)),
            StepDesc::TurnLeft(90.0),
            StepDesc::LiftUp,
            StepDesc::Drive(Distance::Feet(4.5)),
            StepDesc::OpenGripper,
        ],
    },
    PlanEntry {
        start: StartPosition::Right,
        near: FieldSide::Left,
        scores: false,
        steps: &[StepDesc::Drive(Distance::Feet(20.0)), StepDesc::TurnLeft(90.0)],
    },
    PlanEntry {
        start: StartPosition::Right,
        near: FieldSide::Right,
        scores: true,
        steps: &[
            StepDesc::Drive(Distance::Feet(14.0)),
            StepDesc::TurnLeft(90.0),
            StepDesc::LiftUp,
            StepDesc::Drive(Distance::WheelRotations(0.7)),
            StepDesc::OpenGripper,
        ],
    },
    PlanEntry {
        start: StartPosition::Left,
        near: FieldSide::Right,
        scores: false,
        steps: &[StepDesc::Drive(Distance::Feet(20.0)), StepDesc::TurnRight(90.0)],
    },
    PlanEntry {
        start: StartPosition::Left,
        near: FieldSide::Left,
        scores: true,
        steps: &[
            StepDesc::Drive(Distance::Feet(14.0)),
            StepDesc::TurnRight(90.0),
            StepDesc::LiftUp,
            StepDesc::Drive(Distance::WheelRotations(0.7)),
            StepDesc::OpenGripper,
        ],
    },
];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One routine of the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanEntry {
    pub start: StartPosition,
    pub near: FieldSide,

    /// False for the routines which only reach the far element without placing a cube.
    pub scores: bool,

    pub steps: &'static [StepDesc],
}

/// A routine ready to be executed by the motion engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub start: StartPosition,
    pub near: FieldSide,
    pub scores: bool,
    pub steps: Vec<MotionCmd>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Descriptor of a single step of a routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepDesc {
    Drive(Distance),

    /// Units: degrees
    TurnLeft(f64),

    /// Units: degrees
    TurnRight(f64),

    LiftUp,
    OpenGripper,
}

/// A distance in the units it was measured in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Feet(f64),
    WheelRotations(f64),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the routine for the given start position and field configuration.
pub fn plan(
    start: StartPosition,
    field_config: &FieldConfig,
    params: &MotionParams,
) -> Result<Plan, AutoSeqError> {
    let near = field_config.near();

    let entry = PLAN_TABLE
        .iter()
        .find(|e| e.start == start && e.near == near)
        .ok_or(AutoSeqError::NoPlan { start, near })?;

    let steps = entry
        .steps
        .iter()
        .map(|s| s.to_cmd(params))
        .collect::<Vec<_>>();

    if let Some(cmd) = steps.iter().find(|c| !c.is_valid()) {
        return Err(AutoSeqError::InvalidStep(*cmd));
    }

    if entry.scores {
        info!(
            "Selected routine for start {} / near {}: {} steps",
            start,
            near,
            steps.len()
        );
    } else {
        warn!(
            "Selected routine for start {} / near {} does not place the cube ({} steps)",
            start,
            near,
            steps.len()
        );
    }

    Ok(Plan {
        start,
        near,
        scores: entry.scores,
        steps,
    })
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StepDesc {
    /// Convert the descriptor into a motion engine command.
    pub fn to_cmd(&self, params: &MotionParams) -> MotionCmd {
        match *self {
            StepDesc::Drive(d) => MotionCmd::Translate {
                distance_in: d.to_inches(params),
            },
            StepDesc::TurnLeft(angle_deg) => MotionCmd::RotateLeft { angle_deg },
            StepDesc::TurnRight(angle_deg) => MotionCmd::RotateRight { angle_deg },
            StepDesc::LiftUp => MotionCmd::MoveToHeight { up: true },
            StepDesc::OpenGripper => MotionCmd::OpenGripper,
        }
    }
}

impl Distance {
    pub fn to_inches(&self, params: &MotionParams) -> f64 {
        match *self {
            Distance::Feet(ft) => feet_to_inches(ft),
            Distance::WheelRotations(rot) => params.conv.rotations_to_inches(rot),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn field(code: &str) -> FieldConfig {
        FieldConfig::parse(Some(code), 3).unwrap()
    }

    #[test]
    fn middle_left_plan_is_exact() {
        let params = MotionParams::default();

        let plan = plan(StartPosition::Middle, &field("LXX"), &params).unwrap();

        assert_eq!(
            plan.steps,
            vec![
                MotionCmd::Translate { distance_in: 54.0 },
                MotionCmd::RotateLeft { angle_deg: 90.0 },
                MotionCmd::Translate { distance_in: feet_to_inches(4.8) },
                MotionCmd::RotateRight { angle_deg: 90.0 },
                MotionCmd::MoveToHeight { up: true },
                MotionCmd::Translate { distance_in: 54.0 },
                MotionCmd::OpenGripper,
            ]
        );
        assert!(plan.scores);

        match plan.steps[2] {
            MotionCmd::Translate { distance_in } => assert!((distance_in - 57.6).abs() < 1e-9),
            other => panic!("Unexpected step {}", other),
        }
    }

    #[test]
    fn plans_are_deterministic() {
        let params = MotionParams::default();
        let cfg = field("LXX");

        let a = plan(StartPosition::Middle, &cfg, &params).unwrap();
        let b = plan(StartPosition::Middle, &cfg, &params).unwrap();

        assert_eq!(a, b);
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }

    #[test]
    fn table_covers_every_known_case_once() {
        let keys: HashSet<_> = PLAN_TABLE.iter().map(|e| (e.start, e.near)).collect();
        assert_eq!(keys.len(), PLAN_TABLE.len());

        for &start in [StartPosition::Left, StartPosition::Middle, StartPosition::Right].iter() {
            for &near in [FieldSide::Left, FieldSide::Right].iter() {
                assert!(keys.contains(&(start, near)));
            }
        }
    }

    #[test]
    fn middle_right_mirrors_middle_left() {
        let params = MotionParams::default();

        let left = plan(StartPosition::Middle, &field("LRL"), &params).unwrap();
        let right = plan(StartPosition::Middle, &field("RLR"), &params).unwrap();

        let mirrored: Vec<_> = left
            .steps
            .iter()
            .map(|c| match *c {
                MotionCmd::RotateLeft { angle_deg } => MotionCmd::RotateRight { angle_deg },
                MotionCmd::RotateRight { angle_deg } => MotionCmd::RotateLeft { angle_deg },
                other => other,
            })
            .collect();

        assert_eq!(right.steps, mirrored);
    }

    #[test]
    fn far_routines_do_not_score() {
        let params = MotionParams::default();

        let plan = plan(StartPosition::Right, &field("LLL"), &params).unwrap();

        assert!(!plan.scores);
        assert_eq!(
            plan.steps,
            vec![
                MotionCmd::Translate { distance_in: 240.0 },
                MotionCmd::RotateLeft { angle_deg: 90.0 },
            ]
        );
    }

    #[test]
    fn short_approach_is_in_inches() {
        let params = MotionParams::default();

        let plan = plan(StartPosition::Left, &field("LRR"), &params).unwrap();

        match plan.steps[3] {
            MotionCmd::Translate { distance_in } => {
                let expected = 0.7 * 2.0 * std::f64::consts::PI * 3.0;
                assert!((distance_in - expected).abs() < 1e-9);
            }
            other => panic!("Unexpected step {}", other),
        }
    }

    #[test]
    fn unknown_start_has_no_plan() {
        let params = MotionParams::default();

        assert!(matches!(
            plan(StartPosition::Unknown, &field("LLL"), &params),
            Err(AutoSeqError::NoPlan { .. })
        ));
    }
}

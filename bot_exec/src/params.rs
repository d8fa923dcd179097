//! # Robot Parameters
//!
//! This module gathers the calibration data of every module of the robot into a single structure,
//! loaded from `params/robot.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{auto_seq::AutoSeqParams, motion::MotionParams, sens::SensParams, vel_reg::VelRegParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotParams {
    /// Period of the control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    pub sens: SensParams,

    pub vel_reg: VelRegParams,

    pub motion: MotionParams,

    pub auto_seq: AutoSeqParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("The cycle period must be finite and positive (got {0} s)")]
    InvalidCyclePeriod(f64),

    #[error("The start position thresholds overlap (middle max {middle_max}, side min {side_min})")]
    OverlappingThresholds { middle_max: u16, side_min: u16 },

    #[error("Parameter {0} must be finite and positive (got {1})")]
    NotPositive(&'static str, f64),

    #[error("Parameter {0} must be finite and non-negative (got {1})")]
    Negative(&'static str, f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RobotParams {
    /// Check the parameters are self consistent.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.cycle_period_s.is_finite() && self.cycle_period_s > 0.0) {
            return Err(ParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }

        if self.sens.middle_max_raw >= self.sens.side_min_raw {
            return Err(ParamsError::OverlappingThresholds {
                middle_max: self.sens.middle_max_raw,
                side_min: self.sens.side_min_raw,
            });
        }

        let m = &self.motion;
        let positive = [
            ("motion.conv.wheel_radius_in", m.conv.wheel_radius_in),
            ("motion.conv.counts_per_rotation", m.conv.counts_per_rotation),
            ("motion.conv.counts_per_rev_turn", m.conv.counts_per_rev_turn),
            ("motion.drive_speed", m.drive_speed),
            ("motion.turn_speed", m.turn_speed),
            ("motion.translate_timeout_s", m.translate_timeout_s),
            ("motion.rotate_timeout_s", m.rotate_timeout_s),
            ("motion.lift_timeout_s", m.lift_timeout_s),
            ("vel_reg.max_abs_velocity", self.vel_reg.max_abs_velocity),
            (
                "auto_seq.field_config_poll_period_s",
                self.auto_seq.field_config_poll_period_s,
            ),
        ];
        for &(name, value) in positive.iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamsError::NotPositive(name, value));
            }
        }

        let non_negative = [
            ("motion.translate_deadband_counts", m.translate_deadband_counts),
            ("motion.translate_settle_s", m.translate_settle_s),
            ("motion.rotate_settle_s", m.rotate_settle_s),
            ("motion.fixed_turn_left_deg", m.fixed_turn_left_deg),
            ("motion.fixed_turn_right_deg", m.fixed_turn_right_deg),
            ("auto_seq.field_config_timeout_s", self.auto_seq.field_config_timeout_s),
        ];
        for &(name, value) in non_negative.iter() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ParamsError::Negative(name, value));
            }
        }

        Ok(())
    }
}

impl Default for RobotParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.005,
            sens: SensParams::default(),
            vel_reg: VelRegParams::default(),
            motion: MotionParams::default(),
            auto_seq: AutoSeqParams::default(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_file_matches_defaults() {
        let params: RobotParams = toml::from_str(include_str!("../../params/robot.toml")).unwrap();

        assert_eq!(params, RobotParams::default());
        params.validate().unwrap();
    }

    #[test]
    fn overlapping_thresholds_are_rejected() {
        let mut params = RobotParams::default();
        params.sens.middle_max_raw = 3500;

        assert!(matches!(
            params.validate(),
            Err(ParamsError::OverlappingThresholds { .. })
        ));
    }

    #[test]
    fn zero_speed_is_rejected() {
        let mut params = RobotParams::default();
        params.motion.turn_speed = 0.0;

        assert!(matches!(
            params.validate(),
            Err(ParamsError::NotPositive("motion.turn_speed", _))
        ));
    }
}

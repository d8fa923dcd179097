//! Parameters structure for the velocity regulator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::{DriveSide, VelocityGains};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the velocity regulator.
///
/// The gains are measured per side and differ between the two sides of the
/// drivetrain, they must not be shared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelRegParams {

    /// Velocity loop gains of the left side motor controller.
    pub left: VelocityGains,

    /// Velocity loop gains of the right side motor controller.
    pub right: VelocityGains,

    /// Maximum magnitude of a velocity demand, larger demands are saturated.
    ///
    /// Units: encoder counts per 100 ms
    pub max_abs_velocity: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelRegParams {
    /// Get the gains for the given side.
    pub fn gains(&self, side: DriveSide) -> &VelocityGains {
        match side {
            DriveSide::Left => &self.left,
            DriveSide::Right => &self.right,
        }
    }
}

impl Default for VelRegParams {
    fn default() -> Self {
        Self {
            left: VelocityGains {
                k_f: 0.52,
                k_p: 0.12,
                k_i: 0.0,
                k_d: 0.0,
            },
            right: VelocityGains {
                k_f: 0.40,
                k_p: 0.12,
                k_i: 0.0,
                k_d: 0.0,
            },
            max_abs_velocity: 1500.0,
        }
    }
}

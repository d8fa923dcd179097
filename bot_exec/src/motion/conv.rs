//! Conversion between movement goals and encoder counts

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of inches in a foot.
pub const INCHES_PER_FOOT: f64 = 12.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Constants relating the robot's geometry to its encoder counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionConsts {
    /// Radius of the drive wheels.
    ///
    /// Units: inches
    pub wheel_radius_in: f64,

    /// Number of encoder counts in one rotation of a drive wheel.
    pub counts_per_rotation: f64,

    /// Number of encoder counts each side travels while the robot turns on
    /// the spot through a full revolution. Measured rather than derived from
    /// the track width.
    pub counts_per_rev_turn: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConversionConsts {
    /// Circumference of a drive wheel.
    ///
    /// Units: inches
    pub fn wheel_circumference_in(&self) -> f64 {
        2.0 * PI * self.wheel_radius_in
    }

    /// Encoder counts per degree of on-the-spot rotation.
    pub fn counts_per_degree(&self) -> f64 {
        self.counts_per_rev_turn / 360.0
    }

    /// Target count for a straight line translation.
    pub fn translate_counts(&self, distance_in: f64) -> f64 {
        distance_in / self.wheel_circumference_in() * self.counts_per_rotation
    }

    /// Target count magnitude for each side during a rotation.
    pub fn rotate_counts(&self, angle_deg: f64) -> f64 {
        angle_deg * self.counts_per_degree()
    }

    /// Distance travelled by the robot over the given number of wheel rotations.
    ///
    /// Units: inches
    pub fn rotations_to_inches(&self, rotations: f64) -> f64 {
        rotations * self.wheel_circumference_in()
    }
}

impl Default for ConversionConsts {
    fn default() -> Self {
        Self {
            wheel_radius_in: 3.0,
            counts_per_rotation: 4000.0,
            counts_per_rev_turn: 16000.0,
        }
    }
}

/// Convert feet into inches.
pub fn feet_to_inches(feet: f64) -> f64 {
    feet * INCHES_PER_FOOT
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_circumference_is_one_rotation() {
        let conv = ConversionConsts::default();
        let circ = conv.wheel_circumference_in();

        assert!((conv.translate_counts(circ) - 4000.0).abs() < 1e-9);
        assert!((conv.translate_counts(4.5 * circ) - 18000.0).abs() < 1e-9);
        assert_eq!(conv.translate_counts(0.0), 0.0);
    }

    #[test]
    fn translate_counts_formula() {
        let conv = ConversionConsts::default();

        for &d in [1.0, 13.2, 54.0, 240.0].iter() {
            let expected = d / (2.0 * PI * 3.0) * 4000.0;
            assert!((conv.translate_counts(d) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn quarter_turn_is_4000_counts() {
        let conv = ConversionConsts::default();

        assert!((conv.rotate_counts(90.0) - 4000.0).abs() < 1e-9);
        assert!((conv.rotate_counts(87.75) - 3900.0).abs() < 1e-9);
    }

    #[test]
    fn rotations_round_trip_through_inches() {
        let conv = ConversionConsts::default();
        let inches = conv.rotations_to_inches(0.7);

        assert!((conv.translate_counts(inches) - 2800.0).abs() < 1e-9);
        assert_eq!(feet_to_inches(4.5), 54.0);
    }
}

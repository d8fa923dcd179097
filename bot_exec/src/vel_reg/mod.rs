//! # Velocity regulator
//!
//! Issues the velocity demand of each drivetrain side to its motor controller. The feedback law
//! itself runs inside the motor controllers, which are loaded with the per-side gains once during
//! initialisation, so the regulator only has to issue the correct demand on every cycle and zero it
//! when a primitive ends.
//!
//! The regulator assumes it is the only writer to the drivetrain sides.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::{DriveSide, EqptError, MotorInterface};
use log::{info, trace, warn};

pub use params::VelRegParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity regulator state.
#[derive(Debug, Clone)]
pub struct VelReg {
    params: VelRegParams,

    /// The last demand issued to each side, indexed by `DriveSide::index`.
    ///
    /// Units: encoder counts per 100 ms
    setpoints: [f64; 2],

    /// Flags raised when the last demand on a side was saturated.
    limited: [bool; 2],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur in the velocity regulator.
#[derive(Debug, thiserror::Error)]
pub enum VelRegError {
    #[error("The {0} side velocity gains are invalid (must be finite and non-negative)")]
    InvalidGains(DriveSide),

    #[error("Could not configure the {0} side motor controller: {1}")]
    ConfigureFailed(DriveSide, EqptError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelReg {
    pub fn new(params: VelRegParams) -> Self {
        Self {
            params,
            setpoints: [0.0; 2],
            limited: [false; 2],
        }
    }

    /// Load the velocity loop gains into both motor controllers.
    pub fn configure<M>(&mut self, motors: &mut M) -> Result<(), VelRegError>
    where
        M: MotorInterface + ?Sized,
    {
        for &side in DriveSide::BOTH.iter() {
            let gains = self.params.gains(side);

            if !gains.is_valid() {
                return Err(VelRegError::InvalidGains(side));
            }

            motors
                .configure_gains(side, gains)
                .map_err(|e| VelRegError::ConfigureFailed(side, e))?;

            info!(
                "Configured {} side velocity loop: kF = {}, kP = {}, kI = {}, kD = {}",
                side, gains.k_f, gains.k_p, gains.k_i, gains.k_d
            );
        }

        Ok(())
    }

    /// Issue a velocity demand to one side of the drivetrain.
    ///
    /// Units: encoder counts per 100 ms
    pub fn drive<M>(&mut self, motors: &mut M, side: DriveSide, counts_per_100ms: f64)
    where
        M: MotorInterface + ?Sized,
    {
        // A non-finite demand is treated as a stop rather than forwarded to the controller
        if !counts_per_100ms.is_finite() {
            warn!(
                "Non-finite velocity demand ({}) on the {} side, stopping",
                counts_per_100ms, side
            );
            self.stop(motors, side);
            return;
        }

        let max = self.params.max_abs_velocity;
        let dem = counts_per_100ms.clamp(-max, max);
        self.limited[side.index()] = dem != counts_per_100ms;

        trace!("VelReg {} demand: {}", side, dem);

        motors.set_velocity(side, dem);
        self.setpoints[side.index()] = dem;
    }

    /// Stop one side of the drivetrain, equivalent to a zero demand.
    pub fn stop<M>(&mut self, motors: &mut M, side: DriveSide)
    where
        M: MotorInterface + ?Sized,
    {
        trace!("VelReg {} stop", side);

        motors.stop(side);
        self.setpoints[side.index()] = 0.0;
        self.limited[side.index()] = false;
    }

    /// Stop both sides of the drivetrain.
    pub fn stop_all<M>(&mut self, motors: &mut M)
    where
        M: MotorInterface + ?Sized,
    {
        for &side in DriveSide::BOTH.iter() {
            self.stop(motors, side);
        }
    }

    /// The last demand issued to the given side.
    pub fn setpoint(&self, side: DriveSide) -> f64 {
        self.setpoints[side.index()]
    }

    /// True if the last demand issued to the given side was saturated.
    pub fn is_limited(&self, side: DriveSide) -> bool {
        self.limited[side.index()]
    }

    pub fn params(&self) -> &VelRegParams {
        &self.params
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

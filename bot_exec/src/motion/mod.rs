//! # Motion primitive engine
//!
//! The engine converts movement goals (drive a distance, turn by an angle, move the lift) into
//! per-cycle velocity demands, using the drivetrain encoders as feedback. Only one primitive may be
//! active at a time, it is started with [`MotionEngine::start`] and then advanced by calling
//! [`MotionEngine::tick`] once per control cycle until a terminal status is returned.
//!
//! Every primitive zeroes the encoders when it starts, so goals are always relative to the robot's
//! pose at that moment.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod conv;
mod params;
mod primitive;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::{self, Display};

use eqpt_if::{
    AuxActId, DigitalInterface, EncoderInterface, ModeSource, MotorInterface, OperatingMode,
};
use log::debug;

use crate::{
    safety::SafetyGate,
    vel_reg::{VelReg, VelRegError},
};

pub use cmd::MotionCmd;
pub use conv::{feet_to_inches, ConversionConsts, INCHES_PER_FOOT};
pub use params::MotionParams;
pub use primitive::{Primitive, PrimitiveReport, PrimitiveState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The motion engine, owning the velocity regulator and the active primitive.
#[derive(Debug, Clone)]
pub struct MotionEngine {
    params: MotionParams,
    cycle_period_s: f64,
    vel_reg: VelReg,
    active: Option<Primitive>,
    last_report: PrimitiveReport,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Status of a primitive after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveStatus {
    InProgress,
    Done,
    Aborted(AbortCause),
}

/// Reason a primitive stopped before reaching its goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbortCause {
    /// The robot left the autonomous mode, it is now in the contained mode.
    ModeInterrupted(OperatingMode),

    /// The goal was not reached within the primitive's timeout.
    Timeout,
}

#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("Invalid motion command: {0} (goals must be finite and non-negative)")]
    InvalidCmd(MotionCmd),

    #[error("Cannot start {new} while {active} is still in progress")]
    Busy { active: MotionCmd, new: MotionCmd },

    #[error("Velocity regulator error: {0}")]
    VelReg(#[from] VelRegError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionEngine {
    pub fn new(params: MotionParams, vel_reg: VelReg, cycle_period_s: f64) -> Self {
        Self {
            params,
            cycle_period_s,
            vel_reg,
            active: None,
            last_report: PrimitiveReport::default(),
        }
    }

    /// Load the drivetrain gains into the motor controllers.
    pub fn configure<M>(&mut self, motors: &mut M) -> Result<(), MotionError>
    where
        M: MotorInterface + ?Sized,
    {
        self.vel_reg.configure(motors)?;
        Ok(())
    }

    /// Start a new primitive.
    ///
    /// Returns an error if the command is invalid or if another primitive is
    /// still in progress.
    pub fn start(&mut self, cmd: MotionCmd) -> Result<(), MotionError> {
        if let Some(ref active) = self.active {
            return Err(MotionError::Busy {
                active: active.cmd(),
                new: cmd,
            });
        }

        self.active = Some(Primitive::new(cmd, &self.params, self.cycle_period_s)?);
        self.last_report = PrimitiveReport::default();

        debug!("Motion engine accepted {}", cmd);

        Ok(())
    }

    /// Advance the active primitive by one cycle.
    ///
    /// Returns `None` if no primitive is active. Once a terminal status is
    /// returned the primitive is released and a new one may be started.
    pub fn tick<H>(&mut self, eqpt: &mut H, gate: &SafetyGate) -> Option<PrimitiveStatus>
    where
        H: MotorInterface + EncoderInterface + DigitalInterface + ModeSource + ?Sized,
    {
        let prim = self.active.as_mut()?;

        let status = prim.tick(eqpt, &mut self.vel_reg, gate);
        self.last_report = prim.report();

        if status.is_terminal() {
            self.active = None;
        }

        Some(status)
    }

    /// Stop the drivetrain and release the active primitive.
    ///
    /// If the active primitive is moving the lift the lift output is zeroed.
    pub fn halt<M>(&mut self, motors: &mut M)
    where
        M: MotorInterface + ?Sized,
    {
        self.vel_reg.stop_all(motors);

        if let Some(prim) = self.active.take() {
            if let MotionCmd::MoveToHeight { .. } = prim.cmd() {
                motors.set_output(AuxActId::Lift, 0.0);
            }
            debug!("Motion engine halted during {}", prim.cmd());
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// The command of the active primitive, if any.
    pub fn active_cmd(&self) -> Option<MotionCmd> {
        self.active.as_ref().map(|p| p.cmd())
    }

    /// Report of the active primitive, or of the last one to complete.
    pub fn last_report(&self) -> PrimitiveReport {
        self.last_report
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    pub fn vel_reg(&self) -> &VelReg {
        &self.vel_reg
    }
}

impl PrimitiveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PrimitiveStatus::InProgress)
    }
}

impl Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortCause::ModeInterrupted(mode) => write!(f, "interrupted by {:?} mode", mode),
            AbortCause::Timeout => write!(f, "timed out"),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBot;
    use crate::vel_reg::VelRegParams;
    use eqpt_if::DriveSide;

    fn engine() -> MotionEngine {
        MotionEngine::new(
            MotionParams::default(),
            VelReg::new(VelRegParams::default()),
            0.005,
        )
    }

    #[test]
    fn only_one_primitive_at_a_time() {
        let mut engine = engine();

        engine.start(MotionCmd::Translate { distance_in: 12.0 }).unwrap();
        assert!(engine.is_busy());

        assert!(matches!(
            engine.start(MotionCmd::OpenGripper),
            Err(MotionError::Busy { .. })
        ));
    }

    #[test]
    fn idle_engine_does_not_tick() {
        let mut engine = engine();
        let mut bot = SimBot::default();

        assert_eq!(engine.tick(&mut bot, &SafetyGate::autonomous()), None);
    }

    #[test]
    fn completed_primitive_is_released() {
        let mut engine = engine();
        let mut bot = SimBot::default();
        bot.set_mode(OperatingMode::Autonomous);
        let gate = SafetyGate::autonomous();

        engine.start(MotionCmd::OpenGripper).unwrap();
        assert_eq!(engine.tick(&mut bot, &gate), Some(PrimitiveStatus::Done));
        assert!(!engine.is_busy());
        assert_eq!(bot.output(AuxActId::Gripper), 1.0);

        engine.start(MotionCmd::RotateRight { angle_deg: 10.0 }).unwrap();
        assert_eq!(engine.active_cmd(), Some(MotionCmd::RotateRight { angle_deg: 10.0 }));
    }

    #[test]
    fn halt_stops_the_drivetrain() {
        let mut engine = engine();
        let mut bot = SimBot::default();
        bot.set_mode(OperatingMode::Autonomous);
        let gate = SafetyGate::autonomous();

        engine.start(MotionCmd::Translate { distance_in: 48.0 }).unwrap();
        for _ in 0..5 {
            assert_eq!(engine.tick(&mut bot, &gate), Some(PrimitiveStatus::InProgress));
            bot.step();
        }
        assert!(bot.velocity(DriveSide::Left) > 0.0);
        assert!(engine.last_report().elapsed_cycles > 0);

        engine.halt(&mut bot);

        assert!(!engine.is_busy());
        assert_eq!(bot.velocity(DriveSide::Left), 0.0);
        assert_eq!(bot.velocity(DriveSide::Right), 0.0);
    }
}

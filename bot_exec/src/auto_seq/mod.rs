//! # Autonomous sequencer
//!
//! This module implements the [`AutoSeq`] state machine, which runs the autonomous routine at the
//! start of the match. The sequencer moves through the states:
//!
//! - `WaitFieldConfig` - The field configuration is polled until a valid code is received. The
//!   start position switch is then read and the routine for the combination is selected from the
//!   [`table::PLAN_TABLE`].
//! - `Executing` - Each step of the routine is handed to the motion engine in turn.
//! - `Complete` - Every step has finished.
//! - `Aborted` - The routine was abandoned, the actuators have been stopped.
//!
//! Like the motion engine the sequencer is advanced by calling [`AutoSeq::tick`] once per control
//! cycle, and never blocks.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
pub mod table;
pub mod tm;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use eqpt_if::{MotorInterface, OperatingMode, RobotEqpt};
use log::{debug, error, info, warn};
use util::time::seconds_to_cycles;

pub use self::{
    params::AutoSeqParams,
    table::{plan, Plan},
    tm::SeqTm,
};
use crate::{
    field::{FieldConfig, FieldConfigError, FieldSide},
    motion::{AbortCause, MotionCmd, MotionEngine, MotionError, PrimitiveStatus},
    params::RobotParams,
    safety::{GateStatus, SafetyGate},
    sens::{self, SensParams, StartPosition},
    vel_reg::VelReg,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Autonomous sequencer
pub struct AutoSeq {
    params: AutoSeqParams,
    sens_params: SensParams,
    cycle_period_s: f64,

    engine: MotionEngine,
    gate: SafetyGate,

    state: SeqState,

    /// Number of cycles between two polls of the field configuration
    poll_cycles: u64,

    /// Number of cycles after which waiting for the field configuration fails
    timeout_cycles: u64,

    waited_cycles: u64,
    last_field_error: Option<FieldConfigError>,

    plan: Option<Plan>,
    step_index: usize,

    tm: SeqTm,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which end the autonomous routine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AutoSeqError {
    #[error(
        "The start position switch reading (high = {high_raw}, low = {low_raw}) matches no \
        position"
    )]
    SensorAmbiguous { high_raw: u16, low_raw: u16 },

    #[error("No valid field configuration was received within {waited_s} s (last error: {last:?})")]
    FieldConfigTimeout {
        waited_s: f64,
        last: Option<FieldConfigError>,
    },

    #[error("No routine is defined for start position {start} with the near element on the {near}")]
    NoPlan {
        start: StartPosition,
        near: FieldSide,
    },

    #[error("The routine contains an invalid step: {0}")]
    InvalidStep(MotionCmd),

    #[error("The motion engine rejected step {step}: {reason}")]
    StepRejected { step: usize, reason: String },
}

/// States of the sequencer.
#[derive(Debug, Clone, PartialEq)]
pub enum SeqState {
    WaitFieldConfig,
    Executing,
    Complete,
    Aborted(SeqAbort),
}

/// Status of the sequencer after a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SeqStatus {
    InProgress,
    Complete,
    Aborted(SeqAbort),
}

/// Reason the routine was abandoned.
#[derive(Debug, Clone, PartialEq)]
pub enum SeqAbort {
    /// The robot left the autonomous mode.
    ModeInterrupted(OperatingMode),

    /// A step did not complete within its timeout.
    StepTimedOut { step: usize, cmd: MotionCmd },

    /// The routine could not be selected or started.
    Failed(AutoSeqError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutoSeq {
    pub fn new(params: &RobotParams) -> Self {
        let period = params.cycle_period_s;

        Self {
            params: params.auto_seq,
            sens_params: params.sens,
            cycle_period_s: period,
            engine: MotionEngine::new(params.motion, VelReg::new(params.vel_reg), period),
            gate: SafetyGate::autonomous(),
            state: SeqState::WaitFieldConfig,
            poll_cycles: seconds_to_cycles(params.auto_seq.field_config_poll_period_s, period)
                .max(1),
            timeout_cycles: seconds_to_cycles(params.auto_seq.field_config_timeout_s, period),
            waited_cycles: 0,
            last_field_error: None,
            plan: None,
            step_index: 0,
            tm: SeqTm::default(),
        }
    }

    /// Load the drivetrain calibration into the equipment.
    pub fn init<M>(&mut self, motors: &mut M) -> Result<(), MotionError>
    where
        M: MotorInterface + ?Sized,
    {
        self.engine.configure(motors)
    }

    /// Advance the sequencer by one control cycle.
    pub fn tick<H>(&mut self, eqpt: &mut H) -> SeqStatus
    where
        H: RobotEqpt + ?Sized,
    {
        let status = match self.state {
            SeqState::WaitFieldConfig => {
                if let GateStatus::Interrupted(mode) = self.gate.check(&*eqpt) {
                    self.abort(eqpt, SeqAbort::ModeInterrupted(mode))
                } else {
                    self.wait_field_config(eqpt)
                }
            }
            SeqState::Executing => self.execute(eqpt),
            SeqState::Complete => SeqStatus::Complete,
            SeqState::Aborted(ref a) => SeqStatus::Aborted(a.clone()),
        };

        self.update_tm();

        status
    }

    /// Stop the drivetrain and any lift movement in progress.
    ///
    /// The sequencer state is left unchanged.
    pub fn halt<M>(&mut self, motors: &mut M)
    where
        M: MotorInterface + ?Sized,
    {
        self.engine.halt(motors);
    }

    pub fn state(&self) -> &SeqState {
        &self.state
    }

    /// The selected routine, once the field configuration has been received.
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn engine(&self) -> &MotionEngine {
        &self.engine
    }

    pub fn tm(&self) -> &SeqTm {
        &self.tm
    }

    pub fn params(&self) -> &AutoSeqParams {
        &self.params
    }

    fn wait_field_config<H>(&mut self, eqpt: &mut H) -> SeqStatus
    where
        H: RobotEqpt + ?Sized,
    {
        if self.waited_cycles % self.poll_cycles == 0 {
            let code = eqpt.field_config_code();

            match FieldConfig::parse(code.as_deref(), self.params.field_config_min_len) {
                Ok(cfg) => {
                    info!(
                        "Field configuration \"{}\" received after {:.3} s",
                        cfg.code(),
                        self.waited_cycles as f64 * self.cycle_period_s
                    );
                    return self.select_plan(eqpt, &cfg);
                }
                Err(e) => {
                    debug!("Field configuration not valid yet: {}", e);
                    self.last_field_error = Some(e);
                }
            }
        }

        if self.waited_cycles >= self.timeout_cycles {
            let err = AutoSeqError::FieldConfigTimeout {
                waited_s: self.waited_cycles as f64 * self.cycle_period_s,
                last: self.last_field_error.clone(),
            };
            error!("{}", err);
            return self.abort(eqpt, SeqAbort::Failed(err));
        }

        self.waited_cycles += 1;

        SeqStatus::InProgress
    }

    fn select_plan<H>(&mut self, eqpt: &mut H, cfg: &FieldConfig) -> SeqStatus
    where
        H: RobotEqpt + ?Sized,
    {
        let reading = sens::read_start_position(&*eqpt, &self.sens_params);

        if !reading.position.is_known() {
            let err = AutoSeqError::SensorAmbiguous {
                high_raw: reading.high_raw,
                low_raw: reading.low_raw,
            };
            error!("{}", err);
            return self.abort(eqpt, SeqAbort::Failed(err));
        }

        match plan(reading.position, cfg, self.engine.params()) {
            Ok(p) => {
                self.tm.start = Some(p.start);
                self.tm.near = Some(p.near);
                self.tm.num_steps = p.steps.len();

                self.plan = Some(p);
                self.step_index = 0;
                self.state = SeqState::Executing;

                self.execute(eqpt)
            }
            Err(e) => {
                error!("Could not build the autonomous routine: {}", e);
                self.abort(eqpt, SeqAbort::Failed(e))
            }
        }
    }

    fn execute<H>(&mut self, eqpt: &mut H) -> SeqStatus
    where
        H: RobotEqpt + ?Sized,
    {
        let cmd = match self.plan.as_ref().and_then(|p| p.steps.get(self.step_index)) {
            Some(c) => *c,
            None => return self.complete(eqpt),
        };

        if !self.engine.is_busy() {
            debug!("Starting step {}: {}", self.step_index, cmd);

            if let Err(e) = self.engine.start(cmd) {
                let err = AutoSeqError::StepRejected {
                    step: self.step_index,
                    reason: e.to_string(),
                };
                error!("{}", err);
                return self.abort(eqpt, SeqAbort::Failed(err));
            }
        }

        match self.engine.tick(eqpt, &self.gate) {
            Some(PrimitiveStatus::Done) => {
                self.step_index += 1;

                let num_steps = self.plan.as_ref().map(|p| p.steps.len()).unwrap_or(0);
                if self.step_index >= num_steps {
                    self.complete(eqpt)
                } else {
                    SeqStatus::InProgress
                }
            }
            Some(PrimitiveStatus::Aborted(AbortCause::ModeInterrupted(mode))) => {
                self.abort(eqpt, SeqAbort::ModeInterrupted(mode))
            }
            Some(PrimitiveStatus::Aborted(AbortCause::Timeout)) => self.abort(
                eqpt,
                SeqAbort::StepTimedOut {
                    step: self.step_index,
                    cmd,
                },
            ),
            Some(PrimitiveStatus::InProgress) | None => SeqStatus::InProgress,
        }
    }

    fn complete<M>(&mut self, motors: &mut M) -> SeqStatus
    where
        M: MotorInterface + ?Sized,
    {
        self.engine.halt(motors);

        match self.plan {
            Some(ref p) if !p.scores => warn!(
                "Autonomous routine complete, the cube was not placed (start {}, near {})",
                p.start, p.near
            ),
            _ => info!("Autonomous routine complete"),
        }

        self.state = SeqState::Complete;
        SeqStatus::Complete
    }

    fn abort<M>(&mut self, motors: &mut M, abort: SeqAbort) -> SeqStatus
    where
        M: MotorInterface + ?Sized,
    {
        self.engine.halt(motors);

        warn!(
            "Autonomous routine aborted at step {}: {:?}",
            self.step_index, abort
        );

        self.state = SeqState::Aborted(abort.clone());
        SeqStatus::Aborted(abort)
    }

    fn update_tm(&mut self) {
        self.tm.state = self.state.name().to_string();
        self.tm.step_index = self.step_index;
        self.tm.current_cmd = self.engine.active_cmd();
        self.tm.set_report(&self.engine.last_report());
    }
}

impl SeqState {
    pub fn name(&self) -> &'static str {
        match self {
            SeqState::WaitFieldConfig => "WaitFieldConfig",
            SeqState::Executing => "Executing",
            SeqState::Complete => "Complete",
            SeqState::Aborted(_) => "Aborted",
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBot;

    fn autonomous_bot(start: StartPosition, code: &str) -> SimBot {
        let mut bot = SimBot::new(start).with_field_config(code, 0);
        bot.set_mode(OperatingMode::Autonomous);
        bot
    }

    #[test]
    fn plan_is_selected_on_first_valid_config() {
        let params = RobotParams::default();
        let mut seq = AutoSeq::new(&params);
        let mut bot = autonomous_bot(StartPosition::Middle, "RLR");

        assert_eq!(seq.tick(&mut bot), SeqStatus::InProgress);
        assert_eq!(seq.state(), &SeqState::Executing);

        let plan = seq.plan().unwrap();
        assert_eq!(plan.near, FieldSide::Right);
        assert_eq!(plan.steps.len(), 7);
        assert_eq!(seq.tm().num_steps, 7);
        assert_eq!(
            seq.tm().current_cmd,
            Some(MotionCmd::Translate { distance_in: 54.0 })
        );
    }

    #[test]
    fn config_is_polled_until_valid() {
        let params = RobotParams::default();
        let mut seq = AutoSeq::new(&params);

        // Revealed after 10 cycles, polls happen every 4 cycles
        let mut bot = SimBot::new(StartPosition::Left).with_field_config("LLR", 10);
        bot.set_mode(OperatingMode::Autonomous);

        let mut cycles = 0;
        while seq.state() == &SeqState::WaitFieldConfig {
            assert_eq!(seq.tick(&mut bot), SeqStatus::InProgress);
            bot.step();
            cycles += 1;
            assert!(cycles < 100);
        }

        assert_eq!(cycles, 13);
        assert_eq!(seq.plan().unwrap().start, StartPosition::Left);
    }

    #[test]
    fn ambiguous_start_position_aborts() {
        let params = RobotParams::default();
        let mut seq = AutoSeq::new(&params);
        let mut bot = autonomous_bot(StartPosition::Unknown, "LLL");
        bot.set_analog(2000, 2000);

        assert_eq!(
            seq.tick(&mut bot),
            SeqStatus::Aborted(SeqAbort::Failed(AutoSeqError::SensorAmbiguous {
                high_raw: 2000,
                low_raw: 2000
            }))
        );
        assert!(seq.plan().is_none());
    }

    #[test]
    fn malformed_config_times_out() {
        let mut params = RobotParams::default();
        params.auto_seq.field_config_timeout_s = 0.1;
        let mut seq = AutoSeq::new(&params);
        let mut bot = autonomous_bot(StartPosition::Middle, "Q");

        let mut status = SeqStatus::InProgress;
        for _ in 0..100 {
            status = seq.tick(&mut bot);
            if status != SeqStatus::InProgress {
                break;
            }
            bot.step();
        }

        match status {
            SeqStatus::Aborted(SeqAbort::Failed(AutoSeqError::FieldConfigTimeout {
                last, ..
            })) => assert_eq!(last, Some(FieldConfigError::TooShort { len: 1, min: 3 })),
            other => panic!("Unexpected status {:?}", other),
        }
    }

    #[test]
    fn waiting_outside_autonomous_aborts() {
        let params = RobotParams::default();
        let mut seq = AutoSeq::new(&params);
        let mut bot = SimBot::new(StartPosition::Middle);

        assert_eq!(
            seq.tick(&mut bot),
            SeqStatus::Aborted(SeqAbort::ModeInterrupted(OperatingMode::Disabled))
        );

        // Terminal states are sticky
        bot.set_mode(OperatingMode::Autonomous);
        assert!(matches!(seq.tick(&mut bot), SeqStatus::Aborted(_)));
    }
}

//! Motion primitive state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::{
    AuxActId, DigitalInterface, DriveSide, EncoderInterface, LimitSwitch, ModeSource,
    MotorInterface,
};
use log::{debug, info, warn};
use util::time::seconds_to_cycles;

use super::{AbortCause, MotionCmd, MotionError, MotionParams, PrimitiveStatus};
use crate::{
    safety::{GateStatus, SafetyGate},
    sens,
    vel_reg::VelReg,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single invocation of a motion primitive.
///
/// The primitive is advanced by calling [`Primitive::tick`] once per control
/// cycle. The first tick performs the initialisation (zeroing the encoders and
/// computing the targets) and evaluates convergence straight away, so a zero
/// length goal completes on its first tick.
///
/// On every exit, successful or not, the drivetrain is commanded to stop
/// before the terminal status is returned.
#[derive(Debug, Clone)]
pub struct Primitive {
    cmd: MotionCmd,
    params: MotionParams,
    state: PrimitiveState,

    /// Per-side goals, indexed by `DriveSide::index`. Unused by the
    /// auxiliary commands.
    goals: [SideGoal; 2],

    /// Maximum number of cycles the primitive may spend converging.
    timeout_cycles: u64,

    /// Number of cycles the drivetrain is held stopped after converging.
    settle_cycles: u64,

    /// Number of cycles spent converging so far.
    elapsed_cycles: u64,

    /// Set once any motion has been commanded.
    moved: bool,

    report: PrimitiveReport,
}

/// Status report of a primitive, updated every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrimitiveReport {
    /// Encoder counts read on the last cycle.
    pub counts: [i64; 2],

    /// Target counts of each side.
    pub targets: [f64; 2],

    /// Number of cycles spent converging.
    pub elapsed_cycles: u64,
}

/// Target of one drivetrain side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SideGoal {
    /// Target count, signed.
    target: f64,

    /// Direction of travel, +1 or -1.
    dir: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// States of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveState {
    Init,
    Converging,
    Settling { remaining_cycles: u64 },
    Done,
    Aborted(AbortCause),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Primitive {
    /// Create a new primitive for the given command.
    ///
    /// `cycle_period_s` is the period at which [`Primitive::tick`] will be
    /// called, and is used to convert the timing parameters into cycles.
    pub fn new(
        cmd: MotionCmd,
        params: &MotionParams,
        cycle_period_s: f64,
    ) -> Result<Self, MotionError> {
        if !cmd.is_valid() {
            return Err(MotionError::InvalidCmd(cmd));
        }

        let (timeout_s, settle_s) = match cmd {
            MotionCmd::Translate { .. } => (params.translate_timeout_s, params.translate_settle_s),
            MotionCmd::RotateLeft { .. } | MotionCmd::RotateRight { .. } =>
                (params.rotate_timeout_s, params.rotate_settle_s),
            MotionCmd::MoveToHeight { .. } => (params.lift_timeout_s, 0.0),
            MotionCmd::OpenGripper => (0.0, 0.0),
        };

        Ok(Self {
            cmd,
            params: *params,
            state: PrimitiveState::Init,
            goals: [SideGoal::default(); 2],
            timeout_cycles: seconds_to_cycles(timeout_s, cycle_period_s),
            settle_cycles: seconds_to_cycles(settle_s, cycle_period_s),
            elapsed_cycles: 0,
            moved: false,
            report: PrimitiveReport::default(),
        })
    }

    pub fn cmd(&self) -> MotionCmd {
        self.cmd
    }

    pub fn state(&self) -> PrimitiveState {
        self.state
    }

    pub fn report(&self) -> PrimitiveReport {
        self.report
    }

    /// Status corresponding to the current state.
    pub fn status(&self) -> PrimitiveStatus {
        match self.state {
            PrimitiveState::Done => PrimitiveStatus::Done,
            PrimitiveState::Aborted(cause) => PrimitiveStatus::Aborted(cause),
            _ => PrimitiveStatus::InProgress,
        }
    }

    /// Advance the primitive by one control cycle.
    pub fn tick<H>(
        &mut self,
        eqpt: &mut H,
        vel_reg: &mut VelReg,
        gate: &SafetyGate,
    ) -> PrimitiveStatus
    where
        H: MotorInterface + EncoderInterface + DigitalInterface + ModeSource + ?Sized,
    {
        if matches!(self.state, PrimitiveState::Done | PrimitiveState::Aborted(_)) {
            return self.status();
        }

        let gate_status = gate.check(&*eqpt);

        // The lift is never moved outside of the autonomous period, asking
        // for it to move is not an error.
        if let (PrimitiveState::Init, MotionCmd::MoveToHeight { .. }, GateStatus::Interrupted(mode)) =
            (self.state, self.cmd, gate_status)
        {
            info!("{} skipped, robot is in {:?} mode", self.cmd, mode);
            return self.finish();
        }

        if let GateStatus::Interrupted(mode) = gate_status {
            return self.abort(eqpt, vel_reg, AbortCause::ModeInterrupted(mode));
        }

        match self.state {
            PrimitiveState::Init => {
                self.init(eqpt);
                self.state = PrimitiveState::Converging;
                self.converge(eqpt, vel_reg)
            }
            PrimitiveState::Converging => self.converge(eqpt, vel_reg),
            PrimitiveState::Settling { remaining_cycles } =>
                self.settle(eqpt, vel_reg, remaining_cycles),
            PrimitiveState::Done | PrimitiveState::Aborted(_) => self.status(),
        }
    }

    /// Zero the encoders, compute the targets and start any auxiliary
    /// actuator.
    fn init<H>(&mut self, eqpt: &mut H)
    where
        H: MotorInterface + EncoderInterface + ?Sized,
    {
        info!("Starting {}", self.cmd);

        let conv = &self.params.conv;

        // Right side goal first, then left
        let (right, left) = match self.cmd {
            MotionCmd::Translate { distance_in } => {
                let t = conv.translate_counts(distance_in);
                (SideGoal { target: t, dir: 1.0 }, SideGoal { target: t, dir: 1.0 })
            }
            MotionCmd::RotateLeft { angle_deg } => {
                let c = conv.rotate_counts(angle_deg);
                (SideGoal { target: c, dir: 1.0 }, SideGoal { target: -c, dir: -1.0 })
            }
            MotionCmd::RotateRight { angle_deg } => {
                let c = conv.rotate_counts(angle_deg);
                (SideGoal { target: -c, dir: -1.0 }, SideGoal { target: c, dir: 1.0 })
            }
            MotionCmd::MoveToHeight { up } => {
                let output = if up {
                    self.params.lift_up_output
                } else {
                    self.params.lift_down_output
                };
                eqpt.set_output(AuxActId::Lift, output);
                self.moved = true;
                return;
            }
            MotionCmd::OpenGripper => {
                eqpt.set_output(AuxActId::Gripper, self.params.gripper_open_output);
                return;
            }
        };

        for &side in DriveSide::BOTH.iter() {
            eqpt.set_position(side, 0);
        }

        self.goals[DriveSide::Left.index()] = left;
        self.goals[DriveSide::Right.index()] = right;
        self.report.targets = [left.target, right.target];

        debug!("{} targets: L = {:.1}, R = {:.1}", self.cmd, left.target, right.target);
    }

    fn converge<H>(&mut self, eqpt: &mut H, vel_reg: &mut VelReg) -> PrimitiveStatus
    where
        H: MotorInterface + EncoderInterface + DigitalInterface + ?Sized,
    {
        match self.cmd {
            MotionCmd::MoveToHeight { up } => self.converge_lift(eqpt, vel_reg, up),
            MotionCmd::OpenGripper => self.finish(),
            _ => self.converge_drive(eqpt, vel_reg),
        }
    }

    fn converge_drive<H>(&mut self, eqpt: &mut H, vel_reg: &mut VelReg) -> PrimitiveStatus
    where
        H: MotorInterface + EncoderInterface + ?Sized,
    {
        let counts = sens::encoder_counts(&*eqpt);
        self.report.counts = counts;

        // Rotations compare signs exactly, translations accept the deadband
        let deadband = match self.cmd {
            MotionCmd::Translate { .. } => self.params.translate_deadband_counts,
            _ => 0.0,
        };
        let reached = DriveSide::BOTH
            .iter()
            .all(|s| self.goals[s.index()].reached(counts[s.index()], deadband));

        if reached {
            vel_reg.stop_all(eqpt);
            info!(
                "{} converged after {} cycles (L = {}, R = {})",
                self.cmd, self.elapsed_cycles, counts[0], counts[1]
            );

            if self.moved && self.settle_cycles > 0 {
                self.state = PrimitiveState::Settling {
                    remaining_cycles: self.settle_cycles,
                };
                return PrimitiveStatus::InProgress;
            }

            return self.finish();
        }

        if self.elapsed_cycles >= self.timeout_cycles {
            return self.abort(eqpt, vel_reg, AbortCause::Timeout);
        }

        let speed = match self.cmd {
            MotionCmd::Translate { .. } => self.params.drive_speed,
            _ => self.params.turn_speed,
        };
        for &side in DriveSide::BOTH.iter() {
            vel_reg.drive(eqpt, side, self.goals[side.index()].dir * speed);
        }

        self.moved = true;
        self.elapsed_cycles += 1;
        self.report.elapsed_cycles = self.elapsed_cycles;

        PrimitiveStatus::InProgress
    }

    fn converge_lift<H>(&mut self, eqpt: &mut H, vel_reg: &mut VelReg, up: bool) -> PrimitiveStatus
    where
        H: MotorInterface + DigitalInterface + ?Sized,
    {
        if !sens::limit_switch(&*eqpt, LimitSwitch::LiftMiddle) {
            eqpt.set_output(AuxActId::Lift, self.params.lift_hold_output);
            info!("{} arrived after {} cycles", self.cmd, self.elapsed_cycles);
            return self.finish();
        }

        if self.elapsed_cycles >= self.timeout_cycles {
            return self.abort(eqpt, vel_reg, AbortCause::Timeout);
        }

        let output = if up {
            self.params.lift_up_output
        } else {
            self.params.lift_down_output
        };
        eqpt.set_output(AuxActId::Lift, output);

        self.elapsed_cycles += 1;
        self.report.elapsed_cycles = self.elapsed_cycles;

        PrimitiveStatus::InProgress
    }

    fn settle<H>(&mut self, eqpt: &mut H, vel_reg: &mut VelReg, remaining_cycles: u64) -> PrimitiveStatus
    where
        H: MotorInterface + ?Sized,
    {
        vel_reg.stop_all(eqpt);

        match remaining_cycles.saturating_sub(1) {
            0 => self.finish(),
            r => {
                self.state = PrimitiveState::Settling { remaining_cycles: r };
                PrimitiveStatus::InProgress
            }
        }
    }

    fn finish(&mut self) -> PrimitiveStatus {
        self.state = PrimitiveState::Done;
        PrimitiveStatus::Done
    }

    /// Stop the actuators and report the abort on this same cycle.
    ///
    /// Unlike a converged translation there is no settle period, the
    /// sequencer must see a mode change on the cycle it happens.
    fn abort<H>(&mut self, eqpt: &mut H, vel_reg: &mut VelReg, cause: AbortCause) -> PrimitiveStatus
    where
        H: MotorInterface + ?Sized,
    {
        vel_reg.stop_all(eqpt);
        if let MotionCmd::MoveToHeight { .. } = self.cmd {
            eqpt.set_output(AuxActId::Lift, 0.0);
        }

        warn!("{} aborted after {} cycles: {}", self.cmd, self.elapsed_cycles, cause);

        self.state = PrimitiveState::Aborted(cause);
        PrimitiveStatus::Aborted(cause)
    }
}

impl SideGoal {
    /// True once the count has reached the target, travelling in the goal's
    /// direction, allowing for the deadband.
    fn reached(&self, count: i64, deadband: f64) -> bool {
        self.dir * count as f64 >= self.dir * self.target - deadband
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBot, SimCmd, SimConfig};
    use crate::sens::StartPosition;
    use crate::vel_reg::VelRegParams;
    use eqpt_if::OperatingMode;

    const PERIOD_S: f64 = 0.005;

    fn setup() -> (SimBot, VelReg, SafetyGate) {
        let mut bot = SimBot::default();
        bot.set_mode(OperatingMode::Autonomous);
        (bot, VelReg::new(VelRegParams::default()), SafetyGate::autonomous())
    }

    /// Tick the primitive, stepping the simulation, until it leaves
    /// `InProgress` or `max_cycles` is exceeded.
    fn run(
        prim: &mut Primitive,
        bot: &mut SimBot,
        vel_reg: &mut VelReg,
        gate: &SafetyGate,
        max_cycles: usize,
    ) -> (PrimitiveStatus, usize) {
        for i in 0..max_cycles {
            let status = prim.tick(bot, vel_reg, gate);
            if status != PrimitiveStatus::InProgress {
                return (status, i + 1);
            }
            bot.step();
        }
        (prim.status(), max_cycles)
    }

    #[test]
    fn zero_goals_complete_on_first_tick() {
        let params = MotionParams::default();

        for &cmd in [
            MotionCmd::Translate { distance_in: 0.0 },
            MotionCmd::RotateLeft { angle_deg: 0.0 },
            MotionCmd::RotateRight { angle_deg: 0.0 },
        ]
        .iter()
        {
            let (mut bot, mut vel_reg, gate) = setup();
            let mut prim = Primitive::new(cmd, &params, PERIOD_S).unwrap();

            assert_eq!(prim.tick(&mut bot, &mut vel_reg, &gate), PrimitiveStatus::Done);
            assert!(bot
                .commands()
                .iter()
                .all(|c| !matches!(c, SimCmd::Velocity(_, v) if *v != 0.0)));
        }
    }

    #[test]
    fn translate_stops_within_deadband() {
        let params = MotionParams::default();
        let (mut bot, mut vel_reg, gate) = setup();
        let distance_in = 54.0;
        let target = params.conv.translate_counts(distance_in);

        let mut prim = Primitive::new(MotionCmd::Translate { distance_in }, &params, PERIOD_S).unwrap();

        // Drive until the primitive starts settling
        let mut cycles = 0;
        while prim.state() != (PrimitiveState::Settling { remaining_cycles: 60 }) {
            assert_eq!(prim.tick(&mut bot, &mut vel_reg, &gate), PrimitiveStatus::InProgress);
            bot.step();
            cycles += 1;
            assert!(cycles < 1000, "translation did not converge");
        }

        for &side in DriveSide::BOTH.iter() {
            assert!(bot.encoder_count(side) as f64 >= target - 150.0);
            assert_eq!(bot.velocity(side), 0.0);
            assert_eq!(vel_reg.setpoint(side), 0.0);
        }

        // Settle for 0.3 s before reporting done
        let (status, settle_cycles) = run(&mut prim, &mut bot, &mut vel_reg, &gate, 100);
        assert_eq!(status, PrimitiveStatus::Done);
        assert_eq!(settle_cycles, 60);
    }

    #[test]
    fn rotations_drive_sides_in_opposite_directions() {
        let params = MotionParams::default();
        let expected = params.conv.rotate_counts(90.0);

        for &left in [true, false].iter() {
            let (mut bot, mut vel_reg, gate) = setup();
            let cmd = if left {
                MotionCmd::RotateLeft { angle_deg: 90.0 }
            } else {
                MotionCmd::RotateRight { angle_deg: 90.0 }
            };
            let mut prim = Primitive::new(cmd, &params, PERIOD_S).unwrap();

            assert_eq!(prim.tick(&mut bot, &mut vel_reg, &gate), PrimitiveStatus::InProgress);
            let l = bot.velocity(DriveSide::Left);
            let r = bot.velocity(DriveSide::Right);
            assert_eq!(l, -r);
            assert_eq!(r.abs(), 925.0);
            assert_eq!(r > 0.0, left);
            bot.step();

            let (status, _) = run(&mut prim, &mut bot, &mut vel_reg, &gate, 1000);
            assert_eq!(status, PrimitiveStatus::Done);

            let l = bot.encoder_count(DriveSide::Left) as f64;
            let r = bot.encoder_count(DriveSide::Right) as f64;
            if left {
                assert!(r >= expected && l <= -expected);
            } else {
                assert!(r <= -expected && l >= expected);
            }
            assert_eq!(l, -r);
        }
    }

    #[test]
    fn mode_change_aborts_and_stops() {
        let params = MotionParams::default();
        let (mut bot, mut vel_reg, gate) = setup();
        let mut prim = Primitive::new(MotionCmd::Translate { distance_in: 100.0 }, &params, PERIOD_S).unwrap();

        for _ in 0..10 {
            assert_eq!(prim.tick(&mut bot, &mut vel_reg, &gate), PrimitiveStatus::InProgress);
            bot.step();
        }

        bot.set_mode(OperatingMode::Teleop);
        let n = bot.commands().len();

        assert_eq!(
            prim.tick(&mut bot, &mut vel_reg, &gate),
            PrimitiveStatus::Aborted(AbortCause::ModeInterrupted(OperatingMode::Teleop))
        );
        assert_eq!(
            &bot.commands()[n..],
            &[SimCmd::Stop(DriveSide::Left), SimCmd::Stop(DriveSide::Right)]
        );

        // Never reports done afterwards, even if the mode comes back
        bot.set_mode(OperatingMode::Autonomous);
        assert!(matches!(
            prim.tick(&mut bot, &mut vel_reg, &gate),
            PrimitiveStatus::Aborted(_)
        ));
    }

    #[test]
    fn disabled_robot_aborts() {
        let params = MotionParams::default();
        let (mut bot, mut vel_reg, gate) = setup();
        bot.set_mode(OperatingMode::Disabled);

        let mut prim = Primitive::new(MotionCmd::RotateLeft { angle_deg: 45.0 }, &params, PERIOD_S).unwrap();

        assert_eq!(
            prim.tick(&mut bot, &mut vel_reg, &gate),
            PrimitiveStatus::Aborted(AbortCause::ModeInterrupted(OperatingMode::Disabled))
        );
        assert_eq!(bot.velocity(DriveSide::Left), 0.0);
    }

    #[test]
    fn stalled_wheel_times_out() {
        let mut params = MotionParams::default();
        params.translate_timeout_s = 0.1;
        let (mut bot, mut vel_reg, gate) = setup();
        bot.set_stalled(DriveSide::Right, true);

        let mut prim = Primitive::new(MotionCmd::Translate { distance_in: 24.0 }, &params, PERIOD_S).unwrap();
        let (status, cycles) = run(&mut prim, &mut bot, &mut vel_reg, &gate, 1000);

        assert_eq!(status, PrimitiveStatus::Aborted(AbortCause::Timeout));
        assert_eq!(cycles, 21);
        assert_eq!(bot.velocity(DriveSide::Left), 0.0);
        assert_eq!(bot.velocity(DriveSide::Right), 0.0);
    }

    #[test]
    fn lift_drives_until_switch_released_then_holds() {
        let params = MotionParams::default();
        let (mut bot, mut vel_reg, gate) = setup();

        let mut prim = Primitive::new(MotionCmd::MoveToHeight { up: true }, &params, PERIOD_S).unwrap();

        assert_eq!(prim.tick(&mut bot, &mut vel_reg, &gate), PrimitiveStatus::InProgress);
        assert_eq!(bot.output(AuxActId::Lift), 0.75);
        bot.step();

        let (status, _) = run(&mut prim, &mut bot, &mut vel_reg, &gate, 1000);
        assert_eq!(status, PrimitiveStatus::Done);
        assert!(!bot.read_limit_switch(LimitSwitch::LiftMiddle));
        assert_eq!(bot.output(AuxActId::Lift), 0.1);
    }

    #[test]
    fn jammed_lift_times_out_and_is_released() {
        let mut params = MotionParams::default();
        params.lift_timeout_s = 0.05;

        let mut bot = SimBot::with_config(
            StartPosition::Middle,
            SimConfig {
                lift_rate_per_s: 0.0,
                ..SimConfig::default()
            },
        );
        bot.set_mode(OperatingMode::Autonomous);
        let mut vel_reg = VelReg::new(VelRegParams::default());
        let gate = SafetyGate::autonomous();

        let mut prim = Primitive::new(MotionCmd::MoveToHeight { up: true }, &params, PERIOD_S).unwrap();
        let (status, cycles) = run(&mut prim, &mut bot, &mut vel_reg, &gate, 1000);

        assert_eq!(status, PrimitiveStatus::Aborted(AbortCause::Timeout));
        assert_eq!(cycles, 11);
        assert!(bot.read_limit_switch(LimitSwitch::LiftMiddle));
        assert_eq!(bot.output(AuxActId::Lift), 0.0);
        assert_eq!(bot.velocity(DriveSide::Left), 0.0);
        assert_eq!(bot.velocity(DriveSide::Right), 0.0);
    }

    #[test]
    fn translate_abort_does_not_settle() {
        let params = MotionParams::default();

        // Mode change and timeout both end a translation on the cycle they happen
        let (mut bot, mut vel_reg, gate) = setup();
        let mut prim = Primitive::new(MotionCmd::Translate { distance_in: 100.0 }, &params, PERIOD_S).unwrap();
        for _ in 0..5 {
            prim.tick(&mut bot, &mut vel_reg, &gate);
            bot.step();
        }
        bot.set_mode(OperatingMode::Disabled);
        assert!(matches!(
            prim.tick(&mut bot, &mut vel_reg, &gate),
            PrimitiveStatus::Aborted(AbortCause::ModeInterrupted(OperatingMode::Disabled))
        ));
        assert!(matches!(prim.state(), PrimitiveState::Aborted(_)));

        let mut params = MotionParams::default();
        params.translate_timeout_s = 0.05;
        let (mut bot, mut vel_reg, gate) = setup();
        bot.set_stalled(DriveSide::Left, true);
        let mut prim = Primitive::new(MotionCmd::Translate { distance_in: 100.0 }, &params, PERIOD_S).unwrap();
        let (status, cycles) = run(&mut prim, &mut bot, &mut vel_reg, &gate, 1000);
        assert_eq!(status, PrimitiveStatus::Aborted(AbortCause::Timeout));
        assert_eq!(cycles, 11);
        assert!(matches!(prim.state(), PrimitiveState::Aborted(AbortCause::Timeout)));
    }

    #[test]
    fn lift_is_a_no_op_outside_autonomous() {
        let params = MotionParams::default();
        let (mut bot, mut vel_reg, gate) = setup();
        bot.set_mode(OperatingMode::Teleop);

        let mut prim = Primitive::new(MotionCmd::MoveToHeight { up: true }, &params, PERIOD_S).unwrap();

        assert_eq!(prim.tick(&mut bot, &mut vel_reg, &gate), PrimitiveStatus::Done);
        assert!(bot.commands().is_empty());
    }

    #[test]
    fn invalid_goal_is_rejected() {
        let params = MotionParams::default();
        assert!(matches!(
            Primitive::new(MotionCmd::Translate { distance_in: -3.0 }, &params, PERIOD_S),
            Err(MotionError::InvalidCmd(_))
        ));
    }
}

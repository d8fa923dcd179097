//! # Simulated robot
//!
//! A kinematic simulation of the robot's equipment, implementing every equipment interface so the
//! motion engine and the autonomous sequencer can run without hardware. Each drivetrain side
//! integrates its velocity demand directly into its encoder count, there is no motor dynamics
//! model. The lift is a single position in `[0, 1]` driven by its output, with the middle limit
//! switch asserted while the lift is below the release position.
//!
//! Every command received is recorded so tests can inspect what was sent to the equipment. Long
//! runs should turn recording off with [`SimConfig::record_commands`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use eqpt_if::{
    eqpt::sens::ANALOG_MAX_RAW, AnalogChannel, AnalogInterface, AuxActId, DigitalInterface,
    DriveSide, EncoderInterface, EqptError, FieldConfigSource, LimitSwitch, ModeSource,
    MotorInterface, OperatingMode, VelocityGains,
};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::sens::StartPosition;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Period over which velocity demands are expressed.
///
/// Units: seconds
const VELOCITY_PERIOD_S: f64 = 0.1;

/// Raw value read from a start position switch leg that is closed.
const SWITCH_CLOSED_RAW: u16 = 4000;

/// Raw value read from both legs when the switch is broken.
const SWITCH_FAULT_RAW: u16 = 1500;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Configuration of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Period of [`SimBot::step`].
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Lift travel rate at full output.
    ///
    /// Units: lift travel per second
    pub lift_rate_per_s: f64,

    /// Lift position at which the middle limit switch is released.
    pub lift_release_pos: f64,

    /// Keep a log of every command received, see [`SimBot::commands`].
    pub record_commands: bool,
}

/// The simulated robot.
#[derive(Debug, Clone)]
pub struct SimBot {
    config: SimConfig,

    mode: OperatingMode,

    field_code: Option<String>,
    field_reveal_cycle: u64,

    analog: [u16; 2],

    /// Encoder positions, kept fractional so slow demands still accumulate
    encoders: [f64; 2],
    velocities: [f64; 2],
    stalled: [bool; 2],
    gains: [Option<VelocityGains>; 2],
    configure_fault: bool,

    lift_pos: f64,
    lift_output: f64,
    gripper_output: f64,

    commands: Vec<SimCmd>,
    num_cycles: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command received by the simulated equipment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCmd {
    Velocity(DriveSide, f64),
    Stop(DriveSide),
    Output(AuxActId, f64),
    SetPosition(DriveSide, i64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.005,
            lift_rate_per_s: 1.0,
            lift_release_pos: 0.5,
            record_commands: true,
        }
    }
}

impl Default for SimBot {
    fn default() -> Self {
        Self::new(StartPosition::Middle)
    }
}

impl SimBot {
    /// Create a disabled robot standing at the given start position.
    ///
    /// An `Unknown` position simulates a faulty start position switch.
    pub fn new(start: StartPosition) -> Self {
        Self::with_config(start, SimConfig::default())
    }

    pub fn with_config(start: StartPosition, config: SimConfig) -> Self {
        let mut bot = Self {
            config,
            mode: OperatingMode::Disabled,
            field_code: None,
            field_reveal_cycle: 0,
            analog: [0; 2],
            encoders: [0.0; 2],
            velocities: [0.0; 2],
            stalled: [false; 2],
            gains: [None; 2],
            configure_fault: false,
            lift_pos: 0.0,
            lift_output: 0.0,
            gripper_output: 0.0,
            commands: Vec::new(),
            num_cycles: 0,
        };
        bot.set_start_position(start);
        bot
    }

    /// Supply the field configuration code once `reveal_after_cycles` steps have passed.
    pub fn with_field_config(mut self, code: &str, reveal_after_cycles: u64) -> Self {
        self.field_code = Some(code.to_string());
        self.field_reveal_cycle = reveal_after_cycles;
        self
    }

    pub fn set_mode(&mut self, mode: OperatingMode) {
        self.mode = mode;
    }

    /// Set the start position switch to the given position.
    pub fn set_start_position(&mut self, start: StartPosition) {
        self.analog = match start {
            StartPosition::Middle => [0, 0],
            StartPosition::Right => [SWITCH_CLOSED_RAW, 0],
            StartPosition::Left => [0, SWITCH_CLOSED_RAW],
            StartPosition::Unknown => [SWITCH_FAULT_RAW, SWITCH_FAULT_RAW],
        };
    }

    /// Set the raw values of the start position switch legs directly.
    pub fn set_analog(&mut self, high_raw: u16, low_raw: u16) {
        self.analog = [high_raw.min(ANALOG_MAX_RAW), low_raw.min(ANALOG_MAX_RAW)];
    }

    /// Stall one drivetrain side, its encoder will no longer move.
    pub fn set_stalled(&mut self, side: DriveSide, stalled: bool) {
        self.stalled[side.index()] = stalled;
    }

    /// Make the motor controllers reject their configuration.
    pub fn set_configure_fault(&mut self, fault: bool) {
        self.configure_fault = fault;
    }

    /// Advance the simulation by one cycle.
    pub fn step(&mut self) {
        let dt = self.config.cycle_period_s;

        for &side in DriveSide::BOTH.iter() {
            let i = side.index();
            if !self.stalled[i] {
                self.encoders[i] += self.velocities[i] * dt / VELOCITY_PERIOD_S;
            }
        }

        self.lift_pos = (self.lift_pos + self.lift_output * self.config.lift_rate_per_s * dt)
            .max(0.0)
            .min(1.0);

        self.num_cycles += 1;
    }

    /// The velocity demand currently applied to a side.
    pub fn velocity(&self, side: DriveSide) -> f64 {
        self.velocities[side.index()]
    }

    /// The gains loaded into a side's motor controller, if any.
    pub fn gains(&self, side: DriveSide) -> Option<VelocityGains> {
        self.gains[side.index()]
    }

    /// All commands received so far, oldest first. Empty if recording is off.
    pub fn commands(&self) -> &[SimCmd] {
        &self.commands
    }

    /// The output currently applied to an auxiliary actuator.
    pub fn output(&self, act: AuxActId) -> f64 {
        match act {
            AuxActId::Lift => self.lift_output,
            AuxActId::Gripper => self.gripper_output,
        }
    }

    pub fn lift_position(&self) -> f64 {
        self.lift_pos
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }

    fn record(&mut self, cmd: SimCmd) {
        if self.config.record_commands {
            self.commands.push(cmd);
        }
    }
}

impl MotorInterface for SimBot {
    fn configure_gains(&mut self, side: DriveSide, gains: &VelocityGains) -> Result<(), EqptError> {
        if self.configure_fault {
            return Err(EqptError::ConfigTimeout(format!("{} drive controller", side)));
        }

        self.gains[side.index()] = Some(*gains);
        Ok(())
    }

    fn set_velocity(&mut self, side: DriveSide, counts_per_100ms: f64) {
        trace!("Sim {} velocity: {}", side, counts_per_100ms);
        self.velocities[side.index()] = counts_per_100ms;
        self.record(SimCmd::Velocity(side, counts_per_100ms));
    }

    fn stop(&mut self, side: DriveSide) {
        self.velocities[side.index()] = 0.0;
        self.record(SimCmd::Stop(side));
    }

    fn set_output(&mut self, act: AuxActId, percent: f64) {
        match act {
            AuxActId::Lift => self.lift_output = percent,
            AuxActId::Gripper => self.gripper_output = percent,
        }
        self.record(SimCmd::Output(act, percent));
    }
}

impl EncoderInterface for SimBot {
    fn encoder_count(&self, side: DriveSide) -> i64 {
        self.encoders[side.index()].round() as i64
    }

    fn set_position(&mut self, side: DriveSide, position: i64) {
        self.encoders[side.index()] = position as f64;
        self.record(SimCmd::SetPosition(side, position));
    }
}

impl AnalogInterface for SimBot {
    fn read_analog(&self, channel: AnalogChannel) -> u16 {
        match channel {
            AnalogChannel::StartPosHigh => self.analog[0],
            AnalogChannel::StartPosLow => self.analog[1],
        }
    }
}

impl DigitalInterface for SimBot {
    fn read_limit_switch(&self, switch: LimitSwitch) -> bool {
        match switch {
            LimitSwitch::LiftBottom => self.lift_pos <= 0.0,
            LimitSwitch::LiftMiddle => self.lift_pos < self.config.lift_release_pos,
            LimitSwitch::LiftTop => self.lift_pos >= 1.0,
        }
    }
}

impl ModeSource for SimBot {
    fn mode(&self) -> OperatingMode {
        self.mode
    }
}

impl FieldConfigSource for SimBot {
    fn field_config_code(&self) -> Option<String> {
        match self.field_code {
            Some(ref code) if self.num_cycles >= self.field_reveal_cycle => Some(code.clone()),
            _ => None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sens::{read_start_position, SensParams};

    #[test]
    fn start_positions_classify_as_set() {
        let params = SensParams::default();

        for &pos in [
            StartPosition::Left,
            StartPosition::Middle,
            StartPosition::Right,
            StartPosition::Unknown,
        ]
        .iter()
        {
            let bot = SimBot::new(pos);
            assert_eq!(read_start_position(&bot, &params).position, pos);
        }
    }

    #[test]
    fn encoders_integrate_velocity() {
        let mut bot = SimBot::default();

        bot.set_velocity(DriveSide::Left, 925.0);
        bot.set_velocity(DriveSide::Right, -925.0);
        for _ in 0..20 {
            bot.step();
        }

        // 20 cycles of 5 ms is one velocity period
        assert_eq!(bot.encoder_count(DriveSide::Left), 925);
        assert_eq!(bot.encoder_count(DriveSide::Right), -925);
    }

    #[test]
    fn stalled_side_does_not_move() {
        let mut bot = SimBot::default();
        bot.set_stalled(DriveSide::Left, true);

        bot.set_velocity(DriveSide::Left, 925.0);
        bot.step();

        assert_eq!(bot.encoder_count(DriveSide::Left), 0);
    }

    #[test]
    fn field_config_is_revealed_after_delay() {
        let mut bot = SimBot::default().with_field_config("LRL", 2);

        assert_eq!(bot.field_config_code(), None);
        bot.step();
        bot.step();
        assert_eq!(bot.field_config_code().as_deref(), Some("LRL"));
    }

    #[test]
    fn lift_releases_middle_switch() {
        let mut bot = SimBot::default();
        assert!(bot.read_limit_switch(LimitSwitch::LiftMiddle));
        assert!(bot.read_limit_switch(LimitSwitch::LiftBottom));

        bot.set_output(AuxActId::Lift, 1.0);
        for _ in 0..101 {
            bot.step();
        }

        assert!(!bot.read_limit_switch(LimitSwitch::LiftMiddle));
        assert!(!bot.read_limit_switch(LimitSwitch::LiftBottom));
    }

    #[test]
    fn recording_can_be_turned_off() {
        let mut bot = SimBot::with_config(
            StartPosition::Middle,
            SimConfig {
                record_commands: false,
                ..SimConfig::default()
            },
        );

        for _ in 0..100 {
            bot.set_velocity(DriveSide::Left, 925.0);
            bot.set_output(AuxActId::Gripper, 1.0);
            bot.step();
        }

        assert!(bot.commands().is_empty());
        assert_eq!(bot.velocity(DriveSide::Left), 925.0);
        assert_eq!(bot.output(AuxActId::Gripper), 1.0);
    }
}

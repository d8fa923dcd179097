//! # Telemetry of the autonomous sequencer

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    field::FieldSide,
    motion::{MotionCmd, PrimitiveReport},
    sens::StartPosition,
};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeqTm {
    /// Name of the current sequencer state
    pub state: String,

    pub start: Option<StartPosition>,
    pub near: Option<FieldSide>,

    /// Index of the step being executed
    pub step_index: usize,
    pub num_steps: usize,

    pub current_cmd: Option<MotionCmd>,

    /// Encoder counts and targets of the current step
    pub counts: [i64; 2],
    pub targets: [f64; 2],
    pub step_cycles: u64,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl SeqTm {
    pub(crate) fn set_report(&mut self, report: &PrimitiveReport) {
        self.counts = report.counts;
        self.targets = report.targets;
        self.step_cycles = report.elapsed_cycles;
    }
}

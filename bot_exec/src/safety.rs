//! # Safety gate
//!
//! The gate is consulted at the start of every control cycle by the motion primitives and the
//! autonomous sequencer. Autonomous motion is only permitted while the driver station reports the
//! robot as enabled in the autonomous mode, any other mode must stop the actuators and end the
//! current primitive.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use eqpt_if::{ModeSource, OperatingMode};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Gate permitting motion only in a single operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyGate {
    required_mode: OperatingMode,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of consulting the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Motion is permitted
    Clear,

    /// Motion must stop, the robot is now in the contained mode
    Interrupted(OperatingMode),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SafetyGate {
    /// A gate which permits motion only during the autonomous period.
    pub fn autonomous() -> Self {
        Self {
            required_mode: OperatingMode::Autonomous,
        }
    }

    pub fn required_mode(&self) -> OperatingMode {
        self.required_mode
    }

    /// Check the current mode against the gate.
    pub fn check<M>(&self, source: &M) -> GateStatus
    where
        M: ModeSource + ?Sized,
    {
        let mode = source.mode();

        if mode.is_enabled() && mode == self.required_mode {
            GateStatus::Clear
        } else {
            GateStatus::Interrupted(mode)
        }
    }
}

impl GateStatus {
    pub fn is_clear(&self) -> bool {
        matches!(self, GateStatus::Clear)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

//! # Data Store

use log::{info, warn};

use crate::auto_seq::SeqStatus;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the robot has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    /// The autonomous routine was abandoned
    AutoSeqAborted,

    /// The autonomous routine finished
    AutoSeqComplete,

    /// Too many consecutive cycle overruns
    CycleOverrun,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Debug, Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Safe mode variables
    /// Determines if the robot is in safe mode.
    pub safe: bool,

    /// Gives the reason for the robot being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Autonomy
    pub seq_status: Option<SeqStatus>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the robot into safe mode with the given cause.
    ///
    /// Returns true if the robot was not already safe, in which case the
    /// caller must stop the actuators.
    pub fn make_safe(&mut self, cause: SafeModeCause) -> bool {
        if self.safe {
            return false;
        }

        match cause {
            SafeModeCause::AutoSeqComplete => info!("Make safe requested, cause: {:?}", cause),
            _ => warn!("Make safe requested, cause: {:?}", cause),
        }
        self.safe = true;
        self.safe_cause = Some(cause);

        true
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.seq_status = None;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_mode_keeps_first_cause() {
        let mut ds = DataStore::default();

        assert!(ds.make_safe(SafeModeCause::AutoSeqAborted));
        assert!(!ds.make_safe(SafeModeCause::CycleOverrun));
        assert_eq!(ds.safe_cause, Some(SafeModeCause::AutoSeqAborted));
        assert!(ds.safe);
    }

    #[test]
    fn one_hz_flag_follows_cycle_count() {
        let mut ds = DataStore::default();

        ds.cycle_start(200.0);
        assert!(ds.is_1_hz_cycle);

        ds.num_cycles = 199;
        ds.cycle_start(200.0);
        assert!(!ds.is_1_hz_cycle);

        ds.num_cycles = 400;
        ds.cycle_start(200.0);
        assert!(ds.is_1_hz_cycle);
    }
}

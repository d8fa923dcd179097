//! # Autonomous Sequencer Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoSeqParams {
    /// Period between two reads of the field configuration while waiting for a valid one.
    ///
    /// Units: seconds
    pub field_config_poll_period_s: f64,

    /// Time after which waiting for the field configuration is abandoned.
    ///
    /// Units: seconds
    pub field_config_timeout_s: f64,

    /// Minimum number of characters of a valid field configuration code.
    pub field_config_min_len: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for AutoSeqParams {
    fn default() -> Self {
        Self {
            field_config_poll_period_s: 0.02,
            field_config_timeout_s: 5.0,
            field_config_min_len: 3,
        }
    }
}

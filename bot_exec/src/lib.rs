//! # Robot library.
//!
//! This library contains the motion control and mission sequencing core of the robot, and allows
//! the executable and the integration tests to access it.
//!
//! Data flows through the modules in the order:
//!
//! `sens` -> `auto_seq` -> `motion` -> `vel_reg` -> equipment
//!
//! with the `safety` gate consulted on every control cycle by `motion` and `auto_seq`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Robot parameters - all calibration data of the robot
pub mod params;

/// Sensor adapter - classifies the raw sensor readings
pub mod sens;

/// Safety gate - decides whether autonomous motion is still permitted
pub mod safety;

/// Velocity regulator - issues per-side velocity demands to the drivetrain
pub mod vel_reg;

/// Motion primitive engine - converts movement goals into velocity demands using encoder feedback
pub mod motion;

/// Field configuration - parsing of the field configuration code
pub mod field;

/// Autonomous sequencer - selects and runs the autonomous routine
pub mod auto_seq;

/// Simulated robot equipment
pub mod sim;

/// Global data store for the executable
pub mod data_store;

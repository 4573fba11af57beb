//! # Balance library.
//!
//! This library allows other crates in the workspace, the executable and the benchmarks to access
//! the controllers defined inside the balancing crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Balance control module - keeps the vehicle upright by regulating the orthogonal speed
pub mod bal_ctrl;

/// Control loop module - runs one control tick from plant state to module demands
pub mod ctrl_loop;

/// Locomotion control module - converts a body velocity into individual swerve module demands
pub mod loco_ctrl;

/// Plant server - exchanges state and demands with the simulation or hardware bridge
pub mod plant_server;

/// Telemetry server - publishes the result of each tick
pub mod tm_server;

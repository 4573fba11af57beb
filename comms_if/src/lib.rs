//! # Communications interface crate.
//!
//! Provides the interfaces shared between the balancing controller, the plant
//! (simulation or hardware bridge) and telemetry consumers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive commands sent to the controller
pub mod tc;

/// Plant state and actuator demand definitions
pub mod eqpt;

/// Network module
pub mod net;

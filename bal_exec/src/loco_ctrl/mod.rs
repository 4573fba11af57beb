//! # Locomotion control module
//!
//! Turns a body velocity demand into swerve module demands. The demand is
//! first split across the front and back modules by [`decompose`], then each
//! module's planar velocity is converted into a steer angle and signed drive
//! rate by [`optimise_module`], which never rotates a module by more than a
//! quarter turn and holds the drive while the module is badly misaligned.
//!
//! [`LocoCtrl`] owns the per-module angle state and ties the two steps
//! together.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod decompose;
mod params;
mod state;
mod swerve;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use decompose::*;
pub use params::*;
pub use state::*;
pub use swerve::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sign applied to the forward velocity of both modules.
///
/// The plant's drive actuators are mounted so that a positive drive rate
/// moves the body backwards along X, so forward demands are inverted before
/// they reach the modules.
pub const FWD_POLARITY: f64 = -1.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Invalid locomotion control parameter {0}: {1}")]
    InvalidParam(&'static str, f64),
}

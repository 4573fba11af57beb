//! # Balance control module
//!
//! Keeps the vehicle upright. Each tick the state-space regulator compares the
//! tilt, tilt rate and orthogonal speed of the body against a reference and
//! produces a corrective orthogonal acceleration, which is integrated into a
//! running orthogonal speed target. That target is what locomotion control
//! drives the wheels at along the balancing axis.
//!
//! The gain matrix comes from an offline LQR design on the linearised
//! inverted-pendulum model, see [`Params::plant_model`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of states in the balancing model: tilt, tilt rate, orthogonal speed.
pub const NUM_STATES: usize = 3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during BalCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum BalCtrlError {
    #[error("The gain matrix must be 1x{} and finite, found {0:?}", NUM_STATES)]
    InvalidGain(Vec<f64>),

    #[error("Invalid balance control parameter {0}: {1}")]
    InvalidParam(&'static str, f64),

    #[error("Delta-time must be positive and finite, found {0} s")]
    InvalidDt(f64),

    #[error("Regulator output is not finite (accel = {accel_ms2} m/s^2, target = {target_ms} m/s)")]
    NonFiniteOutput { accel_ms2: f64, target_ms: f64 },
}

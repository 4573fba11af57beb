//! Parameters structure for BalCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix3, RowVector3, Vector3};
use serde::{Deserialize, Serialize};

use super::{BalCtrlError, NUM_STATES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for balance control.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Params {

    // ---- REGULATOR ----

    /// Regulator gain matrix `K`, coefficients for `[tilt, tilt rate,
    /// orthogonal speed]`.
    ///
    /// Units: (m/s^2)/rad, (m/s^2)/(rad/s), (m/s^2)/(m/s)
    pub gain_k: Vec<f64>,

    /// Magnitude limit on the integrated orthogonal speed target. If not set
    /// the target is never limited.
    ///
    /// Units: meters/second
    #[serde(default)]
    pub integrator_limit_ms: Option<f64>,

    // ---- PLANT CONSTANTS ----

    /// Height of the centre of mass above the ground.
    ///
    /// Units: meters
    pub com_height_m: f64,

    /// Total mass of the vehicle.
    ///
    /// Units: kilograms
    pub mass_kg: f64,

    /// Gravitational acceleration.
    ///
    /// Units: meters/second^2
    pub gravity_ms2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Validate the parameters and extract the gain matrix.
    pub fn gain(&self) -> Result<RowVector3<f64>, BalCtrlError> {
        if self.gain_k.len() != NUM_STATES
            || !util::maths::all_finite(&self.gain_k)
        {
            return Err(BalCtrlError::InvalidGain(self.gain_k.clone()))
        }

        for &(name, value) in [
            ("com_height_m", self.com_height_m),
            ("mass_kg", self.mass_kg),
        ].iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(BalCtrlError::InvalidParam(name, value))
            }
        }

        if !self.gravity_ms2.is_finite() {
            return Err(BalCtrlError::InvalidParam("gravity_ms2", self.gravity_ms2))
        }

        if let Some(l) = self.integrator_limit_ms {
            if !(l.is_finite() && l > 0.0) {
                return Err(BalCtrlError::InvalidParam("integrator_limit_ms", l))
            }
        }

        Ok(RowVector3::from_row_slice(&self.gain_k))
    }

    /// Linearised balancing model, `(A, B)` such that `x' = Ax + Bu`.
    ///
    /// States are `[tilt, tilt rate, orthogonal speed]` and the single input
    /// is the orthogonal acceleration demand. This is the model the gain
    /// matrix is designed against, with an external continuous-time LQR
    /// solve.
    pub fn plant_model(&self) -> (Matrix3<f64>, Vector3<f64>) {
        let h = self.com_height_m;

        let a = Matrix3::new(
            0.0,                   1.0, 0.0,
            self.gravity_ms2 / h,  0.0, 0.0,
            0.0,                   0.0, 0.0,
        );

        let b = Vector3::new(0.0, -1.0 / h, 1.0 / self.mass_kg);

        (a, b)
    }
}

//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::LocoCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for locomotion control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance between the front and back steer axes, which straddle the
    /// heading axis.
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    /// The radius of the wheels.
    ///
    /// Units: meters
    pub wheel_radius_m: f64,

    // ---- ALIGNMENT ----

    /// Alignment error above which a module's drive is held at zero.
    ///
    /// Units: radians
    #[serde(default = "default_align_gate_rad")]
    pub align_gate_rad: f64,

    /// Which alignment errors are gated.
    #[serde(default)]
    pub gate_mode: GateMode,

    // ---- CAPABILITIES ----

    /// Maximum magnitude of a drive axis rate. If not set drive rates are
    /// not limited.
    ///
    /// Units: radians/second
    #[serde(default)]
    pub drv_max_abs_rate_rads: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Gating policy applied to the corrected alignment error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateMode {
    /// Gate only when the corrected error is above the gate, large negative
    /// errors still drive.
    Positive,

    /// Gate when the magnitude of the corrected error is above the gate.
    Symmetric,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GateMode {
    fn default() -> Self {
        GateMode::Positive
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wheelbase_m: 1.5,
            wheel_radius_m: 0.15,
            align_gate_rad: default_align_gate_rad(),
            gate_mode: GateMode::default(),
            drv_max_abs_rate_rads: None,
        }
    }
}

impl Params {
    /// Check that the parameters describe a physical vehicle.
    pub fn validate(&self) -> Result<(), LocoCtrlError> {
        for &(name, value) in [
            ("wheelbase_m", self.wheelbase_m),
            ("wheel_radius_m", self.wheel_radius_m),
        ].iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(LocoCtrlError::InvalidParam(name, value))
            }
        }

        if !(self.align_gate_rad.is_finite() && self.align_gate_rad >= 0.0) {
            return Err(LocoCtrlError::InvalidParam(
                "align_gate_rad", self.align_gate_rad
            ))
        }

        if let Some(r) = self.drv_max_abs_rate_rads {
            if !(r.is_finite() && r > 0.0) {
                return Err(LocoCtrlError::InvalidParam("drv_max_abs_rate_rads", r))
            }
        }

        Ok(())
    }
}

fn default_align_gate_rad() -> f64 {
    0.1
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_from_toml() {
        let p: Params = util::params::from_str(
            "wheelbase_m = 2.0\nwheel_radius_m = 0.375"
        ).unwrap();

        assert_eq!(p.align_gate_rad, 0.1);
        assert_eq!(p.gate_mode, GateMode::Positive);
        assert_eq!(p.drv_max_abs_rate_rads, None);
        assert!(p.validate().is_ok());

        let p: Params = util::params::from_str(
            "wheelbase_m = 2.0\nwheel_radius_m = 0.375\ngate_mode = \"Symmetric\""
        ).unwrap();
        assert_eq!(p.gate_mode, GateMode::Symmetric);
    }

    #[test]
    fn test_validate() {
        let mut p = Params::default();
        p.wheel_radius_m = 0.0;
        assert!(matches!(
            p.validate(),
            Err(LocoCtrlError::InvalidParam("wheel_radius_m", _))
        ));

        let mut p = Params::default();
        p.wheelbase_m = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = Params::default();
        p.drv_max_abs_rate_rads = Some(-2.0);
        assert!(p.validate().is_err());
    }
}

//! Parameters structure for CtrlLoop

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::CtrlLoopError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the control loop.
///
/// Scale factors map the external drive command units into physical units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Units: (meters/second)/command unit
    #[serde(default = "unit_scale")]
    pub cmd_scale_fwd: f64,

    /// Units: (meters/second)/command unit
    #[serde(default = "unit_scale")]
    pub cmd_scale_orth: f64,

    /// Units: (radians/second)/command unit
    #[serde(default = "unit_scale")]
    pub cmd_scale_head: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            cmd_scale_fwd: 1.0,
            cmd_scale_orth: 1.0,
            cmd_scale_head: 1.0,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), CtrlLoopError> {
        for &(name, value) in [
            ("cmd_scale_fwd", self.cmd_scale_fwd),
            ("cmd_scale_orth", self.cmd_scale_orth),
            ("cmd_scale_head", self.cmd_scale_head),
        ].iter() {
            if !value.is_finite() {
                return Err(CtrlLoopError::InvalidParam(name, value))
            }
        }

        Ok(())
    }
}

fn unit_scale() -> f64 {
    1.0
}

//! # Drive command module
//!
//! Defines the drive command which the operator (or an upstream path
//! follower) sends to the balancing controller each tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A planar velocity and heading rate demand for the vehicle body.
///
/// Values are in external command units. The controller maps them into physical units with fixed
/// scale factors, so the same command can come from a joystick (-1 to +1) or from a planner
/// working in SI units.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveCmd {
    /// Forward velocity demand, along the body X axis.
    pub fwd: f64,

    /// Orthogonal velocity demand, along the body Y axis. This is the balancing axis, so the
    /// demand is used as the regulator's speed reference rather than being driven directly.
    pub orth: f64,

    /// Heading rate demand about the body Z+ (upwards) axis, positive to the left.
    pub head_rate: f64,
}

impl DriveCmd {
    /// Return true if all fields of the command are finite.
    pub fn is_finite(&self) -> bool {
        self.fwd.is_finite() && self.orth.is_finite() && self.head_rate.is_finite()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_finite() {
        assert!(DriveCmd::default().is_finite());
        assert!(!DriveCmd { head_rate: f64::NAN, ..DriveCmd::default() }.is_finite());
        assert!(!DriveCmd { fwd: f64::NEG_INFINITY, ..DriveCmd::default() }.is_finite());
    }
}

//! # Plant Interface
//!
//! The plant (the simulation or the hardware bridge) sends one [`PlantReq`] per control tick and
//! waits for the matching [`PlantRep`]. Keeping both directions in a single request/reply makes
//! the exchange atomic, the controller never sees a partially updated state.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::tc::DriveCmd;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of swerve modules on the vehicle.
pub const NUM_MODULES: usize = 2;

/// Index of the front module in module arrays.
pub const FRONT: usize = 0;

/// Index of the back module in module arrays.
pub const BACK: usize = 1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the vehicle as measured by the plant.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Lean angle of the body from vertical, about the body X axis.
    ///
    /// Units: radians
    pub tilt_rad: f64,

    /// Rate of change of the lean angle.
    ///
    /// Units: radians/second
    pub tilt_rate_rads: f64,

    /// Planar velocity of the body, `[x, y]`, in the frame given by `vel_frame`.
    ///
    /// Units: meters/second
    pub vel_ms: [f64; 2],

    /// The frame `vel_ms` is expressed in.
    #[serde(default)]
    pub vel_frame: VelFrame,

    /// Heading of the body in the world frame, right hand grip rule about Z+.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Current steer axis positions, `[front, back]`. These are continuous and may lie outside
    /// of (-pi, pi].
    ///
    /// Units: radians
    pub str_pos_rad: [f64; NUM_MODULES],
}

/// Demands sent to the swerve module actuators.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwerveDems {
    /// Steer axis absolute position demands, `[front, back]`.
    ///
    /// Units: radians
    pub str_abs_pos_rad: [f64; NUM_MODULES],

    /// Signed drive axis rate demands, `[front, back]`.
    ///
    /// Units: radians/second
    pub drv_rate_rads: [f64; NUM_MODULES],
}

/// Request sent by the plant each tick.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantReq {
    /// Time of the measurement. Simulations provide their own clock here, if `None` the
    /// controller uses its wall clock.
    ///
    /// Units: seconds
    #[serde(default)]
    pub time_s: Option<f64>,

    /// The measured plant state.
    pub state: PlantState,

    /// The drive command in force for this tick.
    #[serde(default)]
    pub cmd: DriveCmd,
}

/// Reply sent back to the plant.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRep {
    /// Demands to actuate.
    pub dems: SwerveDems,

    /// True if the tick was rejected and these demands are the previous ones held over.
    pub held: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Frame in which the plant reports velocities.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelFrame {
    /// Vehicle body frame, X forwards, Y orthogonal (left), Z up.
    Body,

    /// World frame. Velocities are rotated into the body frame using the heading.
    World,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for VelFrame {
    fn default() -> Self {
        VelFrame::Body
    }
}

impl PlantState {
    /// Return true if every measurement in the state is finite.
    pub fn is_finite(&self) -> bool {
        self.tilt_rad.is_finite()
            && self.tilt_rate_rads.is_finite()
            && self.vel_ms.iter().all(|v| v.is_finite())
            && self.heading_rad.is_finite()
            && self.str_pos_rad.iter().all(|v| v.is_finite())
    }
}

impl SwerveDems {
    /// Demands holding the given steer positions with all drive axes stopped.
    pub fn neutral(str_abs_pos_rad: [f64; NUM_MODULES]) -> Self {
        Self {
            str_abs_pos_rad,
            drv_rate_rads: [0.0; NUM_MODULES],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_plant_req_json() {
        // Time and command are optional on the wire, as is the velocity frame
        let msg = r#"{
            "state": {
                "tilt_rad": 0.01,
                "tilt_rate_rads": -0.2,
                "vel_ms": [0.5, 0.0],
                "heading_rad": 1.0,
                "str_pos_rad": [0.0, 0.1]
            }
        }"#;

        let req: PlantReq = serde_json::from_str(msg).unwrap();

        assert_eq!(req.time_s, None);
        assert_eq!(req.cmd, DriveCmd::default());
        assert_eq!(req.state.vel_frame, VelFrame::Body);
        assert_eq!(req.state.str_pos_rad, [0.0, 0.1]);
        assert!(req.state.is_finite());

        let msg = r#"{
            "time_s": 2.5,
            "state": {
                "tilt_rad": 0.0,
                "tilt_rate_rads": 0.0,
                "vel_ms": [0.0, 1.0],
                "vel_frame": "World",
                "heading_rad": 0.0,
                "str_pos_rad": [0.0, 0.0]
            },
            "cmd": { "fwd": 1.0, "orth": 0.0, "head_rate": -0.5 }
        }"#;

        let req: PlantReq = serde_json::from_str(msg).unwrap();

        assert_eq!(req.time_s, Some(2.5));
        assert_eq!(req.state.vel_frame, VelFrame::World);
        assert_eq!(req.cmd.head_rate, -0.5);
    }

    #[test]
    fn test_non_finite_state() {
        let mut state = PlantState::default();
        assert!(state.is_finite());

        state.str_pos_rad[BACK] = f64::NAN;
        assert!(!state.is_finite());

        let mut state = PlantState::default();
        state.vel_ms[0] = f64::INFINITY;
        assert!(!state.is_finite());
    }
}

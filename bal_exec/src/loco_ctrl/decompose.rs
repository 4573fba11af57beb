//! Body velocity decomposition onto the swerve modules

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use comms_if::eqpt::plant::{NUM_MODULES, FRONT, BACK};
use super::{Params, FWD_POLARITY};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planar velocity of a single module, in the body frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct ModuleVel {
    /// Velocity along body X, with [`FWD_POLARITY`] applied.
    ///
    /// Units: meters/second
    pub fwd_ms: f64,

    /// Velocity along body Y.
    ///
    /// Units: meters/second
    pub orth_ms: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Split a body velocity demand across the front and back modules.
///
/// The modules sit half a wheelbase either side of the heading axis, so a
/// heading rate adds equal and opposite orthogonal velocity to each. The
/// forward velocity is shared. Inputs are expected to be finite.
pub fn decompose(
    fwd_ms: f64,
    orth_ms: f64,
    head_rate_rads: f64,
    params: &Params
) -> [ModuleVel; NUM_MODULES] {
    let skew_ms = 0.5 * params.wheelbase_m * head_rate_rads;
    let fwd_ms = FWD_POLARITY * fwd_ms;

    let mut vels = [ModuleVel::default(); NUM_MODULES];

    vels[FRONT] = ModuleVel {
        fwd_ms,
        orth_ms: orth_ms + skew_ms
    };
    vels[BACK] = ModuleVel {
        fwd_ms,
        orth_ms: orth_ms - skew_ms
    };

    vels
}

#[cfg(test)]
mod test {
    use super::*;

    fn params(wheelbase_m: f64) -> Params {
        Params {
            wheelbase_m,
            ..Params::default()
        }
    }

    #[test]
    fn test_no_heading_rate() {
        let vels = decompose(0.7, -0.3, 0.0, &params(2.0));

        assert_eq!(vels[FRONT].orth_ms, -0.3);
        assert_eq!(vels[BACK].orth_ms, -0.3);
        assert_eq!(vels[FRONT].fwd_ms, -0.7);
        assert_eq!(vels[BACK].fwd_ms, -0.7);
    }

    #[test]
    fn test_pure_heading_rate() {
        let vels = decompose(0.0, 0.0, 0.5, &params(2.0));

        // Front swings left, back swings right
        assert_eq!(vels[FRONT].orth_ms, 0.5);
        assert_eq!(vels[BACK].orth_ms, -0.5);
        assert_eq!(vels[FRONT].fwd_ms, 0.0);
        assert_eq!(vels[BACK].fwd_ms, 0.0);
    }

    #[test]
    fn test_combined() {
        let vels = decompose(1.0, 0.25, -1.0, &params(1.5));

        assert_eq!(vels[FRONT].orth_ms, 0.25 - 0.75);
        assert_eq!(vels[BACK].orth_ms, 0.25 + 0.75);
        assert_eq!(vels[FRONT].fwd_ms, FWD_POLARITY);
        assert_eq!(vels[FRONT].fwd_ms, vels[BACK].fwd_ms);
    }
}

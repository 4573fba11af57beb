//! Swerve module angle and rate optimisation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::{FRAC_PI_2, PI};
use serde::Serialize;

use util::maths::{clamp, wrap_angle};
use super::{GateMode, ModuleVel, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Demand for a single swerve module along with how it was reached.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct ModuleSoln {
    /// Steer axis absolute position demand, within a quarter turn of the
    /// current position.
    ///
    /// Units: radians
    pub str_abs_pos_rad: f64,

    /// Signed drive axis rate demand.
    ///
    /// Units: radians/second
    pub drv_rate_rads: f64,

    /// Steer correction applied to the current position.
    ///
    /// Units: radians
    pub corrected_error_rad: f64,

    /// The module points opposite to its velocity and drives in reverse.
    pub reversed: bool,

    /// The drive was held at zero while the module aligns.
    pub gated: bool,

    /// The drive rate was limited to the axis capability.
    pub drv_rate_limited: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the steer angle and signed drive rate which give the module the
/// requested planar velocity with the least rotation from `current_rad`.
///
/// A heading more than a quarter turn away is reached by pointing the module
/// the opposite way and driving backwards. Errors of exactly -pi/2 keep the
/// drive direction, errors of exactly pi/2 reverse it.
pub fn optimise_module(
    vel: &ModuleVel,
    current_rad: f64,
    params: &Params
) -> ModuleSoln {
    // Zero velocity points straight ahead. Checked explicitly since
    // atan2(0, -0) is pi.
    let raw_rad = if vel.fwd_ms == 0.0 && vel.orth_ms == 0.0 {
        0.0
    }
    else {
        vel.orth_ms.atan2(vel.fwd_ms)
    };
    let raw_rate_rads = (vel.fwd_ms * vel.fwd_ms + vel.orth_ms * vel.orth_ms)
        .sqrt() / params.wheel_radius_m;

    let error_rad = wrap_angle(raw_rad - current_rad);

    let (corrected_error_rad, mut drv_rate_rads, reversed) =
        if error_rad < -FRAC_PI_2 {
            (error_rad + PI, -raw_rate_rads, true)
        }
        else if error_rad < FRAC_PI_2 {
            (error_rad, raw_rate_rads, false)
        }
        else {
            (error_rad - PI, -raw_rate_rads, true)
        };

    let gated = match params.gate_mode {
        GateMode::Positive => corrected_error_rad > params.align_gate_rad,
        GateMode::Symmetric => corrected_error_rad.abs() > params.align_gate_rad,
    };
    if gated {
        drv_rate_rads = 0.0;
    }

    let mut drv_rate_limited = false;
    if let Some(max) = params.drv_max_abs_rate_rads {
        let limited = clamp(&drv_rate_rads, &-max, &max);
        drv_rate_limited = limited != drv_rate_rads;
        drv_rate_rads = limited;
    }

    ModuleSoln {
        str_abs_pos_rad: current_rad + corrected_error_rad,
        drv_rate_rads,
        corrected_error_rad,
        reversed,
        gated,
        drv_rate_limited
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> Params {
        Params {
            wheelbase_m: 2.0,
            wheel_radius_m: 0.5,
            ..Params::default()
        }
    }

    fn vel(fwd_ms: f64, orth_ms: f64) -> ModuleVel {
        ModuleVel { fwd_ms, orth_ms }
    }

    #[test]
    fn test_straight_ahead() {
        let soln = optimise_module(&vel(1.0, 0.0), 0.0, &params());

        assert_eq!(soln.str_abs_pos_rad, 0.0);
        assert_eq!(soln.drv_rate_rads, 2.0);
        assert!(!soln.reversed);
        assert!(!soln.gated);
    }

    #[test]
    fn test_reverse_flip() {
        let soln = optimise_module(&vel(-1.0, 0.0), 0.0, &params());

        assert!(soln.corrected_error_rad.abs() <= FRAC_PI_2);
        assert!(soln.drv_rate_rads < 0.0);
        assert!(soln.reversed);
        assert_eq!(soln.str_abs_pos_rad, 0.0);
        assert_eq!(soln.drv_rate_rads, -2.0);
    }

    #[test]
    fn test_zero_velocity() {
        // Both signs of zero must point straight ahead
        for &f in [0.0, -0.0].iter() {
            let soln = optimise_module(&vel(f, 0.0), 0.3, &params());

            assert_eq!(soln.drv_rate_rads, 0.0);
            assert!(!soln.reversed);
            assert_relative_eq!(soln.corrected_error_rad, -0.3, epsilon = 1e-12);
            assert_relative_eq!(soln.str_abs_pos_rad, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gating() {
        let soln = optimise_module(&vel(0.5f64.cos(), 0.5f64.sin()), 0.0, &params());

        assert_relative_eq!(soln.corrected_error_rad, 0.5, epsilon = 1e-12);
        assert!(soln.gated);
        assert_eq!(soln.drv_rate_rads, 0.0);
        assert_relative_eq!(soln.str_abs_pos_rad, 0.5, epsilon = 1e-12);

        // Negative errors of the same size still drive
        let soln = optimise_module(&vel(0.5f64.cos(), -(0.5f64.sin())), 0.0, &params());

        assert_relative_eq!(soln.corrected_error_rad, -0.5, epsilon = 1e-12);
        assert!(!soln.gated);
        assert_relative_eq!(soln.drv_rate_rads, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_gating() {
        let mut p = params();
        p.gate_mode = GateMode::Symmetric;

        let soln = optimise_module(&vel(0.5f64.cos(), -(0.5f64.sin())), 0.0, &p);

        assert!(soln.gated);
        assert_eq!(soln.drv_rate_rads, 0.0);

        let soln = optimise_module(&vel(1.0, 0.05), 0.0, &p);
        assert!(!soln.gated);
    }

    #[test]
    fn test_quarter_turn_boundaries() {
        // Error of exactly +pi/2 takes the reversing branch
        let soln = optimise_module(&vel(0.0, 1.0), 0.0, &params());

        assert_eq!(soln.corrected_error_rad, FRAC_PI_2 - PI);
        assert!(soln.reversed);
        assert!(!soln.gated);
        assert_eq!(soln.drv_rate_rads, -2.0);

        // Error of exactly -pi/2 keeps the drive direction
        let soln = optimise_module(&vel(0.0, -1.0), 0.0, &params());

        assert_eq!(soln.corrected_error_rad, -FRAC_PI_2);
        assert!(!soln.reversed);
        assert_eq!(soln.drv_rate_rads, 2.0);
    }

    #[test]
    fn test_continuous_current_angle() {
        // Current position several turns round, the target stays close to it
        let current = 4.0 * PI + 0.1;
        let soln = optimise_module(&vel(1.0, 0.0), current, &params());

        assert_relative_eq!(soln.corrected_error_rad, -0.1, epsilon = 1e-9);
        assert_relative_eq!(soln.str_abs_pos_rad, 4.0 * PI, epsilon = 1e-9);
        assert!((soln.str_abs_pos_rad - current).abs() <= FRAC_PI_2);
    }

    #[test]
    fn test_quarter_turn_bound_sweep() {
        let p = params();
        let mut theta = -3.0 * PI;

        while theta < 3.0 * PI {
            let v = vel(theta.cos(), theta.sin());

            for &current in [-2.0, 0.0, 0.7, 5.0].iter() {
                let soln = optimise_module(&v, current, &p);
                assert!(soln.corrected_error_rad.abs() <= FRAC_PI_2);
                assert!((soln.str_abs_pos_rad - current).abs() <= FRAC_PI_2 + 1e-12);
            }

            theta += 0.05;
        }
    }

    #[test]
    fn test_drive_rate_limit() {
        let mut p = params();
        p.drv_max_abs_rate_rads = Some(1.5);

        let soln = optimise_module(&vel(1.0, 0.0), 0.0, &p);
        assert!(soln.drv_rate_limited);
        assert_eq!(soln.drv_rate_rads, 1.5);

        let soln = optimise_module(&vel(-1.0, 0.0), 0.0, &p);
        assert!(soln.drv_rate_limited);
        assert_eq!(soln.drv_rate_rads, -1.5);

        let soln = optimise_module(&vel(0.5, 0.0), 0.0, &p);
        assert!(!soln.drv_rate_limited);
        assert_eq!(soln.drv_rate_rads, 1.0);
    }
}

//! Implementations for the BalCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{RowVector3, Vector3};
use serde::Serialize;

// Internal
use super::{BalCtrlError, Params};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Balance control module state.
///
/// Owns the regulator gain and the integrated orthogonal speed target. The
/// target starts at zero and is only changed by [`BalCtrl::advance`].
#[derive(Debug, Clone)]
pub struct BalCtrl {
    /// Regulator gain matrix, fixed after construction.
    gain_k: RowVector3<f64>,

    /// Optional magnitude limit on the orthogonal speed target.
    integrator_limit_ms: Option<f64>,

    /// Integrated orthogonal speed target.
    ///
    /// Units: meters/second
    orth_speed_target_ms: f64,
}

/// Output of a single regulator step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BalOutput {
    /// Corrective orthogonal acceleration demanded by the regulator.
    ///
    /// Units: meters/second^2
    pub accel_ms2: f64,

    /// The orthogonal velocity command for this tick, i.e. the integrated
    /// speed target.
    ///
    /// Units: meters/second
    pub orth_cmd_ms: f64,

    /// True if the integrated target was limited on this step.
    pub limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for BalCtrl {
    fn default() -> Self {
        Self {
            gain_k: RowVector3::zeros(),
            integrator_limit_ms: None,
            orth_speed_target_ms: 0.0,
        }
    }
}

impl BalCtrl {
    /// Create a new regulator from the parameters, with the orthogonal speed
    /// target at zero.
    pub fn new(params: &Params) -> Result<Self, BalCtrlError> {
        Ok(Self {
            gain_k: params.gain()?,
            integrator_limit_ms: params.integrator_limit_ms,
            orth_speed_target_ms: 0.0,
        })
    }

    /// Compute the corrective orthogonal acceleration, `K (r - x)`, with
    /// `x = [tilt, tilt rate, orthogonal speed]` and `r = [0, 0, setpoint]`.
    ///
    /// The orthogonal speed fed back here must be the measured speed, not
    /// the integrated target.
    pub fn accel(
        &self,
        tilt_rad: f64,
        tilt_rate_rads: f64,
        orth_speed_ms: f64,
        orth_setpoint_ms: f64
    ) -> f64 {
        let state = Vector3::new(tilt_rad, tilt_rate_rads, orth_speed_ms);
        let reference = Vector3::new(0.0, 0.0, orth_setpoint_ms);

        (self.gain_k * (reference - state))[0]
    }

    /// Advance the regulator by one tick of length `dt_s`.
    ///
    /// The acceleration is integrated into the orthogonal speed target,
    /// which is returned as this tick's orthogonal velocity command. A
    /// non-positive or non-finite `dt_s` is rejected and leaves the target
    /// untouched, as does a step whose acceleration or new target overflows.
    pub fn advance(
        &mut self,
        tilt_rad: f64,
        tilt_rate_rads: f64,
        orth_speed_ms: f64,
        orth_setpoint_ms: f64,
        dt_s: f64
    ) -> Result<BalOutput, BalCtrlError> {
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Err(BalCtrlError::InvalidDt(dt_s))
        }

        let accel_ms2 = self.accel(
            tilt_rad, tilt_rate_rads, orth_speed_ms, orth_setpoint_ms
        );

        let mut target = self.orth_speed_target_ms + accel_ms2 * dt_s;
        let mut limited = false;

        if !(accel_ms2.is_finite() && target.is_finite()) {
            return Err(BalCtrlError::NonFiniteOutput {
                accel_ms2,
                target_ms: target
            })
        }

        if let Some(limit) = self.integrator_limit_ms {
            let clamped = clamp(&target, &-limit, &limit);
            limited = clamped != target;
            target = clamped;
        }

        self.orth_speed_target_ms = target;

        trace!(
            "BalCtrl: accel {:.4} m/s^2, orth target {:.4} m/s",
            accel_ms2, target
        );

        Ok(BalOutput {
            accel_ms2,
            orth_cmd_ms: target,
            limited
        })
    }

    /// The current orthogonal speed target.
    pub fn orth_speed_target_ms(&self) -> f64 {
        self.orth_speed_target_ms
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn params(gain_k: Vec<f64>) -> Params {
        Params {
            gain_k,
            integrator_limit_ms: None,
            com_height_m: 0.3,
            mass_kg: 16.0,
            gravity_ms2: 9.81,
        }
    }

    #[test]
    fn test_zero_error_holds_target() {
        let mut bal = BalCtrl::new(&params(vec![-410.7, -25.8, -20.0])).unwrap();

        let out = bal.advance(0.0, 0.0, 0.0, 0.0, 1.0 / 240.0).unwrap();

        assert_eq!(out.accel_ms2, 0.0);
        assert_eq!(out.orth_cmd_ms, 0.0);
        assert_eq!(bal.orth_speed_target_ms(), 0.0);
    }

    #[test]
    fn test_linear_accumulation() {
        // Gain only on the speed error, so accel = setpoint - speed = 2
        let mut bal = BalCtrl::new(&params(vec![0.0, 0.0, 1.0])).unwrap();

        let first = bal.advance(0.0, 0.0, 0.0, 2.0, 0.5).unwrap();
        assert_eq!(first.accel_ms2, 2.0);
        assert_eq!(first.orth_cmd_ms, 1.0);

        let second = bal.advance(0.0, 0.0, 0.0, 2.0, 0.5).unwrap();
        assert_eq!(second.accel_ms2, 2.0);
        assert_eq!(second.orth_cmd_ms, 2.0 * 2.0 * 0.5);
    }

    #[test]
    fn test_feedback_on_measured_speed() {
        let mut bal = BalCtrl::new(&params(vec![0.0, 0.0, 1.0])).unwrap();

        // Integrated target grows, but the error is taken against the
        // measured speed each time so the acceleration doesn't change
        bal.advance(0.0, 0.0, 0.5, 1.0, 1.0).unwrap();
        let out = bal.advance(0.0, 0.0, 0.5, 1.0, 1.0).unwrap();

        assert_eq!(out.accel_ms2, 0.5);
        assert_eq!(out.orth_cmd_ms, 1.0);
    }

    #[test]
    fn test_gain_product() {
        let bal = BalCtrl::new(&params(vec![-2.0, -3.0, -4.0])).unwrap();

        // K (r - x) = -2*(0 - 0.1) - 3*(0 - 0.2) - 4*(1 - 0.5)
        assert_relative_eq!(bal.accel(0.1, 0.2, 0.5, 1.0), -1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_dt() {
        let mut bal = BalCtrl::new(&params(vec![0.0, 0.0, 1.0])).unwrap();
        bal.advance(0.0, 0.0, 0.0, 1.0, 1.0).unwrap();

        for dt in [0.0, -0.01, f64::NAN, f64::INFINITY].iter() {
            assert!(matches!(
                bal.advance(0.0, 0.0, 0.0, 1.0, *dt),
                Err(BalCtrlError::InvalidDt(_))
            ));
        }

        // Target is untouched by the rejected steps
        assert_eq!(bal.orth_speed_target_ms(), 1.0);
    }

    #[test]
    fn test_overflow_leaves_target() {
        let mut bal = BalCtrl::new(&params(vec![-410.7, -25.8, -20.0])).unwrap();
        bal.advance(0.0, 0.0, 0.0, 0.0, 0.5).unwrap();

        // Finite inputs, but the product overflows
        assert!(matches!(
            bal.advance(1e307, 0.0, 0.0, 0.0, 0.5),
            Err(BalCtrlError::NonFiniteOutput { .. })
        ));
        assert!(matches!(
            bal.advance(0.0, 0.0, 0.0, 0.0, f64::MAX),
            Ok(_)
        ));
        assert_eq!(bal.orth_speed_target_ms(), 0.0);

        // Large but finite acceleration over a long step
        assert!(matches!(
            bal.advance(0.0, 0.0, -1e300, 0.0, 1e10),
            Err(BalCtrlError::NonFiniteOutput { .. })
        ));
        assert_eq!(bal.orth_speed_target_ms(), 0.0);

        let out = bal.advance(0.0, 0.0, 0.0, 0.0, 0.5).unwrap();
        assert_eq!(out.orth_cmd_ms, 0.0);
    }

    #[test]
    fn test_integrator_limit() {
        let mut p = params(vec![0.0, 0.0, 1.0]);
        p.integrator_limit_ms = Some(1.5);
        let mut bal = BalCtrl::new(&p).unwrap();

        let out = bal.advance(0.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(!out.limited);

        let out = bal.advance(0.0, 0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(out.limited);
        assert_eq!(out.orth_cmd_ms, 1.5);

        let out = bal.advance(0.0, 0.0, 0.0, -5.0, 1.0).unwrap();
        assert!(out.limited);
        assert_eq!(out.orth_cmd_ms, -1.5);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            BalCtrl::new(&params(vec![1.0, 2.0])),
            Err(BalCtrlError::InvalidGain(_))
        ));
        assert!(matches!(
            BalCtrl::new(&params(vec![1.0, 2.0, 3.0, 4.0])),
            Err(BalCtrlError::InvalidGain(_))
        ));
        assert!(matches!(
            BalCtrl::new(&params(vec![1.0, f64::NAN, 3.0])),
            Err(BalCtrlError::InvalidGain(_))
        ));

        let mut p = params(vec![1.0, 2.0, 3.0]);
        p.com_height_m = 0.0;
        assert!(matches!(
            BalCtrl::new(&p),
            Err(BalCtrlError::InvalidParam("com_height_m", _))
        ));

        let mut p = params(vec![1.0, 2.0, 3.0]);
        p.integrator_limit_ms = Some(-1.0);
        assert!(matches!(
            BalCtrl::new(&p),
            Err(BalCtrlError::InvalidParam("integrator_limit_ms", _))
        ));
    }

    #[test]
    fn test_plant_model() {
        let (a, b) = params(vec![0.0, 0.0, 0.0]).plant_model();

        assert_eq!(a[(0, 1)], 1.0);
        assert_relative_eq!(a[(1, 0)], 9.81 / 0.3, epsilon = 1e-12);
        assert_eq!(a[(2, 2)], 0.0);
        assert_relative_eq!(b[1], -1.0 / 0.3, epsilon = 1e-12);
        assert_eq!(b[2], 1.0 / 16.0);
    }

    #[test]
    fn test_shipped_gain_stabilises_model() {
        let p = params(vec![-410.72027632491324, -25.802795633812845, -20.0]);
        let (a, b) = p.plant_model();
        let m = a - b * p.gain().unwrap();

        // Characteristic polynomial l^3 + c2 l^2 + c1 l + c0 of A - BK
        let c2 = -m.trace();
        let c1 = m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]
            + m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)]
            + m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)];
        let c0 = -m.determinant();

        // Routh-Hurwitz
        assert!(c2 > 0.0);
        assert!(c0 > 0.0);
        assert!(c2 * c1 > c0);
    }
}

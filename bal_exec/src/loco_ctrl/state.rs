//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{decompose, optimise_module, LocoCtrlError, ModuleSoln, Params};
use comms_if::eqpt::plant::{SwerveDems, NUM_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state.
#[derive(Debug, Clone, Default)]
pub struct LocoCtrl {
    params: Params,

    /// Steer positions last read from the plant. These are only ever
    /// replaced by a new reading, never accumulated.
    ///
    /// Units: radians
    str_pos_rad: [f64; NUM_MODULES],

    /// Steer position demands from the last solution.
    ///
    /// Units: radians
    str_target_rad: [f64; NUM_MODULES],
}

/// Status report for LocoCtrl processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// Modules driving in reverse.
    pub reversed: [bool; NUM_MODULES],

    /// Modules whose drive is held while aligning.
    pub gated: [bool; NUM_MODULES],

    /// Modules whose drive rate was limited.
    pub drv_rate_limited: [bool; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Create a new LocoCtrl from validated parameters, with both modules
    /// assumed to be at zero until the plant reports otherwise.
    pub fn new(params: Params) -> Result<Self, LocoCtrlError> {
        params.validate()?;

        Ok(Self {
            params,
            str_pos_rad: [0.0; NUM_MODULES],
            str_target_rad: [0.0; NUM_MODULES],
        })
    }

    /// Record the steer positions read from the plant this tick.
    pub fn observe(&mut self, str_pos_rad: [f64; NUM_MODULES]) {
        self.str_pos_rad = str_pos_rad;
    }

    /// Compute module demands for a body velocity demand.
    ///
    /// Each module is optimised from the steer position last passed to
    /// [`LocoCtrl::observe`].
    pub fn calc(
        &mut self,
        fwd_ms: f64,
        orth_ms: f64,
        head_rate_rads: f64
    ) -> (SwerveDems, StatusReport) {
        let vels = decompose(fwd_ms, orth_ms, head_rate_rads, &self.params);

        let mut dems = SwerveDems::default();
        let mut report = StatusReport::default();

        for i in 0..NUM_MODULES {
            let soln: ModuleSoln = optimise_module(
                &vels[i], self.str_pos_rad[i], &self.params
            );

            dems.str_abs_pos_rad[i] = soln.str_abs_pos_rad;
            dems.drv_rate_rads[i] = soln.drv_rate_rads;

            report.reversed[i] = soln.reversed;
            report.gated[i] = soln.gated;
            report.drv_rate_limited[i] = soln.drv_rate_limited;

            self.str_target_rad[i] = soln.str_abs_pos_rad;
        }

        trace!(
            "LocoCtrl output:\n    str: {:?}\n    drv: {:?}",
            dems.str_abs_pos_rad,
            dems.drv_rate_rads
        );

        (dems, report)
    }

    /// Demands which keep each module at its last read steer position with
    /// the drive stopped.
    pub fn neutral(&self) -> SwerveDems {
        SwerveDems::neutral(self.str_pos_rad)
    }

    /// Steer positions last read from the plant.
    pub fn str_pos_rad(&self) -> [f64; NUM_MODULES] {
        self.str_pos_rad
    }

    /// Steer position demands from the last call to [`LocoCtrl::calc`].
    pub fn str_target_rad(&self) -> [f64; NUM_MODULES] {
        self.str_target_rad
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::plant::{FRONT, BACK};
    use crate::loco_ctrl::GateMode;

    fn loco() -> LocoCtrl {
        LocoCtrl::new(Params {
            wheelbase_m: 2.0,
            wheel_radius_m: 0.375,
            ..Params::default()
        }).unwrap()
    }

    #[test]
    fn test_point_turn_gates_until_aligned() {
        let mut loco = LocoCtrl::new(Params {
            wheelbase_m: 2.0,
            wheel_radius_m: 0.375,
            gate_mode: GateMode::Symmetric,
            ..Params::default()
        }).unwrap();

        // Pure heading rate asks both modules to point sideways, which is a
        // quarter turn from straight ahead
        let (dems, report) = loco.calc(0.0, 0.0, 0.5);

        assert_eq!(report.gated, [true, true]);
        assert_eq!(dems.drv_rate_rads, [0.0, 0.0]);
        assert!(report.reversed[FRONT]);
        assert!(!report.reversed[BACK]);
        assert_eq!(dems.str_abs_pos_rad[FRONT], dems.str_abs_pos_rad[BACK]);
        assert_eq!(loco.str_target_rad(), dems.str_abs_pos_rad);

        // Once the plant reports the modules aligned they both drive, in
        // opposite directions
        loco.observe(dems.str_abs_pos_rad);
        let (dems, report) = loco.calc(0.0, 0.0, 0.5);

        assert_eq!(report.gated, [false, false]);
        assert_eq!(dems.drv_rate_rads[FRONT], -dems.drv_rate_rads[BACK]);
        assert!(dems.drv_rate_rads[FRONT] != 0.0);
    }

    #[test]
    fn test_neutral_holds_observed_angles() {
        let mut loco = loco();
        loco.observe([0.2, -0.4]);

        let dems = loco.neutral();

        assert_eq!(dems.str_abs_pos_rad, [0.2, -0.4]);
        assert_eq!(dems.drv_rate_rads, [0.0, 0.0]);
    }

    #[test]
    fn test_invalid_params() {
        let p = Params {
            wheel_radius_m: -0.1,
            ..Params::default()
        };
        assert!(LocoCtrl::new(p).is_err());
    }
}

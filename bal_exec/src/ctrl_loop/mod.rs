//! # Control loop module
//!
//! Runs one control tick at a time: reads the plant state and the drive
//! command, advances the balance regulator, and passes its orthogonal
//! velocity command together with the commanded forward velocity and heading
//! rate to locomotion control.
//!
//! The very first tick has no delta-time, so it only records the timestamp
//! and returns neutral demands. Any tick which cannot be computed safely
//! (bad timing, non-finite measurements or commands) is rejected with an
//! error and the caller reissues [`CtrlLoop::hold_output`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use comms_if::{eqpt::plant::{PlantState, SwerveDems}, tc::DriveCmd};
use util::{archive::ArchiveError, params::LoadError};
use crate::{bal_ctrl::BalCtrlError, loco_ctrl::{self, LocoCtrlError}};

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Initialisation data for the control loop.
///
/// Parameter file paths are relative to the `params` directory of the
/// software root.
#[derive(Debug, Clone)]
pub struct InitData {
    pub bal_ctrl_params: &'static str,
    pub loco_ctrl_params: &'static str,
    pub ctrl_loop_params: &'static str,

    /// If false no tick archive is written.
    pub archive: bool,
}

/// Input to a single control tick.
#[derive(Debug, Copy, Clone, Default)]
pub struct InputData {
    /// Timestamp of the tick.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// State measured by the plant.
    pub state: PlantState,

    /// Drive command in external units.
    pub cmd: DriveCmd,
}

/// Status report for a control tick.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// This was the first tick, only neutral demands were issued.
    pub first_tick: bool,

    /// Time since the previous tick.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Regulator acceleration.
    ///
    /// Units: meters/second^2
    pub accel_ms2: f64,

    /// Orthogonal velocity command from the regulator.
    ///
    /// Units: meters/second
    pub orth_cmd_ms: f64,

    /// The regulator's speed target hit its limit.
    pub integrator_limited: bool,

    /// Locomotion control report.
    pub loco: loco_ctrl::StatusReport,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during CtrlLoop operation.
#[derive(Debug, thiserror::Error)]
pub enum CtrlLoopError {
    #[error("Invalid tick timing at {time_s} s (dt = {dt_s} s)")]
    InvalidTiming { time_s: f64, dt_s: f64 },

    #[error("Non-finite plant measurement: {0:?}")]
    InvalidMeasurement(PlantState),

    #[error("Non-finite drive command: {0:?}")]
    InvalidCommand(DriveCmd),

    #[error("The control loop has not been initialised")]
    NotInit,

    #[error("Invalid control loop parameter {0}: {1}")]
    InvalidParam(&'static str, f64),

    #[error("Could not load the control loop parameters: {0}")]
    ParamLoad(#[from] LoadError),

    #[error("Balance control error: {0}")]
    BalCtrl(#[from] BalCtrlError),

    #[error("Locomotion control error: {0}")]
    LocoCtrl(#[from] LocoCtrlError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

impl CtrlLoopError {
    /// True for errors which reject a single tick, after which the loop can
    /// continue. Everything else is a configuration fault.
    pub fn is_tick_rejection(&self) -> bool {
        matches!(
            self,
            CtrlLoopError::InvalidTiming { .. }
                | CtrlLoopError::InvalidMeasurement(_)
                | CtrlLoopError::InvalidCommand(_)
        )
    }
}

/// Whether the loop has seen its first tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LoopState {
    /// No tick accepted yet, so there's no timestamp to take a delta from.
    Uninit,

    /// Running, with the timestamp of the last recorded tick.
    Running { last_time_s: f64 },
}

impl Default for LoopState {
    fn default() -> Self {
        LoopState::Uninit
    }
}

// ---------------------------------------------------------------------------
// ARCHIVE RECORD
// ---------------------------------------------------------------------------

/// One row of the tick archive.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct TickRecord {
    pub time_s: f64,
    pub held: bool,
    pub first_tick: bool,
    pub dt_s: f64,

    pub tilt_rad: f64,
    pub tilt_rate_rads: f64,
    pub vel_x_ms: f64,
    pub vel_y_ms: f64,
    pub heading_rad: f64,
    pub str_pos_front_rad: f64,
    pub str_pos_back_rad: f64,

    pub cmd_fwd: f64,
    pub cmd_orth: f64,
    pub cmd_head_rate: f64,

    pub accel_ms2: f64,
    pub orth_cmd_ms: f64,
    pub integrator_limited: bool,

    pub str_dem_front_rad: f64,
    pub str_dem_back_rad: f64,
    pub drv_dem_front_rads: f64,
    pub drv_dem_back_rads: f64,
    pub reversed_front: bool,
    pub reversed_back: bool,
    pub gated_front: bool,
    pub gated_back: bool,
}

impl TickRecord {
    pub fn new(
        input: &InputData,
        dems: &SwerveDems,
        report: &StatusReport,
        held: bool
    ) -> Self {
        use comms_if::eqpt::plant::{FRONT, BACK};

        Self {
            time_s: input.time_s,
            held,
            first_tick: report.first_tick,
            dt_s: report.dt_s,
            tilt_rad: input.state.tilt_rad,
            tilt_rate_rads: input.state.tilt_rate_rads,
            vel_x_ms: input.state.vel_ms[0],
            vel_y_ms: input.state.vel_ms[1],
            heading_rad: input.state.heading_rad,
            str_pos_front_rad: input.state.str_pos_rad[FRONT],
            str_pos_back_rad: input.state.str_pos_rad[BACK],
            cmd_fwd: input.cmd.fwd,
            cmd_orth: input.cmd.orth,
            cmd_head_rate: input.cmd.head_rate,
            accel_ms2: report.accel_ms2,
            orth_cmd_ms: report.orth_cmd_ms,
            integrator_limited: report.integrator_limited,
            str_dem_front_rad: dems.str_abs_pos_rad[FRONT],
            str_dem_back_rad: dems.str_abs_pos_rad[BACK],
            drv_dem_front_rads: dems.drv_rate_rads[FRONT],
            drv_dem_back_rads: dems.drv_rate_rads[BACK],
            reversed_front: report.loco.reversed[FRONT],
            reversed_back: report.loco.reversed[BACK],
            gated_front: report.loco.gated[FRONT],
            gated_back: report.loco.gated[BACK],
        }
    }
}

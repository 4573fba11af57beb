//! Implementations for the CtrlLoop state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use nalgebra::{Rotation2, Vector2};

// Internal
use super::{
    CtrlLoopError, InitData, InputData, LoopState, Params, StatusReport,
    TickRecord};
use crate::{bal_ctrl::{self, BalCtrl, BalCtrlError}, loco_ctrl::{self, LocoCtrl}};
use comms_if::eqpt::plant::{PlantState, SwerveDems, VelFrame};
use util::{
    params,
    module::State,
    archive::{Archived, Archiver, ArchiveError},
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control loop state.
#[derive(Default)]
pub struct CtrlLoop {
    initialised: bool,

    params: Params,

    bal_ctrl: BalCtrl,
    loco_ctrl: LocoCtrl,

    loop_state: LoopState,

    /// Demands issued by the last accepted tick.
    last_output: Option<SwerveDems>,

    /// Record of the last tick, taken by the next archive write.
    record: Option<TickRecord>,
    arch_ticks: Archiver,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for CtrlLoop {
    type InitData = InitData;
    type InitError = CtrlLoopError;

    type InputData = InputData;
    type OutputData = SwerveDems;
    type StatusReport = StatusReport;
    type ProcError = CtrlLoopError;

    /// Initialise the control loop, loading the parameters of every
    /// controller it owns.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let bal_params: bal_ctrl::Params = params::load(init_data.bal_ctrl_params)?;
        let loco_params: loco_ctrl::Params = params::load(init_data.loco_ctrl_params)?;
        let loop_params: Params = params::load(init_data.ctrl_loop_params)?;

        *self = Self::new(&bal_params, loco_params, loop_params)?;

        if init_data.archive {
            self.arch_ticks = Archiver::from_path(session, "ctrl_loop/ticks.csv")?;
        }

        info!(
            "CtrlLoop initialised with gain {:?}, wheelbase {} m, wheel radius {} m",
            bal_params.gain_k,
            self.loco_ctrl.params().wheelbase_m,
            self.loco_ctrl.params().wheel_radius_m
        );

        Ok(())
    }

    /// Perform a single control tick.
    ///
    /// Rejected ticks return an error and leave the regulator untouched, the
    /// caller should issue [`CtrlLoop::hold_output`] instead.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let result = self.tick(input_data);

        self.record = match &result {
            Ok((dems, report)) => Some(
                TickRecord::new(input_data, dems, report, false)
            ),
            Err(e) if e.is_tick_rejection() => Some(TickRecord::new(
                input_data, &self.hold_output(), &StatusReport::default(), true
            )),
            Err(_) => None,
        };

        result
    }
}

impl Archived for CtrlLoop {
    fn write(&mut self) -> Result<(), ArchiveError> {
        if let Some(record) = self.record.take() {
            self.arch_ticks.serialise(record)?;
        }

        Ok(())
    }
}

impl CtrlLoop {
    /// Build a control loop from parameters already in memory. No archive is
    /// written.
    pub fn new(
        bal_params: &bal_ctrl::Params,
        loco_params: loco_ctrl::Params,
        loop_params: Params
    ) -> Result<Self, CtrlLoopError> {
        loop_params.validate()?;

        Ok(Self {
            initialised: true,
            params: loop_params,
            bal_ctrl: BalCtrl::new(bal_params)?,
            loco_ctrl: LocoCtrl::new(loco_params)?,
            ..Self::default()
        })
    }

    /// Demands to issue when a tick is rejected: the last accepted output,
    /// or neutral demands at the last read steer positions if there isn't
    /// one.
    pub fn hold_output(&self) -> SwerveDems {
        match self.last_output {
            Some(o) => o,
            None => self.loco_ctrl.neutral()
        }
    }

    /// The current loop state.
    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// The balance regulator.
    pub fn bal_ctrl(&self) -> &BalCtrl {
        &self.bal_ctrl
    }

    fn tick(&mut self, input: &InputData)
        -> Result<(SwerveDems, StatusReport), CtrlLoopError>
    {
        if !self.initialised {
            return Err(CtrlLoopError::NotInit)
        }

        let time_s = input.time_s;
        let state = &input.state;
        let cmd = &input.cmd;

        // A non-finite timestamp is never recorded, the next good one is
        // measured from the last good one
        if !time_s.is_finite() {
            return Err(CtrlLoopError::InvalidTiming {
                time_s,
                dt_s: std::f64::NAN
            })
        }

        let last_time_s = match self.loop_state {
            LoopState::Uninit => {
                validate_input(input)?;

                self.loop_state = LoopState::Running { last_time_s: time_s };
                self.loco_ctrl.observe(state.str_pos_rad);

                let dems = self.loco_ctrl.neutral();
                self.last_output = Some(dems);

                info!("First control tick at {:.3} s, issuing neutral demands", time_s);

                return Ok((dems, StatusReport {
                    first_tick: true,
                    ..StatusReport::default()
                }))
            },
            LoopState::Running { last_time_s } => last_time_s
        };

        // From here on the timestamp is recorded even if the tick is
        // rejected, so the next tick gets a fresh dt
        self.loop_state = LoopState::Running { last_time_s: time_s };

        // Finite timestamps can still overflow to an infinite dt
        let dt_s = time_s - last_time_s;
        if !(dt_s.is_finite() && dt_s > 0.0) {
            return Err(CtrlLoopError::InvalidTiming { time_s, dt_s })
        }

        validate_input(input)?;

        self.loco_ctrl.observe(state.str_pos_rad);

        let body_vel_ms = body_vel_ms(state);

        let fwd_ms = cmd.fwd * self.params.cmd_scale_fwd;
        let orth_setpoint_ms = cmd.orth * self.params.cmd_scale_orth;
        let head_rate_rads = cmd.head_rate * self.params.cmd_scale_head;

        if !(fwd_ms.is_finite() && orth_setpoint_ms.is_finite() && head_rate_rads.is_finite()) {
            return Err(CtrlLoopError::InvalidCommand(*cmd))
        }

        // An overflowing regulator step means the measurement was absurd
        let bal = self.bal_ctrl.advance(
            state.tilt_rad,
            state.tilt_rate_rads,
            body_vel_ms[1],
            orth_setpoint_ms,
            dt_s
        ).map_err(|e| match e {
            BalCtrlError::NonFiniteOutput { .. } => CtrlLoopError::InvalidMeasurement(*state),
            e => CtrlLoopError::BalCtrl(e)
        })?;

        let (dems, loco_report) = self.loco_ctrl.calc(
            fwd_ms, bal.orth_cmd_ms, head_rate_rads
        );

        self.last_output = Some(dems);

        let report = StatusReport {
            first_tick: false,
            dt_s,
            accel_ms2: bal.accel_ms2,
            orth_cmd_ms: bal.orth_cmd_ms,
            integrator_limited: bal.limited,
            loco: loco_report
        };

        trace!("CtrlLoop tick at {:.4} s: {:?}", time_s, report);

        Ok((dems, report))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn validate_input(input: &InputData) -> Result<(), CtrlLoopError> {
    if !input.state.is_finite() {
        return Err(CtrlLoopError::InvalidMeasurement(input.state))
    }
    if !input.cmd.is_finite() {
        return Err(CtrlLoopError::InvalidCommand(input.cmd))
    }

    Ok(())
}

/// Planar body velocity `[forward, orthogonal]` from the plant state.
///
/// World frame velocities are rotated by the negative heading.
pub fn body_vel_ms(state: &PlantState) -> [f64; 2] {
    let vel = Vector2::new(state.vel_ms[0], state.vel_ms[1]);

    let body = match state.vel_frame {
        VelFrame::Body => vel,
        VelFrame::World => Rotation2::new(-state.heading_rad) * vel
    };

    [body[0], body[1]]
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

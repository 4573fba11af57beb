//! Main balancing controller executable entry point.
//!
//! # Architecture
//!
//! The executable is driven by the plant. Each tick:
//!
//!     - Wait for a state request from the plant
//!     - Run the control loop on the measured state and drive command
//!     - Reply with the swerve module demands, or the held demands if the
//!       tick was rejected
//!     - Archive the tick and publish telemetry
//!
//! The plant decides the control cadence, simulations supply their own
//! time with each request.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, info, warn};
use structopt::StructOpt;

// Internal
use bal_lib::{
    ctrl_loop::{self, CtrlLoop},
    plant_server::{PlantServer, PlantServerError},
    tm_server::{TmPacket, TmServer}
};
use comms_if::{eqpt::plant::PlantRep, net::{NetParams, zmq}};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{get_elapsed_seconds, Session}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Swerve balancing controller
#[derive(Debug, StructOpt)]
#[structopt(name = "bal_exec")]
struct Opts {
    /// Minimum level of log messages, `info` or more verbose.
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Do not write the tick archive.
    #[structopt(long)]
    no_archive: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "bal_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Balancing Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams = util::params::load(
        "net.toml"
    ).wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- MODULE INITIALISATION ----

    let mut ctrl = CtrlLoop::default();
    ctrl.init(ctrl_loop::InitData {
        bal_ctrl_params: "bal_ctrl.toml",
        loco_ctrl_params: "loco_ctrl.toml",
        ctrl_loop_params: "ctrl_loop.toml",
        archive: !opts.no_archive
    }, &session).wrap_err("Failed to initialise CtrlLoop")?;

    info!("CtrlLoop init complete");

    // ---- SERVER INITIALISATION ----

    let zmq_ctx = zmq::Context::new();

    let mut plant_server = PlantServer::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise the plant server")?;
    info!("Plant server listening on {}", net_params.plant_endpoint);

    let mut tm_server = TmServer::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise the TM server")?;
    info!("TM server publishing on {}", net_params.tm_endpoint);

    // ---- MAIN LOOP ----

    info!("Initialisation complete, waiting for the plant");

    let mut plant_connected = false;

    loop {
        // Get the next request from the plant
        let req = match plant_server.get_request() {
            Ok(Some(r)) => r,
            Ok(None) => {
                if plant_connected && !plant_server.connected() {
                    warn!("Plant disconnected");
                    plant_connected = false;
                }
                continue
            },
            Err(PlantServerError::InvalidRequest(e)) => {
                // The plant is still owed a reply, so hold
                warn!("Invalid plant request ({}), holding demands", e);
                send_reply(&mut plant_server, PlantRep {
                    dems: ctrl.hold_output(),
                    held: true
                });
                continue
            },
            Err(e) => {
                warn!("Could not get a plant request: {}", e);
                continue
            }
        };

        if !plant_connected {
            info!("Recieved first request from the plant");
            plant_connected = true;
        }

        // Simulations bring their own clock, otherwise use the session clock
        let time_s = match req.time_s {
            Some(t) => t,
            None => get_elapsed_seconds()
        };

        let input = ctrl_loop::InputData {
            time_s,
            state: req.state,
            cmd: req.cmd
        };

        let (dems, report, held) = match ctrl.proc(&input) {
            Ok((d, r)) => (d, r, false),
            Err(e) if e.is_tick_rejection() => {
                warn!("Control tick rejected: {}", e);
                (ctrl.hold_output(), ctrl_loop::StatusReport::default(), true)
            },
            Err(e) => return Err(e).wrap_err("Control loop error")
        };

        send_reply(&mut plant_server, PlantRep { dems, held });

        // ---- ARCHIVE AND TELEMETRY ----

        if let Err(e) = ctrl.write() {
            warn!("Could not archive the tick: {}", e);
        }

        let packet = TmPacket {
            time_s,
            held,
            dems: &dems,
            status_rpt: &report,
        };
        if let Err(e) = tm_server.send(&packet) {
            warn!("Could not send telemetry: {}", e);
        }
    }
}

/// Send a reply to the plant, logging any failure.
fn send_reply(server: &mut PlantServer, reply: PlantRep) {
    if let Err(e) = server.send_reply(&reply) {
        warn!("Could not reply to the plant: {}", e);
    }
}

//! Main driving executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Build the equipment stack and the drive manager
//!     - Start the autonomous driver (idle until granted authority)
//!     - Main loop:
//!         - Telecommand acquisition from the script source
//!         - Telecommand processing and handling
//!         - Cycle management
//!     - Shut the autonomous driver down
//!
//! The exec takes one optional argument, the path to a drive script. With no
//! argument a built-in demonstration script is run against the simulated
//! equipment stack.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
use drive_lib::eqpt_sim::{SimCam, SimCar, SimLaneKeeping, SimTrafficSignal};
use drive_lib::drive_ctrl::{AutoEqpt, DriveMgr, Params};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::eyre, eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one TC processing cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Height of simulated camera frames in pixels.
#[cfg(feature = "sim")]
const SIM_FRAME_HEIGHT: u32 = 120;

/// Width of simulated camera frames in pixels.
#[cfg(feature = "sim")]
const SIM_FRAME_WIDTH: u32 = 160;

/// Built-in demonstration script, used when no script path is given.
///
/// Drives forward manually, hands authority to the autonomous driver for a
/// few seconds, takes it back and brakes.
const DEMO_SCRIPT: &str = r#"
    0.5: {"type": "FWD"};
    1.0: {"type": "SPD_UP"};
    1.5: {"type": "STEER", "rad": -0.15};
    2.0: {"type": "AUTO", "enable": true};
    6.0: {"type": "AUTO", "enable": false};
    6.5: {"type": "BRK"};
"#;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Auto Driving Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: Params = match util::params::load("drive_ctrl.toml") {
        Ok(p) => p,
        Err(e) => {
            warn!("Could not load drive_ctrl.toml ({}), using defaults", e);
            Params::default()
        }
    };

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // With a single argument use it as the script path, with none run the
    // built-in demo script.
    let mut script = if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?
    } else if args.len() == 1 {
        info!("No script provided, running the built-in demo script\n");

        ScriptInterpreter::from_str(DEMO_SCRIPT).wrap_err("Failed to load the demo script")?
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    };

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE EQUIPMENT AND THE DRIVE MANAGER ----

    info!("Initialising the drive manager...");

    #[cfg(feature = "sim")]
    let mut drive_mgr = {
        let mgr = DriveMgr::new(params.clone(), Box::new(SimCar::new()))
            .wrap_err("Failed to initialise the drive manager")?;
        info!("DriveMgr initialised (simulated car control)");
        mgr
    };

    #[cfg(not(feature = "sim"))]
    compile_error!(
        "No equipment stack is selected: enable the `sim` feature or link a hardware stack"
    );

    #[cfg(feature = "sim")]
    let eqpt = AutoEqpt {
        cam: Box::new(SimCam::new(SIM_FRAME_HEIGHT, SIM_FRAME_WIDTH)),
        lane_keeping: Box::new(SimLaneKeeping::new(params.min_radian)),
        traffic_signal: Box::new(SimTrafficSignal::new(40)),
    };

    drive_mgr
        .start(eqpt)
        .wrap_err("Failed to start the autonomous driver")?;

    info!("Initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&drive_mgr, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }

    // ---- SHUTDOWN ----

    drive_mgr.shutdown();

    info!("End of execution");

    Ok(())
}

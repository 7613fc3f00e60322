//! # Telecommand processor module
//!
//! The telecommand processor hands each TC, whatever its source, to the
//! drive manager. Actuator faults reported by the manager are logged and do
//! not stop the exec; manual commands suppressed under autonomous authority
//! come back as clean no-ops and produce no output here.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use ctrl_if::manual::ManualCtrl;
use ctrl_if::tc::DriveTc;
use drive_lib::drive_ctrl::DriveMgr;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand against the drive manager.
pub(crate) fn exec(mgr: &DriveMgr, tc: &DriveTc) {
    debug!("Executing TC: {:?}", tc);

    let cmd_result = match tc {
        DriveTc::AutoMode { enable } => mgr.set_auto_mode(*enable),
        DriveTc::SpeedUp => {
            mgr.speed_up();
            Ok(())
        }
        DriveTc::SpeedDown => {
            mgr.speed_down();
            Ok(())
        }
        DriveTc::Steer { rad } => mgr.steer(*rad),
        DriveTc::MoveFront => mgr.move_front(),
        DriveTc::MoveBack => mgr.move_back(),
        DriveTc::Brake => mgr.brake(),
    };

    // Actuator faults are transient, report and carry on with the next TC
    if let Err(e) = cmd_result {
        warn!("Could not execute TC {:?}: {}", tc, e);
    }
}

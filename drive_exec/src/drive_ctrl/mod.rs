//! Driving control module
//!
//! # Architecture
//!
//! Driving authority over the single vehicle actuator is arbitrated between
//! two sources:
//!
//! - The manual command surface ([`DriveMgr`], implementing
//!   `ctrl_if::manual::ManualCtrl`), driven by the operator's telecommands.
//! - The autonomous driver, a background thread running a continuous
//!   capture-perceive-decide-actuate cycle while it holds authority.
//!
//! Exactly one source drives the actuator at a time. Every actuator write,
//! from either source, goes through the shared actuation lock owned by
//! [`DriveCtx`], so no two commands can interleave at the hardware boundary.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod auto_driver;
mod ctx;
mod mgr;
mod params;

#[cfg(test)]
pub(crate) mod test_eqpt;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub(crate) use auto_driver::AutoDriver;
pub use ctx::*;
pub use mgr::*;
pub use params::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during driving control operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("The autonomous driver has already been started")]
    DriverAlreadyStarted,

    #[error("Invalid driving control parameters: {0}")]
    InvalidParams(ParamsError),
}

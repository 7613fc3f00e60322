//! # Driving library.
//!
//! This library allows other crates in the workspace (and the exec's own
//! binary) to access items defined inside the driving crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Driving control module - arbitrates driving authority between the manual command surface and
/// the autonomous driver, and runs the autonomous sense-plan-act loop
pub mod drive_ctrl;

/// Simulated equipment stack - stands in for the camera, perception stages and car control
/// hardware
#[cfg(feature = "sim")]
pub mod eqpt_sim;

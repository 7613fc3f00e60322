//! # Control interface crate.
//!
//! Provides the common interfaces of the driving software: the telecommand
//! vocabulary used to drive the vehicle and the contracts of the equipment the
//! driving exec depends on.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Contract definitions for equipment (camera, perception, car control)
pub mod eqpt;

/// Manual driving control surface
pub mod manual;

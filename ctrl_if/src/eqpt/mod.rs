//! # Equipment interface module
//!
//! Contracts the driving exec requires of its equipment. Each collaborator is
//! a trait so the exec can be run against real hardware or against the
//! simulated stack.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod cam;
pub mod car;
pub mod per;

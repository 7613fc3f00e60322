//! # Car Control Equipment Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single transient command to the car's actuators.
///
/// Commands are issued and forgotten, never stored. A brake is expressed as
/// `MoveFront` at the neutral PWM level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CarCmd {
    /// Set the steering angle.
    ///
    /// Units: radians, negative angles steer to the right.
    Steer { rad: f64 },

    /// Drive forward.
    ///
    /// Units: PWM power level.
    MoveFront { pwm: f64 },

    /// Drive backward.
    ///
    /// Units: PWM power level.
    MoveBack { pwm: f64 },
}

/// Possible errors raised by the car control gateway.
#[derive(Debug, Error)]
pub enum CarCtrlError {
    #[error("The car rejected the command {0:?}")]
    CmdRejected(CarCmd),

    #[error("Could not reach the car's actuators: {0}")]
    NotResponding(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Car actuation gateway contract.
///
/// Implementations validate or clamp PWM levels to their own hardware limits
/// and are assumed synchronous and fast relative to the drive cycle period.
/// Callers must serialise access through the shared actuation lock; the
/// gateway itself is not required to be re-entrant.
pub trait CarCtrl {
    /// Set the steering angle in radians.
    fn steer_wheel(&mut self, rad: f64) -> Result<(), CarCtrlError>;

    /// Drive forward at the given PWM power level.
    fn move_front(&mut self, pwm: f64) -> Result<(), CarCtrlError>;

    /// Drive backward at the given PWM power level.
    fn move_back(&mut self, pwm: f64) -> Result<(), CarCtrlError>;
}

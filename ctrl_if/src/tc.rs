//! # Telecommand module
//!
//! This module provides the telecommand vocabulary of the driving software. A
//! telecommand is a single discrete instruction issued by the operator (or a
//! script standing in for the operator) to the driving exec.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// A driving telecommand.
///
/// Manual driving commands (`Steer`, `MoveFront`, `MoveBack`, `Brake`, and the
/// speed level commands) only take effect while manual authority is held, as
/// laid out by the [`crate::manual::ManualCtrl`] contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriveTc {
    /// Grant (`true`) or revoke (`false`) autonomous driving authority.
    AutoMode { enable: bool },

    /// Raise the manual speed level by one.
    SpeedUp,

    /// Lower the manual speed level by one.
    SpeedDown,

    /// Set the steering angle.
    ///
    /// Units: radians, negative angles steer to the right.
    Steer { rad: f64 },

    /// Drive forward at the current speed level.
    MoveFront,

    /// Drive backward at the current speed level.
    MoveBack,

    /// Bring the vehicle to the neutral (stopped) power level.
    Brake,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0} is expected to have the field \"{1}\" but it doesn't")]
    MissingField(String, &'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DriveTc {
    /// Parse a new TC from a JSON packet.
    ///
    /// The packet must contain a `"type"` string, plus the payload fields of
    /// that type: `"enable"` for `AUTO`, `"rad"` for `STEER`.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(TcParseError::InvalidJson(e)),
        };

        // Get the type of the TC
        let tc_type = match val["type"].as_str() {
            Some(s) => s.to_string(),
            None => {
                return Err(TcParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        // Build the TC, pulling payload fields out of the value as needed
        match tc_type.as_str() {
            "AUTO" => match val["enable"].as_bool() {
                Some(enable) => Ok(DriveTc::AutoMode { enable }),
                None => Err(TcParseError::MissingField(tc_type, "enable")),
            },
            "SPD_UP" => Ok(DriveTc::SpeedUp),
            "SPD_DN" => Ok(DriveTc::SpeedDown),
            "STEER" => match val["rad"].as_f64() {
                Some(rad) => Ok(DriveTc::Steer { rad }),
                None => Err(TcParseError::MissingField(tc_type, "rad")),
            },
            "FWD" => Ok(DriveTc::MoveFront),
            "BACK" => Ok(DriveTc::MoveBack),
            "BRK" => Ok(DriveTc::Brake),
            _ => Err(TcParseError::InvalidType(format!(
                "{} is not a recognised TC type",
                tc_type
            ))),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

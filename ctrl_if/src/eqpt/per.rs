//! # Perception Equipment Module
//!
//! Contracts for the two perception stages consumed by the autonomous driver:
//! lane keeping (steering angle prediction) and traffic signal detection
//! (go/no-go decision). The internals of either stage are not the driving
//! exec's concern.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

use super::cam::CamFrame;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised by a perception stage.
#[derive(Debug, Error)]
pub enum PerError {
    #[error("Lane keeping could not process the frame: {0}")]
    LaneKeepingFailed(String),

    #[error("Traffic signal detection could not process the frame: {0}")]
    SignalDetectionFailed(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Lane keeping perception contract.
pub trait LaneKeeping {
    /// Predict the steering angle for the given frame.
    ///
    /// Units: radians. Negative angles steer to the right, zero is straight
    /// ahead. The magnitude is bounded by the sharpest turn the vehicle can
    /// make (`min_radian` in the drive control parameters).
    fn predict_angle(&mut self, frame: &CamFrame) -> Result<f64, PerError>;

    /// Estimated average processing time for a frame of the given size.
    ///
    /// Units: seconds. Informational only, logged once at driver startup.
    fn avg_processing_time_s(&self, height: u32, width: u32) -> f64;
}

/// Traffic signal perception contract.
pub trait TrafficSignal {
    /// Whether the vehicle may proceed given the signals visible in the frame.
    ///
    /// `threshold` is the detection confidence below which signals are
    /// ignored.
    fn can_go_forward(&mut self, frame: &CamFrame, threshold: f64) -> Result<bool, PerError>;

    /// Estimated average processing time for a frame of the given size.
    ///
    /// Units: seconds. Informational only, logged once at driver startup.
    fn avg_processing_time_s(&self, height: u32, width: u32) -> f64;
}

//! # Camera Equipment Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use image::RgbImage;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An individual frame from the front camera.
///
/// Frames move through exactly one sense-plan-act cycle (capture, calibration,
/// perception) and are never retained across cycles.
#[derive(Debug, Clone)]
pub struct CamFrame {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: RgbImage,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised by a camera.
#[derive(Debug, Error)]
pub enum CamError {
    #[error("Could not acquire a frame from the camera: {0}")]
    CaptureFailed(String),

    #[error("Could not calibrate the frame: {0}")]
    CalibrationFailed(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Front camera contract required by the driving exec.
///
/// Both operations are synchronous and are expected to complete well within
/// one drive cycle's latency budget.
pub trait Camera {
    /// Capture a single frame.
    fn capture_frame(&mut self) -> Result<CamFrame, CamError>;

    /// Apply lens calibration to a captured frame.
    fn calibrate(&self, frame: CamFrame) -> Result<CamFrame, CamError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamFrame {
    /// Build a frame from an image, timestamping it with the current time.
    pub fn from_image(image: RgbImage) -> Self {
        CamFrame {
            timestamp: Utc::now(),
            image,
        }
    }

    /// Height of the frame in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width of the frame in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }
}

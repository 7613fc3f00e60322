//! # Simulated equipment stack
//!
//! Stand-ins for the camera, both perception stages and the car control
//! gateway, letting the exec run end-to-end with no vehicle hardware
//! attached. The simulated camera produces Perlin-noise frames that drift
//! over time, lane keeping derives a steering angle from frame brightness,
//! and the traffic signal periodically orders a stop, so a simulated drive
//! exercises every branch of the autonomous cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use image::{Rgb, RgbImage};
use log::debug;
use noise::{NoiseFn, Perlin};

// Internal
use ctrl_if::eqpt::{
    cam::{CamError, CamFrame, Camera},
    car::{CarCtrl, CarCtrlError},
    per::{LaneKeeping, PerError, TrafficSignal},
};
use util::maths;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Spatial scale of the simulated camera's noise field, in pixels per feature.
const NOISE_SCALE_PX: f64 = 32.0;

/// How far the noise field drifts between consecutive frames.
const NOISE_DRIFT_PER_FRAME: f64 = 0.05;

/// Assumed per-pixel cost of the simulated lane keeping stage.
///
/// Units: seconds/pixel
const LANE_KEEPING_COST_S_PER_PX: f64 = 25e-9;

/// Assumed per-pixel cost of the simulated traffic signal stage.
///
/// Units: seconds/pixel
const SIGNAL_COST_S_PER_PX: f64 = 80e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated front camera producing drifting Perlin-noise frames.
pub struct SimCam {
    perlin: Perlin,
    height: u32,
    width: u32,
    num_frames: u64,
}

/// Simulated lane keeping: frame brightness stands in for the detector.
pub struct SimLaneKeeping {
    /// Steering angle of the sharpest turn, the lower output bound
    min_radian: f64,
}

/// Simulated traffic signal detection ordering a stop every `stop_every`th
/// query.
pub struct SimTrafficSignal {
    stop_every: u64,
    num_queries: u64,
}

/// Simulated car gateway: commands go to the debug log and nowhere else.
pub struct SimCar {
    num_cmds: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimCam {
    pub fn new(height: u32, width: u32) -> Self {
        SimCam {
            perlin: Perlin::new(),
            height,
            width,
            num_frames: 0,
        }
    }
}

impl Camera for SimCam {
    fn capture_frame(&mut self) -> Result<CamFrame, CamError> {
        let t = self.num_frames as f64 * NOISE_DRIFT_PER_FRAME;
        self.num_frames += 1;

        let perlin = &self.perlin;
        let image = RgbImage::from_fn(self.width, self.height, |x, y| {
            let v = perlin.get([
                x as f64 / NOISE_SCALE_PX,
                y as f64 / NOISE_SCALE_PX,
                t,
            ]);

            // Noise is in [-1, 1], pixels in [0, 255]
            let px = ((v + 1.0) * 127.5) as u8;
            Rgb([px, px, px])
        });

        Ok(CamFrame::from_image(image))
    }

    fn calibrate(&self, frame: CamFrame) -> Result<CamFrame, CamError> {
        // The simulated lens is ideal
        Ok(frame)
    }
}

impl SimLaneKeeping {
    pub fn new(min_radian: f64) -> Self {
        SimLaneKeeping { min_radian }
    }
}

impl LaneKeeping for SimLaneKeeping {
    fn predict_angle(&mut self, frame: &CamFrame) -> Result<f64, PerError> {
        let num_px = frame.width() as u64 * frame.height() as u64;
        if num_px == 0 {
            return Err(PerError::LaneKeepingFailed(String::from(
                "frame has no pixels",
            )));
        }

        // Mean brightness in [0, 1] stands in for the lane detector output
        let sum: u64 = frame.image.pixels().map(|p| p.0[0] as u64).sum();
        let mean = sum as f64 / num_px as f64 / 255.0;

        let angle = maths::lin_map((0.0, 1.0), (self.min_radian, 0.0), mean);

        Ok(maths::clamp(&angle, &self.min_radian, &0.0))
    }

    fn avg_processing_time_s(&self, height: u32, width: u32) -> f64 {
        height as f64 * width as f64 * LANE_KEEPING_COST_S_PER_PX
    }
}

impl SimTrafficSignal {
    /// A detector ordering a stop on every `stop_every`th query. Zero means
    /// the signal is always green.
    pub fn new(stop_every: u64) -> Self {
        SimTrafficSignal {
            stop_every,
            num_queries: 0,
        }
    }
}

impl TrafficSignal for SimTrafficSignal {
    fn can_go_forward(&mut self, _frame: &CamFrame, _threshold: f64) -> Result<bool, PerError> {
        self.num_queries += 1;

        Ok(self.stop_every == 0 || self.num_queries % self.stop_every != 0)
    }

    fn avg_processing_time_s(&self, height: u32, width: u32) -> f64 {
        height as f64 * width as f64 * SIGNAL_COST_S_PER_PX
    }
}

impl SimCar {
    pub fn new() -> Self {
        SimCar { num_cmds: 0 }
    }
}

impl Default for SimCar {
    fn default() -> Self {
        Self::new()
    }
}

impl CarCtrl for SimCar {
    fn steer_wheel(&mut self, rad: f64) -> Result<(), CarCtrlError> {
        self.num_cmds += 1;
        debug!("SimCar cmd {}: steer_wheel({:.4} rad)", self.num_cmds, rad);
        Ok(())
    }

    fn move_front(&mut self, pwm: f64) -> Result<(), CarCtrlError> {
        self.num_cmds += 1;
        debug!("SimCar cmd {}: move_front({:.2})", self.num_cmds, pwm);
        Ok(())
    }

    fn move_back(&mut self, pwm: f64) -> Result<(), CarCtrlError> {
        self.num_cmds += 1;
        debug!("SimCar cmd {}: move_back({:.2})", self.num_cmds, pwm);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

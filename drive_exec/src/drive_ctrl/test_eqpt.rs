//! Fake equipment shared by the driving control tests
//!
//! The recording car keeps every command (and every attempt, for fault
//! injection runs) behind shared handles so tests can observe exactly what
//! reached the hardware boundary and in what order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::RgbImage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// Internal
use super::AutoEqpt;
use ctrl_if::eqpt::{
    cam::{CamError, CamFrame, Camera},
    car::{CarCmd, CarCtrl, CarCtrlError},
    per::{LaneKeeping, PerError, TrafficSignal},
};

// ---------------------------------------------------------------------------
// COMMAND LOG
// ---------------------------------------------------------------------------

/// Shared, ordered record of commands issued to the recording car.
#[derive(Clone, Default)]
pub(crate) struct CmdLog {
    cmds: Arc<Mutex<Vec<CarCmd>>>,
    attempts: Arc<AtomicU64>,
}

impl CmdLog {
    /// Drain and return all recorded commands.
    pub(crate) fn take(&self) -> Vec<CarCmd> {
        self.cmds.lock().unwrap().drain(..).collect()
    }

    /// Return a copy of the recorded commands, leaving the log intact.
    pub(crate) fn snapshot(&self) -> Vec<CarCmd> {
        self.cmds.lock().unwrap().clone()
    }

    /// Number of commands attempted, including ones that were failed.
    pub(crate) fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    fn record(&self, cmd: CarCmd, fail: bool) -> Result<(), CarCtrlError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);

        if fail {
            Err(CarCtrlError::NotResponding(String::from("injected fault")))
        } else {
            self.cmds.lock().unwrap().push(cmd);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// FAKE CAR
// ---------------------------------------------------------------------------

/// A car gateway that records commands instead of moving anything.
pub(crate) struct RecordingCar {
    log: CmdLog,
    fail: bool,
}

impl RecordingCar {
    pub(crate) fn new(log: CmdLog) -> Self {
        RecordingCar { log, fail: false }
    }

    /// A car that rejects every command, still counting the attempts.
    pub(crate) fn failing(log: CmdLog) -> Self {
        RecordingCar { log, fail: true }
    }
}

impl CarCtrl for RecordingCar {
    fn steer_wheel(&mut self, rad: f64) -> Result<(), CarCtrlError> {
        self.log.record(CarCmd::Steer { rad }, self.fail)
    }

    fn move_front(&mut self, pwm: f64) -> Result<(), CarCtrlError> {
        self.log.record(CarCmd::MoveFront { pwm }, self.fail)
    }

    fn move_back(&mut self, pwm: f64) -> Result<(), CarCtrlError> {
        self.log.record(CarCmd::MoveBack { pwm }, self.fail)
    }
}

// ---------------------------------------------------------------------------
// FAKE PERCEPTION STACK
// ---------------------------------------------------------------------------

/// Behaviour knobs for the fake equipment stack.
#[derive(Clone, Copy)]
pub(crate) struct FakeEqptConfig {
    /// Steering angle every lane keeping prediction returns
    pub angle: f64,

    /// Go/no-go decision every signal query returns
    pub go: bool,

    pub cam_fails: bool,
    pub lane_keeping_fails: bool,
    pub signal_fails: bool,
}

impl Default for FakeEqptConfig {
    fn default() -> Self {
        FakeEqptConfig {
            angle: -0.1,
            go: true,
            cam_fails: false,
            lane_keeping_fails: false,
            signal_fails: false,
        }
    }
}

/// Build a boxed fake equipment stack with the given behaviour.
pub(crate) fn fake_eqpt(config: FakeEqptConfig) -> AutoEqpt {
    AutoEqpt {
        cam: Box::new(FakeCam {
            fail: config.cam_fails,
        }),
        lane_keeping: Box::new(FakeLaneKeeping {
            angle: config.angle,
            fail: config.lane_keeping_fails,
        }),
        traffic_signal: Box::new(FakeSignal {
            go: config.go,
            fail: config.signal_fails,
        }),
    }
}

struct FakeCam {
    fail: bool,
}

impl Camera for FakeCam {
    fn capture_frame(&mut self) -> Result<CamFrame, CamError> {
        if self.fail {
            Err(CamError::CaptureFailed(String::from("injected fault")))
        } else {
            Ok(CamFrame::from_image(RgbImage::new(8, 6)))
        }
    }

    fn calibrate(&self, frame: CamFrame) -> Result<CamFrame, CamError> {
        Ok(frame)
    }
}

struct FakeLaneKeeping {
    angle: f64,
    fail: bool,
}

impl LaneKeeping for FakeLaneKeeping {
    fn predict_angle(&mut self, _frame: &CamFrame) -> Result<f64, PerError> {
        if self.fail {
            Err(PerError::LaneKeepingFailed(String::from("injected fault")))
        } else {
            Ok(self.angle)
        }
    }

    fn avg_processing_time_s(&self, _height: u32, _width: u32) -> f64 {
        0.0
    }
}

struct FakeSignal {
    go: bool,
    fail: bool,
}

impl TrafficSignal for FakeSignal {
    fn can_go_forward(&mut self, _frame: &CamFrame, _threshold: f64) -> Result<bool, PerError> {
        if self.fail {
            Err(PerError::SignalDetectionFailed(String::from(
                "injected fault",
            )))
        } else {
            Ok(self.go)
        }
    }

    fn avg_processing_time_s(&self, _height: u32, _width: u32) -> f64 {
        0.0
    }
}

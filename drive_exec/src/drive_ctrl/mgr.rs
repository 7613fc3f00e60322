//! Drive manager - the driving authority arbiter
//!
//! The manager owns the public control surface of the driving software. It
//! decides which source holds driving authority, relays manual commands to
//! the car while manual authority holds, and runs the explicit lifecycle of
//! the autonomous driver thread.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

// Internal
use super::{AutoDriver, DriveCtrlError, DriveCtx, Params};
use ctrl_if::eqpt::{
    cam::Camera,
    car::{CarCtrl, CarCtrlError},
    per::{LaneKeeping, TrafficSignal},
};
use ctrl_if::manual::ManualCtrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The equipment stack required by the autonomous driver.
pub struct AutoEqpt {
    pub cam: Box<dyn Camera + Send>,
    pub lane_keeping: Box<dyn LaneKeeping + Send>,
    pub traffic_signal: Box<dyn TrafficSignal + Send>,
}

/// Driving authority arbiter and manual command surface.
///
/// One instance exists per vehicle. The manager and the autonomous driver
/// share a [`DriveCtx`]; the manager is the only writer of the authority,
/// run and speed flags.
pub struct DriveMgr {
    params: Params,

    ctx: Arc<DriveCtx>,

    /// Handle of the autonomous driver thread, populated by `start`
    driver_handle: Option<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveMgr {
    /// Create a new drive manager around the given car gateway.
    ///
    /// The vehicle starts under manual authority. The autonomous driver is
    /// not running until [`DriveMgr::start`] is called.
    pub fn new(params: Params, car: Box<dyn CarCtrl + Send>) -> Result<Self, DriveCtrlError> {
        params.are_valid().map_err(DriveCtrlError::InvalidParams)?;

        // Initial speed is clamped like every other speed mutation
        let initial_speed = params
            .initial_speed
            .max(params.min_speed)
            .min(params.max_speed);

        Ok(DriveMgr {
            ctx: Arc::new(DriveCtx::new(car, initial_speed)),
            params,
            driver_handle: None,
        })
    }

    /// Start the autonomous driver thread.
    ///
    /// The driver idles until autonomous authority is granted via
    /// [`ManualCtrl::set_auto_mode`]. Starting twice is an error.
    pub fn start(&mut self, eqpt: AutoEqpt) -> Result<(), DriveCtrlError> {
        if self.driver_handle.is_some() {
            return Err(DriveCtrlError::DriverAlreadyStarted);
        }

        let driver = AutoDriver::new(Arc::clone(&self.ctx), self.params.clone(), eqpt);

        self.driver_handle = Some(thread::spawn(move || driver.run()));

        info!("Autonomous driver started");

        Ok(())
    }

    /// Shut the autonomous driver down, joining its thread.
    ///
    /// The run flag is cleared exactly once and never reset; after this
    /// returns no further command can be issued by the autonomous driver.
    /// Safe to call without a preceding `start`.
    pub fn shutdown(&mut self) {
        self.ctx.request_stop();

        if let Some(handle) = self.driver_handle.take() {
            match handle.join() {
                Ok(()) => info!("Autonomous driver stopped"),
                Err(_) => error!("Autonomous driver thread panicked before shutdown"),
            }
        }
    }

    /// Current manual speed level.
    pub fn speed(&self) -> u8 {
        self.ctx.speed()
    }

    /// The shared driving context.
    pub fn ctx(&self) -> &Arc<DriveCtx> {
        &self.ctx
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.params.settle_delay_s)
    }
}

impl ManualCtrl for DriveMgr {
    fn set_auto_mode(&self, enable: bool) -> Result<(), CarCtrlError> {
        info!("Auto driving mode: {}", enable);

        // Flip authority first so the other source stops issuing commands,
        // then give the driver one settle delay to observe the flag before
        // bridging. The dance runs on every call, including same-mode
        // re-calls.
        self.ctx.set_autonomous(enable);

        thread::sleep(self.settle_delay());

        let mut car = self.ctx.car();

        if enable {
            // Creep forward so the car is moving when the driver takes over
            car.move_front(self.params.min_front_pwm + self.ctx.speed() as f64)
        } else {
            // Neutral, leaving the car stopped under manual authority
            car.move_front(self.params.mid_pwm)
        }
    }

    fn speed_up(&self) -> u8 {
        if self.ctx.autonomous() {
            return self.ctx.speed();
        }

        let speed = self.ctx.speed().saturating_add(1).min(self.params.max_speed);
        self.ctx.set_speed(speed);

        info!("Speed level up: {}", speed);

        speed
    }

    fn speed_down(&self) -> u8 {
        if self.ctx.autonomous() {
            return self.ctx.speed();
        }

        let speed = self.ctx.speed().saturating_sub(1).max(self.params.min_speed);
        self.ctx.set_speed(speed);

        info!("Speed level down: {}", speed);

        speed
    }

    fn steer(&self, rad: f64) -> Result<(), CarCtrlError> {
        if self.ctx.autonomous() {
            return Ok(());
        }

        self.ctx.car().steer_wheel(rad)
    }

    fn move_front(&self) -> Result<(), CarCtrlError> {
        if self.ctx.autonomous() {
            return Ok(());
        }

        self.ctx
            .car()
            .move_front(self.params.min_front_pwm + self.ctx.speed() as f64)
    }

    fn move_back(&self) -> Result<(), CarCtrlError> {
        if self.ctx.autonomous() {
            return Ok(());
        }

        self.ctx
            .car()
            .move_back(self.params.max_back_pwm - self.ctx.speed() as f64)
    }

    fn brake(&self) -> Result<(), CarCtrlError> {
        if self.ctx.autonomous() {
            return Ok(());
        }

        self.ctx.car().move_front(self.params.mid_pwm)
    }
}

impl Drop for DriveMgr {
    fn drop(&mut self) {
        // The host is expected to call shutdown itself; this is a backstop so
        // a dropped manager cannot leave the driver thread spinning.
        if self.driver_handle.is_some() {
            warn!("Drive manager dropped without shutdown, stopping the driver now");
            self.shutdown();
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::test_eqpt::*;
    use super::*;
    use ctrl_if::eqpt::car::CarCmd;

    /// Params with no settle delay so tests don't wait on handoffs.
    fn test_params() -> Params {
        Params {
            settle_delay_s: 0.0,
            idle_period_s: 0.005,
            ..Params::default()
        }
    }

    fn test_mgr() -> (DriveMgr, CmdLog) {
        let log = CmdLog::default();
        let car = RecordingCar::new(log.clone());
        let mgr = DriveMgr::new(test_params(), Box::new(car)).unwrap();
        (mgr, log)
    }

    #[test]
    fn test_speed_clamps_at_bounds() {
        let (mgr, _log) = test_mgr();

        assert_eq!(mgr.speed(), 1);

        // Push well past the upper bound
        for _ in 0..15 {
            mgr.speed_up();
        }
        assert_eq!(mgr.speed(), 10);

        // A further speed up at the bound leaves the level unchanged
        assert_eq!(mgr.speed_up(), 10);

        // And well past the lower bound
        for _ in 0..15 {
            mgr.speed_down();
        }
        assert_eq!(mgr.speed(), 0);
        assert_eq!(mgr.speed_down(), 0);
    }

    #[test]
    fn test_manual_commands_reach_the_car() {
        let (mgr, log) = test_mgr();

        // Speed level 1 at startup
        mgr.move_front().unwrap();
        mgr.move_back().unwrap();
        mgr.steer(-0.2).unwrap();
        mgr.brake().unwrap();

        assert_eq!(
            log.take(),
            vec![
                CarCmd::MoveFront { pwm: 327.0 },
                CarCmd::MoveBack { pwm: 288.0 },
                CarCmd::Steer { rad: -0.2 },
                CarCmd::MoveFront { pwm: 307.0 },
            ]
        );
    }

    #[test]
    fn test_manual_commands_suppressed_under_autonomous_authority() {
        let (mgr, log) = test_mgr();

        mgr.set_auto_mode(true).unwrap();
        log.take(); // discard the bridging creep command

        // Every manual entry point must be a no-op, not an error
        mgr.move_front().unwrap();
        mgr.move_back().unwrap();
        mgr.steer(0.1).unwrap();
        mgr.brake().unwrap();
        assert_eq!(mgr.speed_up(), 1);
        assert_eq!(mgr.speed_down(), 1);

        assert!(log.take().is_empty());
        assert_eq!(mgr.speed(), 1);
    }

    #[test]
    fn test_handoff_issues_bridging_commands() {
        let (mgr, log) = test_mgr();

        mgr.set_auto_mode(true).unwrap();
        mgr.set_auto_mode(false).unwrap();

        // Creep forward on grant, neutral on revoke
        assert_eq!(
            log.take(),
            vec![
                CarCmd::MoveFront { pwm: 327.0 },
                CarCmd::MoveFront { pwm: 307.0 },
            ]
        );

        // Manual authority is restored
        mgr.move_front().unwrap();
        assert_eq!(log.take(), vec![CarCmd::MoveFront { pwm: 327.0 }]);
    }

    #[test]
    fn test_same_mode_recall_repeats_the_handoff() {
        let (mgr, log) = test_mgr();

        mgr.set_auto_mode(false).unwrap();
        mgr.set_auto_mode(false).unwrap();

        assert_eq!(
            log.take(),
            vec![
                CarCmd::MoveFront { pwm: 307.0 },
                CarCmd::MoveFront { pwm: 307.0 },
            ]
        );
    }

    #[test]
    fn test_actuator_errors_are_surfaced_not_swallowed() {
        let log = CmdLog::default();
        let car = RecordingCar::failing(log.clone());
        let mgr = DriveMgr::new(test_params(), Box::new(car)).unwrap();

        assert!(mgr.move_front().is_err());
        assert!(mgr.set_auto_mode(false).is_err());

        // The lock must have been released on the error paths
        let _guard = mgr.ctx().car();
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let (mut mgr, _log) = test_mgr();

        mgr.start(fake_eqpt(FakeEqptConfig::default())).unwrap();
        assert!(matches!(
            mgr.start(fake_eqpt(FakeEqptConfig::default())),
            Err(DriveCtrlError::DriverAlreadyStarted)
        ));

        mgr.shutdown();
    }

    #[test]
    fn test_invalid_params_rejected_at_construction() {
        let log = CmdLog::default();
        let params = Params {
            eps: 0.0,
            ..Params::default()
        };
        assert!(matches!(
            DriveMgr::new(params, Box::new(RecordingCar::new(log))),
            Err(DriveCtrlError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_initial_speed_is_clamped() {
        let log = CmdLog::default();
        let params = Params {
            initial_speed: 200,
            ..test_params()
        };
        let mgr = DriveMgr::new(params, Box::new(RecordingCar::new(log))).unwrap();
        assert_eq!(mgr.speed(), 10);
    }
}

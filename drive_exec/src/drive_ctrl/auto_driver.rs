//! Autonomous driver - the background sense-plan-act loop
//!
//! The driver is one long-lived thread. While it does not hold driving
//! authority it idles, re-checking the authority flag every idle period and
//! never touching the car. While it holds authority it repeats one cycle per
//! iteration, entirely under the shared actuation lock:
//!
//! 1. Capture a frame and calibrate it
//! 2. Predict the steering angle (lane keeping)
//! 3. Map turn sharpness inversely onto the available forward power
//! 4. Ask traffic signal perception for a go/no-go decision
//! 5. Steer then throttle on go, hold the neutral level on no-go
//!
//! No error escapes an iteration: perception failures fail safe to the
//! neutral command, actuator failures are reported and the loop carries on.
//! Only the run flag, checked at the top of each iteration and never inside
//! the critical section, stops the thread.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Internal
use super::{AutoEqpt, DriveCtx, Params};
use ctrl_if::eqpt::{
    cam::{CamError, Camera},
    per::{LaneKeeping, PerError, TrafficSignal},
};
use util::maths;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The autonomous driver state, owned by its thread after spawn.
pub(crate) struct AutoDriver {
    ctx: Arc<DriveCtx>,

    params: Params,

    cam: Box<dyn Camera + Send>,
    lane_keeping: Box<dyn LaneKeeping + Send>,
    traffic_signal: Box<dyn TrafficSignal + Send>,
}

/// What one cycle's perception stages concluded.
struct Percept {
    /// Predicted steering angle in radians
    steering_rad: f64,

    /// Whether traffic signal perception allows proceeding
    go: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A failure in the sense half of a cycle. Any variant fails the cycle safe.
#[derive(Debug, thiserror::Error)]
enum PerceptError {
    #[error("Camera error: {0}")]
    Cam(#[from] CamError),

    #[error("Perception error: {0}")]
    Per(#[from] PerError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AutoDriver {
    pub(crate) fn new(ctx: Arc<DriveCtx>, params: Params, eqpt: AutoEqpt) -> Self {
        AutoDriver {
            ctx,
            params,
            cam: eqpt.cam,
            lane_keeping: eqpt.lane_keeping,
            traffic_signal: eqpt.traffic_signal,
        }
    }

    /// Thread main function. Returns only once the run flag is cleared.
    pub(crate) fn run(mut self) {
        self.startup_diagnostics();

        let idle_period = Duration::from_secs_f64(self.params.idle_period_s);

        while self.ctx.running() {
            // Authority is re-evaluated here, between cycles, so a cycle in
            // flight always completes before a handoff takes effect
            if self.ctx.autonomous() {
                self.cycle();
            } else {
                thread::sleep(idle_period);
            }
        }

        debug!("Autonomous driver run flag cleared, exiting");
    }

    /// Log frame sizing and estimated perception cost, once, before the loop.
    ///
    /// Purely informational: a failure here is reported and does not gate the
    /// loop in any way.
    fn startup_diagnostics(&mut self) {
        match self.cam.capture_frame() {
            Ok(frame) => {
                let (height, width) = (frame.height(), frame.width());

                info!("Front camera frame size: height={}, width={}", height, width);
                info!(
                    "Avg processing time of lane keeping: {:.6} s",
                    self.lane_keeping.avg_processing_time_s(height, width)
                );
                info!(
                    "Avg processing time of traffic signal detection: {:.6} s",
                    self.traffic_signal.avg_processing_time_s(height, width)
                );
            }
            Err(e) => warn!("Could not capture the diagnostic frame: {}", e),
        }
    }

    /// Execute one sense-plan-act cycle under the actuation lock.
    fn cycle(&mut self) {
        // Guard taken through a clone of the handle so perception below can
        // borrow self mutably while the lock is held
        let ctx = Arc::clone(&self.ctx);
        let mut car = ctx.car();

        let act_result = match self.perceive() {
            Ok(Percept {
                steering_rad,
                go: true,
            }) => {
                let pwm = self.params.min_front_pwm + self.adjusted_power(steering_rad);

                // Turn before throttle, always in this order
                car.steer_wheel(steering_rad)
                    .and_then(|_| car.move_front(pwm))
            }

            // Signal says stop: hold the neutral level, no steering change
            Ok(Percept { go: false, .. }) => car.move_front(self.params.mid_pwm),

            Err(e) => {
                warn!("Perception failed, issuing the neutral command: {}", e);
                car.move_front(self.params.mid_pwm)
            }
        };

        // Actuator faults are transient, report and carry on
        if let Err(e) = act_result {
            warn!("Car rejected the autonomous command: {}", e);
        }
    }

    /// Run the sense half of a cycle: capture, calibrate, both perception
    /// stages. The frame lives exactly as long as this call.
    fn perceive(&mut self) -> Result<Percept, PerceptError> {
        let frame = self.cam.capture_frame()?;
        let frame = self.cam.calibrate(frame)?;

        let steering_rad = self.lane_keeping.predict_angle(&frame)?;
        let go = self
            .traffic_signal
            .can_go_forward(&frame, self.params.can_go_threshold)?;

        Ok(Percept { steering_rad, go })
    }

    /// Map turn sharpness inversely onto the available forward power.
    ///
    /// A straight prediction yields the full current speed level, the
    /// sharpest possible turn yields zero. `eps` keeps the target range
    /// non-degenerate at speed level zero.
    fn adjusted_power(&self, steering_rad: f64) -> f64 {
        let speed = self.ctx.speed() as f64;

        maths::lin_map(
            (self.params.min_radian, 0.0),
            (0.0, speed + self.params.eps),
            -steering_rad.abs(),
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::test_eqpt::*;
    use super::super::{DriveMgr, Params};
    use ctrl_if::eqpt::car::CarCmd;
    use ctrl_if::manual::ManualCtrl;
    use std::thread;
    use std::time::Duration;

    /// Fast timing so tests spend milliseconds, not seconds.
    fn test_params() -> Params {
        Params {
            settle_delay_s: 0.0,
            idle_period_s: 0.002,
            ..Params::default()
        }
    }

    fn running_mgr(config: FakeEqptConfig) -> (DriveMgr, CmdLog) {
        let log = CmdLog::default();
        let car = RecordingCar::new(log.clone());
        let mut mgr = DriveMgr::new(test_params(), Box::new(car)).unwrap();
        mgr.start(fake_eqpt(config)).unwrap();
        (mgr, log)
    }

    /// Sleep long enough for the driver to run at least a handful of cycles.
    fn let_driver_cycle() {
        thread::sleep(Duration::from_millis(30));
    }

    #[test]
    fn test_idle_driver_never_touches_the_car() {
        let (mut mgr, log) = running_mgr(FakeEqptConfig::default());

        // Authority stays manual the whole time
        let_driver_cycle();
        mgr.shutdown();

        assert!(log.take().is_empty());
    }

    #[test]
    fn test_autonomous_cycles_steer_then_throttle() {
        let config = FakeEqptConfig {
            angle: -0.1,
            ..FakeEqptConfig::default()
        };
        let (mut mgr, log) = running_mgr(config);

        mgr.set_auto_mode(true).unwrap();
        let_driver_cycle();
        mgr.shutdown();

        let cmds = log.take();

        // At least one full cycle ran
        let first_steer = cmds
            .iter()
            .position(|c| matches!(c, CarCmd::Steer { .. }))
            .expect("no autonomous cycle was recorded");

        // Every steer is immediately followed by a forward throttle
        for (i, cmd) in cmds.iter().enumerate() {
            if let CarCmd::Steer { rad } = cmd {
                assert_eq!(*rad, -0.1);
                assert!(matches!(cmds.get(i + 1), Some(CarCmd::MoveFront { .. })));
            }
        }
        assert!(first_steer < cmds.len());
    }

    #[test]
    fn test_sharpest_turn_gets_zero_adjusted_power() {
        // The sharpest possible turn maps to exactly zero extra power
        let config = FakeEqptConfig {
            angle: -0.3491,
            ..FakeEqptConfig::default()
        };
        let (mut mgr, log) = running_mgr(config);

        // Speed level 5 while still under manual authority
        for _ in 0..4 {
            mgr.speed_up();
        }
        assert_eq!(mgr.speed(), 5);

        mgr.set_auto_mode(true).unwrap();
        let_driver_cycle();
        mgr.shutdown();

        let throttle_after_steer: Vec<f64> = {
            let cmds = log.take();
            cmds.iter()
                .enumerate()
                .filter(|(_, c)| matches!(c, CarCmd::Steer { .. }))
                .filter_map(|(i, _)| match cmds.get(i + 1) {
                    Some(CarCmd::MoveFront { pwm }) => Some(*pwm),
                    _ => None,
                })
                .collect()
        };

        assert!(!throttle_after_steer.is_empty());
        for pwm in throttle_after_steer {
            assert_eq!(pwm, 326.0);
        }
    }

    #[test]
    fn test_no_go_signal_issues_neutral_without_steering() {
        let config = FakeEqptConfig {
            go: false,
            ..FakeEqptConfig::default()
        };
        let (mut mgr, log) = running_mgr(config);

        mgr.set_auto_mode(true).unwrap();
        let_driver_cycle();
        mgr.shutdown();

        let cmds = log.take();

        // Skip the bridging creep command issued by the handoff itself
        let cycle_cmds: Vec<_> = cmds
            .into_iter()
            .filter(|c| *c != CarCmd::MoveFront { pwm: 327.0 })
            .collect();

        assert!(!cycle_cmds.is_empty());
        for cmd in cycle_cmds {
            assert_eq!(cmd, CarCmd::MoveFront { pwm: 307.0 });
        }
    }

    #[test]
    fn test_perception_failure_fails_safe() {
        let config = FakeEqptConfig {
            lane_keeping_fails: true,
            ..FakeEqptConfig::default()
        };
        let (mut mgr, log) = running_mgr(config);

        mgr.set_auto_mode(true).unwrap();
        let_driver_cycle();
        mgr.shutdown();

        let cmds = log.take();

        // Never a steer+throttle pair from a failed perception, only the
        // neutral command (plus the handoff's creep)
        assert!(cmds.iter().any(|c| *c == CarCmd::MoveFront { pwm: 307.0 }));
        assert!(!cmds.iter().any(|c| matches!(c, CarCmd::Steer { .. })));
    }

    #[test]
    fn test_signal_failure_fails_safe() {
        let config = FakeEqptConfig {
            signal_fails: true,
            ..FakeEqptConfig::default()
        };
        let (mut mgr, log) = running_mgr(config);

        mgr.set_auto_mode(true).unwrap();
        let_driver_cycle();
        mgr.shutdown();

        // A failed go/no-go decision must never let the steer+throttle pair
        // through
        let cmds = log.take();
        assert!(cmds.iter().any(|c| *c == CarCmd::MoveFront { pwm: 307.0 }));
        assert!(!cmds.iter().any(|c| matches!(c, CarCmd::Steer { .. })));
    }

    #[test]
    fn test_capture_failure_fails_safe() {
        let config = FakeEqptConfig {
            cam_fails: true,
            ..FakeEqptConfig::default()
        };
        let (mut mgr, log) = running_mgr(config);

        mgr.set_auto_mode(true).unwrap();
        let_driver_cycle();
        mgr.shutdown();

        let cmds = log.take();
        assert!(cmds.iter().any(|c| *c == CarCmd::MoveFront { pwm: 307.0 }));
        assert!(!cmds.iter().any(|c| matches!(c, CarCmd::Steer { .. })));
    }

    #[test]
    fn test_shutdown_stops_the_driver_for_good() {
        let (mut mgr, log) = running_mgr(FakeEqptConfig::default());

        mgr.set_auto_mode(true).unwrap();
        let_driver_cycle();

        // Authority nominally remains autonomous through the shutdown
        mgr.shutdown();
        let after_shutdown = log.snapshot().len();

        let_driver_cycle();
        assert_eq!(log.snapshot().len(), after_shutdown);
    }

    #[test]
    fn test_actuator_failure_does_not_kill_the_loop() {
        let log = CmdLog::default();
        let car = RecordingCar::failing(log.clone());
        let mut mgr = DriveMgr::new(test_params(), Box::new(car)).unwrap();
        mgr.start(fake_eqpt(FakeEqptConfig::default())).unwrap();

        // The bridging command fails too; authority is still granted
        assert!(mgr.set_auto_mode(true).is_err());
        let_driver_cycle();

        // The loop kept attempting cycles despite every command failing
        assert!(log.attempts() > 1);

        mgr.shutdown();
    }
}

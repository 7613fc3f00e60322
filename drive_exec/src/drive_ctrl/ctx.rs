//! Shared driving context
//!
//! The context is the single explicit home of everything the two driving
//! authority sources share: the actuation lock around the car gateway, the
//! authority flag, the run flag and the speed level. One instance exists per
//! vehicle, owned behind an `Arc` by the [`super::DriveMgr`] and the
//! autonomous driver thread.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

// Internal
use ctrl_if::eqpt::car::CarCtrl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State shared between the drive manager and the autonomous driver.
///
/// The mutex around the car gateway is the shared actuation lock: any code
/// path issuing a car command holds the guard for the duration of that
/// issuance, and guard drop releases it on every exit path, including errors.
///
/// The flags are plain atomics with relaxed ordering. Each has a single
/// writer (the manager), readers tolerate staleness of up to one idle period,
/// and no other data is published through them.
pub struct DriveCtx {
    /// The car gateway, guarded by the shared actuation lock
    car: Mutex<Box<dyn CarCtrl + Send>>,

    /// True while the autonomous driver holds driving authority
    auto_authority: AtomicBool,

    /// Autonomous driver lifetime flag, cleared exactly once at shutdown
    run: AtomicBool,

    /// Current manual speed level
    speed: AtomicU8,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCtx {
    /// Create a new context around the given car gateway.
    ///
    /// The vehicle starts under manual authority at the given speed level.
    pub fn new(car: Box<dyn CarCtrl + Send>, initial_speed: u8) -> Self {
        DriveCtx {
            car: Mutex::new(car),
            auto_authority: AtomicBool::new(false),
            run: AtomicBool::new(true),
            speed: AtomicU8::new(initial_speed),
        }
    }

    /// Acquire the shared actuation lock, blocking until it is free.
    ///
    /// A poisoned lock is recovered rather than propagated: the guarded value
    /// is a write-only gateway, and continuing in a bounded state is
    /// preferred over halting a physical vehicle.
    pub fn car(&self) -> MutexGuard<'_, Box<dyn CarCtrl + Send>> {
        match self.car.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// True while the autonomous driver holds driving authority.
    pub fn autonomous(&self) -> bool {
        self.auto_authority.load(Ordering::Relaxed)
    }

    pub(crate) fn set_autonomous(&self, enable: bool) {
        self.auto_authority.store(enable, Ordering::Relaxed);
    }

    /// True until shutdown has been requested.
    pub fn running(&self) -> bool {
        self.run.load(Ordering::Relaxed)
    }

    pub(crate) fn request_stop(&self) {
        self.run.store(false, Ordering::Relaxed);
    }

    /// Current manual speed level.
    pub fn speed(&self) -> u8 {
        self.speed.load(Ordering::Relaxed)
    }

    pub(crate) fn set_speed(&self, speed: u8) {
        self.speed.store(speed, Ordering::Relaxed);
    }
}

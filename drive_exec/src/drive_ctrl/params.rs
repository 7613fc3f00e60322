//! Parameters structure for driving control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for driving control.
///
/// All fields have defaults matching the target vehicle, so a partial (or
/// absent) parameter file yields a usable set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- SPEED LEVELS ----
    /// Lowest manual speed level.
    pub min_speed: u8,

    /// Highest manual speed level.
    pub max_speed: u8,

    /// Speed level at startup.
    pub initial_speed: u8,

    // ---- PWM LEVELS ----
    /// PWM power level at which the car starts moving forward.
    pub min_front_pwm: f64,

    /// PWM power level at which the car starts moving backward. Backward
    /// levels run down from this value, so higher speed means a lower PWM.
    pub max_back_pwm: f64,

    /// Neutral PWM power level, at which the car holds still.
    pub mid_pwm: f64,

    // ---- STEERING ----
    /// Steering angle of the sharpest turn the vehicle can make.
    ///
    /// Units: radians. Negative by sign convention; lane keeping predictions
    /// are bounded by this magnitude.
    pub min_radian: f64,

    /// Tiny positive constant widening the speed mapping's target range, so
    /// the range is never degenerate at speed level zero.
    pub eps: f64,

    // ---- TIMING ----
    /// Settle delay inserted during an authority handoff, giving the
    /// autonomous driver time to observe the new authority state.
    ///
    /// Units: seconds
    pub settle_delay_s: f64,

    /// Interval the autonomous driver sleeps between authority checks while
    /// it does not hold authority.
    ///
    /// Units: seconds
    pub idle_period_s: f64,

    // ---- PERCEPTION ----
    /// Detection confidence threshold passed to traffic signal perception.
    pub can_go_threshold: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Speed levels are inverted (min {0} > max {1})")]
    SpeedBoundsInverted(u8, u8),

    #[error("The sharpest turn angle must be negative, got {0}")]
    MinRadianNotNegative(f64),

    #[error("eps must be positive, got {0}")]
    EpsNotPositive(f64),

    #[error("Timing parameters must not be negative")]
    NegativeTiming,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if self.min_speed > self.max_speed {
            return Err(ParamsError::SpeedBoundsInverted(
                self.min_speed,
                self.max_speed,
            ));
        }

        if self.min_radian >= 0.0 {
            return Err(ParamsError::MinRadianNotNegative(self.min_radian));
        }

        if self.eps <= 0.0 {
            return Err(ParamsError::EpsNotPositive(self.eps));
        }

        if self.settle_delay_s < 0.0 || self.idle_period_s < 0.0 {
            return Err(ParamsError::NegativeTiming);
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Params {
            min_speed: 0,
            max_speed: 10,
            initial_speed: 1,
            min_front_pwm: 326.0,
            max_back_pwm: 289.0,
            mid_pwm: 307.0,
            min_radian: -0.3491,
            eps: 0.00001,
            settle_delay_s: 0.5,
            idle_period_s: 0.5,
            can_go_threshold: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

//! # Manual driving control surface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::eqpt::car::CarCtrlError;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The driving control surface exposed to the host application.
///
/// While autonomous authority is held every manual command method is a no-op
/// returning `Ok(())`: manual commands are suppressed by contract, not queued
/// and not errors. Actuator failures are propagated so the caller can report
/// them; the shared actuation lock is released on every path regardless.
pub trait ManualCtrl {
    /// Grant (`true`) or revoke (`false`) autonomous driving authority.
    ///
    /// Performs the full handoff: flips the authority flag, waits the settle
    /// delay for the autonomous driver to observe it, then issues the bridging
    /// command (creep forward on grant, neutral on revoke) so the actuator is
    /// never left half-commanded. The handoff runs on every call, including
    /// re-calls with the current mode.
    fn set_auto_mode(&self, enable: bool) -> Result<(), CarCtrlError>;

    /// Raise the manual speed level by one, saturating at the maximum.
    ///
    /// Returns the speed level after the command.
    fn speed_up(&self) -> u8;

    /// Lower the manual speed level by one, saturating at the minimum.
    ///
    /// Returns the speed level after the command.
    fn speed_down(&self) -> u8;

    /// Set the steering angle in radians.
    fn steer(&self, rad: f64) -> Result<(), CarCtrlError>;

    /// Drive forward at the current speed level.
    fn move_front(&self) -> Result<(), CarCtrlError>;

    /// Drive backward at the current speed level.
    fn move_back(&self) -> Result<(), CarCtrlError>;

    /// Bring the vehicle to the neutral power level.
    fn brake(&self) -> Result<(), CarCtrlError>;
}

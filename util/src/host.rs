//! Host platform (linux for example) utility functions

use std::env::VarError;
use std::path::PathBuf;

/// Environment variable pointing at the root of the software checkout.
pub const SW_ROOT_ENV_VAR: &str = "AUTO_DRIVE_SW_ROOT";

/// Retrieve the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}

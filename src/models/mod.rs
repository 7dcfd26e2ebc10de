pub mod dose_log;
pub mod enums;
pub mod medication;
pub mod profile;

pub use dose_log::*;
pub use enums::*;
pub use medication::*;
pub use profile::*;

use thiserror::Error;

/// Edit-boundary rejections. These never reach the engine: callers
/// validate before persisting or scheduling.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Medicine name must not be empty")]
    EmptyName,

    #[error("Units per dose must be greater than zero")]
    NonPositiveDose,

    #[error("Meal and sleep times must be strictly increasing (breakfast < lunch < dinner < sleep)")]
    AnchorsNotIncreasing,
}

pub mod dose_log;
pub mod medication;
pub mod profile;
pub mod snooze;
pub mod supply;

pub use dose_log::*;
pub use medication::*;
pub use profile::*;
pub use snooze::*;
pub use supply::*;

use std::path::PathBuf;

use chrono::FixedOffset;

/// Application-level constants
pub const APP_NAME: &str = "Remedy";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minutes before/after a meal anchor at which a meal reminder fires.
pub const MEAL_OFFSET_MIN: i64 = 30;

/// Minutes before the sleep anchor at which a sleep reminder fires.
pub const SLEEP_OFFSET_MIN: i64 = 30;

/// Hours after the sleep anchor at which the sleep dose window closes.
pub const SLEEP_WINDOW_HOURS: i64 = 6;

/// Fixed size of a medication's reminder identifier range. At most one
/// sleep occurrence plus three meal occurrences exist today; the extra
/// slot keeps cancellation safe if a mode is added later.
pub const MAX_OCCURRENCES: usize = 5;

/// Maximum number of snoozes per reminder occurrence.
pub const MAX_SNOOZE_COUNT: u32 = 2;

/// Length of one snooze, in minutes.
pub const SNOOZE_DURATION_MIN: i64 = 10;

/// Foreground tick interval driving the snooze and missed-dose sweeps.
pub const TICK_INTERVAL_SECS: u64 = 60;

/// All window-boundary and calendar-day comparisons run in this fixed
/// regional offset (UTC+7, no DST).
pub fn region_offset() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset")
}

/// Get the application data directory
/// ~/Remedy/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Remedy")
}

/// Path of the engine's SQLite database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("remedy.db")
}

pub fn default_log_filter() -> String {
    "info,remedy_core=debug".to_string()
}

//! Reminder scheduling & adherence tracking core.
//!
//! Pure pieces (times, identity, window) feed the scheduler; the
//! adherence tracker and snooze ledger work against the database. The
//! free functions below are the entry points for the app's driving
//! events: medication saved/deleted, profile saved, taken tapped.
//! All of them are safe to call repeatedly; idempotence rests on the
//! identifier scheme and the check-before-insert dedup, not on locking.

pub mod adherence;
pub mod identity;
pub mod notify;
pub mod scheduler;
pub mod snooze;
pub mod times;
pub mod window;

use chrono::{DateTime, FixedOffset};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::db::repository::{
    clear_supply_warnings, delete_medication, delete_snoozes_for_medication, get_all_medications,
    get_profile, save_profile as persist_profile, upsert_medication,
};
use crate::db::DatabaseError;
use crate::models::{MealWindow, Medication, ScheduleProfile, ValidationError};
use notify::NotifyError;
use scheduler::ReminderScheduler;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// "Medication added/edited": validate, persist, and (when a profile
/// exists) replace its reminders and re-check the supply projection.
pub fn save_medication(
    conn: &Connection,
    scheduler: &ReminderScheduler,
    medication: &Medication,
    now: DateTime<FixedOffset>,
) -> Result<(), EngineError> {
    medication.validate()?;
    upsert_medication(conn, medication)?;

    if let Some(profile) = get_profile(conn)? {
        let today = now.with_timezone(&config::region_offset()).date_naive();
        scheduler.install(medication, &profile, today)?;
        scheduler.maybe_schedule_low_supply_warning(conn, medication, now)?;
    }
    Ok(())
}

/// "Medication deleted": cancel the full identifier range first, then
/// drop the row and its snooze/warning state. Dose history stays.
pub fn remove_medication(
    conn: &Connection,
    scheduler: &ReminderScheduler,
    medication_id: Uuid,
) -> Result<(), EngineError> {
    scheduler.cancel_all(medication_id)?;
    delete_medication(conn, &medication_id)?;
    delete_snoozes_for_medication(conn, &medication_id)?;
    clear_supply_warnings(conn, &medication_id)?;
    Ok(())
}

/// "Profile saved": validate the anchors, persist, and reinstall every
/// medication's reminders, since all trigger times depend on them.
pub fn save_profile(
    conn: &Connection,
    scheduler: &ReminderScheduler,
    profile: &ScheduleProfile,
    now: DateTime<FixedOffset>,
) -> Result<(), EngineError> {
    profile.validate()?;
    persist_profile(conn, profile)?;

    let medications = get_all_medications(conn)?;
    let today = now.with_timezone(&config::region_offset()).date_naive();
    scheduler.reinstall_for_profile(profile, &medications, today)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakenOutcome {
    Recorded(MealWindow),
    /// A record for this window and day already exists.
    AlreadyRecorded(MealWindow),
    /// "Now" falls outside every dose window (or no profile is saved).
    NoActiveWindow,
}

/// "User tapped taken": resolve the active window and record the dose
/// in it.
pub fn record_taken_now(
    conn: &Connection,
    medication: &Medication,
    now: DateTime<FixedOffset>,
) -> Result<TakenOutcome, EngineError> {
    let Some(profile) = get_profile(conn)? else {
        return Ok(TakenOutcome::NoActiveWindow);
    };
    let Some(active) = window::active_window(&profile, now) else {
        return Ok(TakenOutcome::NoActiveWindow);
    };

    if adherence::record_taken(conn, medication, &profile, active, now)? {
        Ok(TakenOutcome::Recorded(active))
    } else {
        Ok(TakenOutcome::AlreadyRecorded(active))
    }
}

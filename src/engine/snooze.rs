//! Bounded snooze policy over the persisted ledger.
//!
//! The ledger itself (db::repository::snooze) only counts and expires.
//! Policy lives here: a reminder may be snoozed while its count is
//! under the cap, it is not already snoozed, and its trigger time has
//! arrived. The check runs before the ledger is touched.

use chrono::{DateTime, Duration, FixedOffset};
use rusqlite::Connection;

use super::scheduler::ReminderScheduler;
use super::EngineError;
use crate::config;
use crate::db::repository::{
    delete_expired_snoozes, get_snooze, set_snooze, SnoozeRecord,
};

/// True while `now` is before the reminder's snooze expiry.
pub fn is_snoozed(
    conn: &Connection,
    reminder_id: &str,
    now: DateTime<FixedOffset>,
) -> Result<bool, EngineError> {
    Ok(match get_snooze(conn, reminder_id)? {
        Some(record) => now < record.expires_at,
        None => false,
    })
}

/// Times this reminder has been snoozed; 0 when absent.
pub fn snooze_count(conn: &Connection, reminder_id: &str) -> Result<u32, EngineError> {
    Ok(get_snooze(conn, reminder_id)?.map_or(0, |r| r.count))
}

/// Increment the counter and push the expiry out.
pub fn record_snooze(
    conn: &Connection,
    reminder_id: &str,
    duration_minutes: i64,
    now: DateTime<FixedOffset>,
) -> Result<(), EngineError> {
    let count = snooze_count(conn, reminder_id)? + 1;
    set_snooze(
        conn,
        reminder_id,
        &SnoozeRecord {
            count,
            expires_at: now + Duration::minutes(duration_minutes),
        },
    )?;
    Ok(())
}

/// Drop expired entries. Driven by the foreground tick.
pub fn sweep_expired(conn: &Connection, now: DateTime<FixedOffset>) -> Result<usize, EngineError> {
    let dropped = delete_expired_snoozes(conn, now)?;
    if dropped > 0 {
        tracing::debug!(dropped, "Swept expired snoozes");
    }
    Ok(dropped)
}

/// Why a snooze request was refused, or that it went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeOutcome {
    Snoozed,
    /// The per-occurrence cap has been reached.
    LimitReached,
    /// A snooze for this reminder is still running.
    AlreadySnoozed,
    /// The reminder is not pending, or its trigger time has not arrived.
    NotDue,
}

/// Handle a user snooze tap: policy check, then ledger write, then
/// re-arm of the single reminder.
pub fn request_snooze(
    conn: &Connection,
    scheduler: &ReminderScheduler,
    reminder_id: &str,
    now: DateTime<FixedOffset>,
) -> Result<SnoozeOutcome, EngineError> {
    if snooze_count(conn, reminder_id)? >= config::MAX_SNOOZE_COUNT {
        return Ok(SnoozeOutcome::LimitReached);
    }
    if is_snoozed(conn, reminder_id, now)? {
        return Ok(SnoozeOutcome::AlreadySnoozed);
    }
    match scheduler.pending_trigger(reminder_id)? {
        Some(trigger_at) if trigger_at <= now => {}
        _ => return Ok(SnoozeOutcome::NotDue),
    }

    // Re-arm first: if the reminder was cancelled since the due-check,
    // the ledger must not count a snooze that armed nothing.
    if !scheduler.rearm(reminder_id, config::SNOOZE_DURATION_MIN, now)? {
        return Ok(SnoozeOutcome::NotDue);
    }
    record_snooze(conn, reminder_id, config::SNOOZE_DURATION_MIN, now)?;
    tracing::info!(%reminder_id, "Reminder snoozed");
    Ok(SnoozeOutcome::Snoozed)
}

use chrono::{DateTime, FixedOffset};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Persisted snooze counter for one reminder identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnoozeRecord {
    pub count: u32,
    pub expires_at: DateTime<FixedOffset>,
}

pub fn get_snooze(conn: &Connection, reminder_id: &str) -> Result<Option<SnoozeRecord>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT count, expires_at FROM snooze_state WHERE reminder_id = ?1",
            params![reminder_id],
            |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    row.map(|(count, expires_at)| {
        Ok(SnoozeRecord {
            count,
            expires_at: DateTime::parse_from_rfc3339(&expires_at).map_err(|e| {
                DatabaseError::ConstraintViolation(format!("bad expiry {expires_at}: {e}"))
            })?,
        })
    })
    .transpose()
}

pub fn set_snooze(
    conn: &Connection,
    reminder_id: &str,
    record: &SnoozeRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO snooze_state (reminder_id, count, expires_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(reminder_id) DO UPDATE SET
             count = excluded.count,
             expires_at = excluded.expires_at",
        params![reminder_id, record.count, record.expires_at.to_rfc3339()],
    )?;
    Ok(())
}

/// Drop entries whose expiry has passed. Entries are not self-expiring;
/// the foreground tick calls this once a minute.
pub fn delete_expired_snoozes(
    conn: &Connection,
    now: DateTime<FixedOffset>,
) -> Result<usize, DatabaseError> {
    let dropped = conn.execute(
        "DELETE FROM snooze_state WHERE expires_at < ?1",
        params![now.to_rfc3339()],
    )?;
    Ok(dropped)
}

/// Purge every snooze row in a medication's identifier range. Part of
/// the delete-medication cascade.
pub fn delete_snoozes_for_medication(
    conn: &Connection,
    medication_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM snooze_state WHERE reminder_id LIKE ?1 || '-%'",
        params![medication_id.to_string()],
    )?;
    Ok(())
}

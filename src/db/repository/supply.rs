use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Whether the one-day-of-supply warning already fired for this
/// medication on this day. Recomputing the threshold must not re-arm
/// the warning.
pub fn has_supply_warning(
    conn: &Connection,
    medication_id: &Uuid,
    day: NaiveDate,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM supply_warnings WHERE medication_id = ?1 AND warned_on = ?2",
        params![medication_id.to_string(), day.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn mark_supply_warned(
    conn: &Connection,
    medication_id: &Uuid,
    day: NaiveDate,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO supply_warnings (medication_id, warned_on) VALUES (?1, ?2)",
        params![medication_id.to_string(), day.to_string()],
    )?;
    Ok(())
}

/// Part of the delete-medication cascade.
pub fn clear_supply_warnings(conn: &Connection, medication_id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM supply_warnings WHERE medication_id = ?1",
        params![medication_id.to_string()],
    )?;
    Ok(())
}

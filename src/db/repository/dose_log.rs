use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DoseLog, MealWindow};

pub fn insert_dose_log(conn: &Connection, log: &DoseLog) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO dose_logs (id, medication_id, medication_name, at, log_date, window, taken)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            log.id.to_string(),
            log.medication_id.to_string(),
            log.medication_name,
            log.at.to_rfc3339(),
            log.log_date.to_string(),
            log.window.as_str(),
            log.taken as i32,
        ],
    )?;
    Ok(())
}

/// The dedup check behind every adherence write: does any record exist
/// for this medication, window and calendar day? Queried immediately
/// before inserting, never from a cached snapshot.
pub fn has_dose_log(
    conn: &Connection,
    medication_id: &Uuid,
    window: MealWindow,
    day: NaiveDate,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM dose_logs WHERE medication_id = ?1 AND window = ?2 AND log_date = ?3",
        params![medication_id.to_string(), window.as_str(), day.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Full history, newest first.
pub fn get_all_dose_logs(conn: &Connection) -> Result<Vec<DoseLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medication_id, medication_name, at, log_date, window, taken
         FROM dose_logs ORDER BY at DESC",
    )?;
    let rows = stmt.query_map([], dose_log_row)?;
    collect_logs(rows)
}

/// Records dated on or after `day`, newest first. Backs the dashboard
/// ranges (last 7 days / this month).
pub fn get_dose_logs_since(conn: &Connection, day: NaiveDate) -> Result<Vec<DoseLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medication_id, medication_name, at, log_date, window, taken
         FROM dose_logs WHERE log_date >= ?1 ORDER BY at DESC",
    )?;
    let rows = stmt.query_map(params![day.to_string()], dose_log_row)?;
    collect_logs(rows)
}

type LogRow = (String, String, String, String, String, String, i32);

fn dose_log_row(row: &rusqlite::Row<'_>) -> Result<LogRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn collect_logs(
    rows: impl Iterator<Item = Result<LogRow, rusqlite::Error>>,
) -> Result<Vec<DoseLog>, DatabaseError> {
    let mut logs = Vec::new();
    for row in rows {
        let (id, medication_id, medication_name, at, log_date, window, taken) = row?;
        logs.push(DoseLog {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            medication_id: Uuid::parse_str(&medication_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            medication_name,
            at: DateTime::parse_from_rfc3339(&at)
                .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {at}: {e}")))?,
            log_date: log_date.parse::<NaiveDate>().map_err(|e| {
                DatabaseError::ConstraintViolation(format!("bad log date {log_date}: {e}"))
            })?,
            window: MealWindow::from_str(&window)?,
            taken: taken != 0,
        });
    }
    Ok(logs)
}

use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::ScheduleProfile;

const TIME_FORMAT: &str = "%H:%M";

/// Persist the single schedule profile row. Callers validate the anchor
/// ordering first and then reinstall every medication's reminders.
pub fn save_profile(conn: &Connection, profile: &ScheduleProfile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO schedule_profile (id, breakfast, lunch, dinner, sleep)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             breakfast = excluded.breakfast,
             lunch = excluded.lunch,
             dinner = excluded.dinner,
             sleep = excluded.sleep",
        params![
            profile.breakfast.format(TIME_FORMAT).to_string(),
            profile.lunch.format(TIME_FORMAT).to_string(),
            profile.dinner.format(TIME_FORMAT).to_string(),
            profile.sleep.format(TIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// `None` when no profile has been saved yet; the engine treats that as
/// "no reminders, no active window".
pub fn get_profile(conn: &Connection) -> Result<Option<ScheduleProfile>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT breakfast, lunch, dinner, sleep FROM schedule_profile WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((breakfast, lunch, dinner, sleep)) = row else {
        return Ok(None);
    };

    Ok(Some(ScheduleProfile {
        breakfast: parse_time(&breakfast)?,
        lunch: parse_time(&lunch)?,
        dinner: parse_time(&dinner)?,
        sleep: parse_time(&sleep)?,
    }))
}

fn parse_time(raw: &str) -> Result<NaiveTime, DatabaseError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad anchor time {raw}: {e}")))
}

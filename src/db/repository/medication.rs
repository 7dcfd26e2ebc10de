use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{MealWindow, Medication, TimingMode};

/// Insert or replace a medication (add and edit share one path, the way
/// the remote-store `set` did).
pub fn upsert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, name, timing_mode, meal_windows, before_sleep, total_units, units_per_dose)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             timing_mode = excluded.timing_mode,
             meal_windows = excluded.meal_windows,
             before_sleep = excluded.before_sleep,
             total_units = excluded.total_units,
             units_per_dose = excluded.units_per_dose",
        params![
            med.id.to_string(),
            med.name,
            med.timing_mode.as_str(),
            join_windows(&med.meal_windows),
            med.before_sleep as i32,
            med.total_units,
            med.units_per_dose,
        ],
    )?;
    Ok(())
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Option<Medication>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, timing_mode, meal_windows, before_sleep, total_units, units_per_dose
             FROM medications WHERE id = ?1",
            params![id.to_string()],
            medication_row,
        )
        .optional()?;

    row.map(medication_from_row).transpose()
}

pub fn get_all_medications(conn: &Connection) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, timing_mode, meal_windows, before_sleep, total_units, units_per_dose
         FROM medications ORDER BY name",
    )?;

    let rows = stmt.query_map([], medication_row)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row?)?);
    }
    Ok(meds)
}

pub fn delete_medication(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM medications WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

/// Decrement the remaining units by one dose, floored at zero. Reads and
/// writes in one statement so a racing tick sees consistent state.
pub fn decrement_units(conn: &Connection, id: &Uuid, by: u32) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medications SET total_units = MAX(0, total_units - ?2) WHERE id = ?1",
        params![id.to_string(), by],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "medication".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn join_windows(windows: &[MealWindow]) -> String {
    // Stored in fixed order so edits that only reorder tags do not dirty
    // the row.
    MealWindow::MEALS
        .iter()
        .filter(|meal| windows.contains(meal))
        .map(|meal| meal.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_windows(raw: &str) -> Result<Vec<MealWindow>, DatabaseError> {
    raw.split(',')
        .filter(|part| !part.is_empty())
        .map(MealWindow::from_str)
        .collect()
}

struct MedicationRow {
    id: String,
    name: String,
    timing_mode: String,
    meal_windows: String,
    before_sleep: i32,
    total_units: u32,
    units_per_dose: u32,
}

fn medication_row(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        timing_mode: row.get(2)?,
        meal_windows: row.get(3)?,
        before_sleep: row.get(4)?,
        total_units: row.get(5)?,
        units_per_dose: row.get(6)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name: row.name,
        timing_mode: TimingMode::from_str(&row.timing_mode)?,
        meal_windows: parse_windows(&row.meal_windows)?,
        before_sleep: row.before_sleep != 0,
        total_units: row.total_units,
        units_per_dose: row.units_per_dose,
    })
}

//! Taken/missed dose recording and the backfill sweeps.
//!
//! Every write runs the (medication, window, calendar day) existence
//! check against the live database immediately before inserting; a lost
//! race leaves at most a harmless duplicate, and the read side only
//! cares about existence. The day in that key is the day the window
//! opened, so a sleep dose taken after midnight still belongs to the
//! evening it was due.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use rusqlite::Connection;
use uuid::Uuid;

use super::window;
use super::EngineError;
use crate::config;
use crate::db::repository::{decrement_units, has_dose_log, insert_dose_log};
use crate::models::{DoseLog, MealWindow, Medication, ScheduleProfile};

/// Record a user-confirmed dose and consume its units. Returns false if
/// a record for this (medication, window, day) already exists; the
/// medication's supply is left untouched then.
pub fn record_taken(
    conn: &Connection,
    medication: &Medication,
    profile: &ScheduleProfile,
    window: MealWindow,
    at: DateTime<FixedOffset>,
) -> Result<bool, EngineError> {
    if !append_log(conn, medication, profile, window, at, true)? {
        return Ok(false);
    }
    decrement_units(conn, &medication.id, medication.units_per_dose)?;
    tracing::info!(medication = %medication.name, window = window.as_str(), "Dose taken");
    Ok(true)
}

/// Backfill a missed dose. Dedup-checked like `record_taken`; no supply
/// change.
pub fn record_missed(
    conn: &Connection,
    medication: &Medication,
    profile: &ScheduleProfile,
    window: MealWindow,
    at: DateTime<FixedOffset>,
) -> Result<bool, EngineError> {
    let inserted = append_log(conn, medication, profile, window, at, false)?;
    if inserted {
        tracing::info!(medication = %medication.name, window = window.as_str(), "Dose missed");
    }
    Ok(inserted)
}

fn append_log(
    conn: &Connection,
    medication: &Medication,
    profile: &ScheduleProfile,
    window: MealWindow,
    at: DateTime<FixedOffset>,
    taken: bool,
) -> Result<bool, EngineError> {
    let day = window::window_day(profile, window, at);
    if has_dose_log(conn, &medication.id, window, day)? {
        return Ok(false);
    }
    insert_dose_log(
        conn,
        &DoseLog {
            id: Uuid::new_v4(),
            medication_id: medication.id,
            medication_name: medication.name.clone(),
            at,
            log_date: day,
            window,
            taken,
        },
    )?;
    Ok(true)
}

/// Backfill missed records for every window whose end boundary has
/// passed today. Idempotent: re-running after doses were logged (taken
/// or missed) changes nothing. Returns the number of records inserted.
pub fn sweep_missed_for_today(
    conn: &Connection,
    medications: &[Medication],
    profile: &ScheduleProfile,
    now: DateTime<FixedOffset>,
) -> Result<u32, EngineError> {
    let today = now.with_timezone(&config::region_offset()).date_naive();
    let mut inserted = 0;

    for meal_window in MealWindow::ALL {
        if now < window::window_end(profile, meal_window, today) {
            continue;
        }
        for medication in medications.iter().filter(|m| m.applies_to(meal_window)) {
            if record_missed(conn, medication, profile, meal_window, now)? {
                inserted += 1;
            }
        }
    }

    if inserted > 0 {
        tracing::info!(inserted, "Backfilled missed doses for today");
    }
    Ok(inserted)
}

/// Catch-up for windows that closed while the app was not running:
/// every applicable (medication, window) of the previous calendar day
/// without a record gets a missed entry dated at the end of that day.
/// Yesterday's sleep window is skipped while its post-midnight spill is
/// still open; the dose can still be taken then.
///
/// Deliberately looks at one day only; longer gaps are not
/// reconstructed.
pub fn sweep_missed_for_yesterday(
    conn: &Connection,
    medications: &[Medication],
    profile: &ScheduleProfile,
    now: DateTime<FixedOffset>,
) -> Result<u32, EngineError> {
    let today = now.with_timezone(&config::region_offset()).date_naive();
    let Some(yesterday) = today.pred_opt() else {
        return Ok(0);
    };
    let at = window::end_of_day(yesterday);
    let sleep_still_open = now < window::window_end(profile, MealWindow::Sleep, yesterday);
    let mut inserted = 0;

    for medication in medications {
        for meal_window in medication.applicable_windows() {
            if meal_window == MealWindow::Sleep && sleep_still_open {
                continue;
            }
            if record_missed(conn, medication, profile, meal_window, at)? {
                inserted += 1;
            }
        }
    }

    if inserted > 0 {
        tracing::info!(inserted, "Backfilled missed doses for yesterday");
    }
    Ok(inserted)
}

/// Aggregates behind the adherence dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdherenceSummary {
    pub taken: u32,
    pub missed: u32,
    pub percent_taken: u32,
    pub most_missed_medication: Option<(String, u32)>,
    pub most_missed_window: Option<(MealWindow, u32)>,
}

/// Summarize a (typically date-filtered) slice of the dose history.
pub fn summarize(logs: &[DoseLog]) -> AdherenceSummary {
    let taken = logs.iter().filter(|l| l.taken).count() as u32;
    let missed = logs.len() as u32 - taken;
    let total = taken + missed;
    let percent_taken = if total == 0 { 0 } else { taken * 100 / total };

    let mut by_medication: HashMap<&str, u32> = HashMap::new();
    let mut by_window: HashMap<MealWindow, u32> = HashMap::new();
    for log in logs.iter().filter(|l| !l.taken) {
        *by_medication.entry(log.medication_name.as_str()).or_default() += 1;
        *by_window.entry(log.window).or_default() += 1;
    }

    // Ties resolve to the alphabetically first name / earliest window so
    // the dashboard does not flicker between reloads.
    let most_missed_medication = by_medication
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(name, count)| (name.to_string(), count));
    let most_missed_window = by_window.into_iter().max_by_key(|(window, count)| {
        let order = MealWindow::ALL.iter().position(|w| w == window);
        (*count, std::cmp::Reverse(order))
    });

    AdherenceSummary {
        taken,
        missed,
        percent_taken,
        most_missed_medication,
        most_missed_window,
    }
}

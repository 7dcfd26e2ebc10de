use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MealWindow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    /// Denormalized so history survives medication deletion.
    pub medication_name: String,
    pub at: DateTime<FixedOffset>,
    /// Regional calendar day of the dose window this record belongs to.
    /// For the sleep window this is the day the window opened, which is
    /// the day before `at` when the window spills past midnight. The
    /// (medication, window, day) dedup key uses this, never the raw
    /// timestamp.
    pub log_date: NaiveDate,
    pub window: MealWindow,
    pub taken: bool,
}

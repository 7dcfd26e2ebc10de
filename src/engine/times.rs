//! Reminder trigger-time computation. Pure: (medication, profile, day)
//! in, ordered occurrences out.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use uuid::Uuid;

use super::window::local_datetime;
use crate::config;
use crate::models::{MealWindow, Medication, ScheduleProfile, TimingMode};

/// One concrete reminder for "today". Derived on every recomputation and
/// never persisted; the (medication, index) pair is what names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderOccurrence {
    pub medication_id: Uuid,
    pub window: MealWindow,
    pub index: usize,
    pub trigger_at: DateTime<FixedOffset>,
}

/// Compute the day's trigger times for one medication.
///
/// Output order is fixed: the sleep occurrence (if any) first, then
/// meals in Breakfast, Lunch, Dinner order. Occurrence indices follow
/// that order, which is what keeps reminder identifiers stable across
/// profile changes. A medication with no meal tags and no sleep flag
/// yields an empty list.
pub fn reminder_times(
    medication: &Medication,
    profile: &ScheduleProfile,
    day: NaiveDate,
) -> Vec<ReminderOccurrence> {
    let mut occurrences = Vec::new();

    if medication.before_sleep {
        occurrences.push(ReminderOccurrence {
            medication_id: medication.id,
            window: MealWindow::Sleep,
            index: occurrences.len(),
            trigger_at: local_datetime(day, profile.sleep)
                - Duration::minutes(config::SLEEP_OFFSET_MIN),
        });
    }

    for meal in medication.meals_in_order() {
        let anchor = local_datetime(day, profile.time_for(meal));
        let offset = Duration::minutes(config::MEAL_OFFSET_MIN);
        let trigger_at = match medication.timing_mode {
            TimingMode::BeforeMeal => anchor - offset,
            TimingMode::AfterMeal => anchor + offset,
        };
        occurrences.push(ReminderOccurrence {
            medication_id: medication.id,
            window: meal,
            index: occurrences.len(),
            trigger_at,
        });
    }

    occurrences
}

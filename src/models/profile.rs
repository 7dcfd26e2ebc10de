use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::enums::MealWindow;
use super::ValidationError;

/// The user's four daily anchor times. Clock times only; the calendar
/// date is applied when windows are resolved against "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleProfile {
    pub breakfast: NaiveTime,
    pub lunch: NaiveTime,
    pub dinner: NaiveTime,
    pub sleep: NaiveTime,
}

impl ScheduleProfile {
    /// Enforced at save time: strictly increasing same-day anchors.
    /// Everything downstream (single active window, window ends) leans
    /// on this ordering.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.breakfast < self.lunch && self.lunch < self.dinner && self.dinner < self.sleep {
            Ok(())
        } else {
            Err(ValidationError::AnchorsNotIncreasing)
        }
    }

    pub fn time_for(&self, window: MealWindow) -> NaiveTime {
        match window {
            MealWindow::Breakfast => self.breakfast,
            MealWindow::Lunch => self.lunch,
            MealWindow::Dinner => self.dinner,
            MealWindow::Sleep => self.sleep,
        }
    }
}

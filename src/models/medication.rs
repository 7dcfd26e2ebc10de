use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MealWindow, TimingMode};
use super::ValidationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub timing_mode: TimingMode,
    /// Meal tags the dose applies to. Order-insensitive; reminder
    /// numbering always iterates in the fixed Breakfast, Lunch, Dinner
    /// order regardless of how these were entered.
    pub meal_windows: Vec<MealWindow>,
    pub before_sleep: bool,
    pub total_units: u32,
    pub units_per_dose: u32,
}

impl Medication {
    pub fn new(name: impl Into<String>, timing_mode: TimingMode) -> Self {
        Medication {
            id: Uuid::new_v4(),
            name: name.into(),
            timing_mode,
            meal_windows: Vec::new(),
            before_sleep: false,
            total_units: 0,
            units_per_dose: 1,
        }
    }

    /// Edit-boundary check. A medication with no meal tags and no sleep
    /// flag is valid; it simply produces no reminders.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.units_per_dose == 0 {
            return Err(ValidationError::NonPositiveDose);
        }
        Ok(())
    }

    /// Meal tags in the fixed Breakfast, Lunch, Dinner order, deduplicated.
    pub fn meals_in_order(&self) -> impl Iterator<Item = MealWindow> + '_ {
        MealWindow::MEALS
            .into_iter()
            .filter(|meal| self.meal_windows.contains(meal))
    }

    /// Whether a dose of this medication is expected during `window`.
    pub fn applies_to(&self, window: MealWindow) -> bool {
        match window {
            MealWindow::Sleep => self.before_sleep,
            meal => self.meal_windows.contains(&meal),
        }
    }

    /// Window tags this medication is expected in, in day order.
    pub fn applicable_windows(&self) -> impl Iterator<Item = MealWindow> + '_ {
        MealWindow::ALL
            .into_iter()
            .filter(|window| self.applies_to(*window))
    }

    pub fn doses_per_day(&self) -> u32 {
        let meals = self.meals_in_order().count() as u32;
        let sleep = u32::from(self.before_sleep);
        (meals + sleep).max(1)
    }

    /// Units consumed per day, used for the low-supply projection.
    pub fn daily_usage(&self) -> u32 {
        self.units_per_dose * self.doses_per_day()
    }
}

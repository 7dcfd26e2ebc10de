use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(MealWindow {
    Breakfast => "breakfast",
    Lunch => "lunch",
    Dinner => "dinner",
    Sleep => "sleep",
});

impl MealWindow {
    /// The three meal tags a medication can be attached to, in the fixed
    /// order used for deterministic reminder numbering.
    pub const MEALS: [MealWindow; 3] =
        [MealWindow::Breakfast, MealWindow::Lunch, MealWindow::Dinner];

    /// Every window tag, in day order.
    pub const ALL: [MealWindow; 4] = [
        MealWindow::Breakfast,
        MealWindow::Lunch,
        MealWindow::Dinner,
        MealWindow::Sleep,
    ];
}

str_enum!(TimingMode {
    BeforeMeal => "before_meal",
    AfterMeal => "after_meal",
});

impl TimingMode {
    /// Human-readable timing shown in the reminder body.
    pub fn label(&self) -> &'static str {
        match self {
            TimingMode::BeforeMeal => "before meal",
            TimingMode::AfterMeal => "after meal",
        }
    }
}

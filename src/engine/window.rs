//! Dose window resolution.
//!
//! The day is cut into four half-open windows anchored on the profile:
//! [breakfast, lunch), [lunch, dinner), [dinner, sleep) and
//! [sleep, sleep + 6h). The sleep window may spill past midnight, so
//! resolving "now" also considers yesterday's sleep window. Outside all
//! four (late night after the sleep window closes, before breakfast)
//! there is no active window.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};

use crate::config;
use crate::models::{MealWindow, ScheduleProfile};

/// Interpret a (day, clock time) pair in the regional offset.
pub(crate) fn local_datetime(day: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
    let offset = config::region_offset();
    let utc = day.and_time(time) - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// Last second of `day` in the regional offset. Yesterday's backfilled
/// missed records are dated here.
pub(crate) fn end_of_day(day: NaiveDate) -> DateTime<FixedOffset> {
    local_datetime(day, NaiveTime::MIN) + Duration::seconds(86_399)
}

pub fn window_start(
    profile: &ScheduleProfile,
    window: MealWindow,
    day: NaiveDate,
) -> DateTime<FixedOffset> {
    local_datetime(day, profile.time_for(window))
}

/// End boundary of `window` on `day`. Also the moment the missed-dose
/// sweep is allowed to backfill that window.
pub fn window_end(
    profile: &ScheduleProfile,
    window: MealWindow,
    day: NaiveDate,
) -> DateTime<FixedOffset> {
    match window {
        MealWindow::Breakfast => local_datetime(day, profile.lunch),
        MealWindow::Lunch => local_datetime(day, profile.dinner),
        MealWindow::Dinner => local_datetime(day, profile.sleep),
        MealWindow::Sleep => {
            local_datetime(day, profile.sleep) + Duration::hours(config::SLEEP_WINDOW_HOURS)
        }
    }
}

/// The single active dose window at `now`, if any. Today's windows are
/// checked in day order before yesterday's spilled sleep window, which
/// keeps the answer unique even for extreme anchor choices.
pub fn active_window(profile: &ScheduleProfile, now: DateTime<FixedOffset>) -> Option<MealWindow> {
    let today = now.with_timezone(&config::region_offset()).date_naive();

    for window in MealWindow::ALL {
        let start = window_start(profile, window, today);
        if start <= now && now < window_end(profile, window, today) {
            return Some(window);
        }
    }

    if let Some(yesterday) = today.pred_opt() {
        let start = window_start(profile, MealWindow::Sleep, yesterday);
        if start <= now && now < window_end(profile, MealWindow::Sleep, yesterday) {
            return Some(MealWindow::Sleep);
        }
    }

    None
}

/// Calendar day a dose in `window` at time `at` is keyed to: the day the
/// window opened. Only the sleep window can differ from the day of `at`
/// itself, when `at` falls in the post-midnight spill.
pub fn window_day(
    profile: &ScheduleProfile,
    window: MealWindow,
    at: DateTime<FixedOffset>,
) -> NaiveDate {
    let today = at.with_timezone(&config::region_offset()).date_naive();
    if window == MealWindow::Sleep {
        if let Some(yesterday) = today.pred_opt() {
            let start = window_start(profile, MealWindow::Sleep, yesterday);
            if start <= at && at < window_end(profile, MealWindow::Sleep, yesterday) {
                return yesterday;
            }
        }
    }
    today
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ScheduleProfile {
        ScheduleProfile {
            breakfast: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            lunch: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            dinner: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            sleep: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        }
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn boundaries_are_half_open() {
        let p = profile();
        assert_eq!(active_window(&p, at("2025-06-10T11:59:00+07:00")), Some(MealWindow::Breakfast));
        assert_eq!(active_window(&p, at("2025-06-10T12:00:00+07:00")), Some(MealWindow::Lunch));
    }

    #[test]
    fn sleep_window_spans_midnight() {
        let p = profile();
        assert_eq!(active_window(&p, at("2025-06-10T23:30:00+07:00")), Some(MealWindow::Sleep));
        // 02:00 belongs to the previous evening's sleep window.
        assert_eq!(active_window(&p, at("2025-06-11T02:00:00+07:00")), Some(MealWindow::Sleep));
    }

    #[test]
    fn early_morning_has_no_window() {
        let p = profile();
        assert_eq!(active_window(&p, at("2025-06-10T05:00:00+07:00")), None);
        assert_eq!(active_window(&p, at("2025-06-10T06:59:59+07:00")), None);
    }

    #[test]
    fn each_window_starts_at_its_anchor() {
        let p = profile();
        assert_eq!(active_window(&p, at("2025-06-10T07:00:00+07:00")), Some(MealWindow::Breakfast));
        assert_eq!(active_window(&p, at("2025-06-10T18:00:00+07:00")), Some(MealWindow::Dinner));
        assert_eq!(active_window(&p, at("2025-06-10T22:00:00+07:00")), Some(MealWindow::Sleep));
    }

    #[test]
    fn window_end_table_matches_anchors() {
        let p = profile();
        let day: NaiveDate = "2025-06-10".parse().unwrap();
        assert_eq!(window_end(&p, MealWindow::Breakfast, day), at("2025-06-10T12:00:00+07:00"));
        assert_eq!(window_end(&p, MealWindow::Lunch, day), at("2025-06-10T18:00:00+07:00"));
        assert_eq!(window_end(&p, MealWindow::Dinner, day), at("2025-06-10T22:00:00+07:00"));
        assert_eq!(window_end(&p, MealWindow::Sleep, day), at("2025-06-11T04:00:00+07:00"));
    }

    #[test]
    fn end_of_day_is_last_second() {
        let day: NaiveDate = "2025-06-10".parse().unwrap();
        assert_eq!(end_of_day(day), at("2025-06-10T23:59:59+07:00"));
    }

    #[test]
    fn window_day_keys_spilled_sleep_dose_to_previous_day() {
        let p = profile();
        let opened: NaiveDate = "2025-06-10".parse().unwrap();
        assert_eq!(window_day(&p, MealWindow::Sleep, at("2025-06-11T01:00:00+07:00")), opened);
        // Before midnight the sleep window is still its own day.
        assert_eq!(window_day(&p, MealWindow::Sleep, at("2025-06-10T23:00:00+07:00")), opened);
        // Meal windows never shift.
        assert_eq!(
            window_day(&p, MealWindow::Breakfast, at("2025-06-11T01:00:00+07:00")),
            "2025-06-11".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn evaluation_in_other_offsets_is_normalized() {
        let p = profile();
        // 16:30 UTC == 23:30 at UTC+7 — inside the sleep window.
        assert_eq!(active_window(&p, at("2025-06-10T16:30:00+00:00")), Some(MealWindow::Sleep));
    }
}

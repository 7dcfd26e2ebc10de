//! Reminder installation and replacement.
//!
//! All mutation of the pending-notification set goes through here.
//! Installation is idempotent: the medication's whole identifier range
//! is cancelled before new triggers go in, so repeated installs (and
//! installs after a rule shrank) never leak a stale reminder.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use rusqlite::Connection;
use uuid::Uuid;

use super::identity::{all_reminder_ids, reminder_id, supply_warning_id};
use super::notify::{NotificationGateway, NotificationRequest};
use super::times::{reminder_times, ReminderOccurrence};
use super::EngineError;
use crate::config;
use crate::db::repository::{has_supply_warning, mark_supply_warned};
use crate::models::{MealWindow, Medication, ScheduleProfile};

pub struct ReminderScheduler {
    gateway: Arc<dyn NotificationGateway>,
}

impl ReminderScheduler {
    pub fn new(gateway: Arc<dyn NotificationGateway>) -> Self {
        ReminderScheduler { gateway }
    }

    /// Replace a medication's reminders with the set derived from the
    /// current profile. Safe to call repeatedly with the same inputs.
    pub fn install(
        &self,
        medication: &Medication,
        profile: &ScheduleProfile,
        day: NaiveDate,
    ) -> Result<(), EngineError> {
        self.gateway.cancel(&all_reminder_ids(medication.id))?;

        let occurrences = reminder_times(medication, profile, day);
        for occurrence in &occurrences {
            self.gateway.schedule(request_for(medication, occurrence))?;
        }
        tracing::debug!(
            medication = %medication.name,
            count = occurrences.len(),
            "Installed reminders"
        );
        Ok(())
    }

    /// Cancel a medication's full identifier range plus its pending
    /// low-supply warning. Must run before the medication row is
    /// deleted.
    pub fn cancel_all(&self, medication_id: Uuid) -> Result<(), EngineError> {
        let mut ids = all_reminder_ids(medication_id);
        ids.push(supply_warning_id(medication_id));
        self.gateway.cancel(&ids)?;
        tracing::debug!(%medication_id, "Cancelled reminder range");
        Ok(())
    }

    /// Every trigger time depends on the profile, so a profile save
    /// reinstalls everything.
    pub fn reinstall_for_profile(
        &self,
        profile: &ScheduleProfile,
        medications: &[Medication],
        day: NaiveDate,
    ) -> Result<(), EngineError> {
        for medication in medications {
            self.install(medication, profile, day)?;
        }
        Ok(())
    }

    /// Schedule the one-day-of-supply warning if the projection says
    /// exactly one day remains and it has not fired for this medication
    /// today. Returns whether a warning was scheduled.
    ///
    /// The warned-flag lives in the database so recomputing the same
    /// threshold (every dose taken, every tick) cannot re-arm it.
    pub fn maybe_schedule_low_supply_warning(
        &self,
        conn: &Connection,
        medication: &Medication,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, EngineError> {
        let daily_usage = medication.daily_usage();
        if daily_usage == 0 {
            return Ok(false);
        }
        let days_left = medication.total_units / daily_usage;
        if days_left != 1 {
            return Ok(false);
        }

        let today = now.with_timezone(&config::region_offset()).date_naive();
        if has_supply_warning(conn, &medication.id, today)? {
            return Ok(false);
        }

        self.gateway.schedule(NotificationRequest {
            id: supply_warning_id(medication.id),
            title: "Medication running low".into(),
            body: format!("{}: about one day of supply left", medication.name),
            trigger_at: now + Duration::minutes(1),
            repeats: false,
        })?;
        mark_supply_warned(conn, &medication.id, today)?;
        tracing::info!(medication = %medication.name, "Scheduled low-supply warning");
        Ok(true)
    }

    /// Re-arm one reminder `minutes_from_now` out, keeping its display
    /// content. Returns false when the identifier is not pending (the
    /// snooze raced a cancellation); nothing is scheduled then.
    pub fn rearm(
        &self,
        id: &str,
        minutes_from_now: i64,
        now: DateTime<FixedOffset>,
    ) -> Result<bool, EngineError> {
        let pending = self.gateway.pending()?;
        let Some(existing) = pending.into_iter().find(|r| r.id == id) else {
            return Ok(false);
        };

        self.gateway.cancel(std::slice::from_ref(&existing.id))?;
        self.gateway.schedule(NotificationRequest {
            trigger_at: now + Duration::minutes(minutes_from_now),
            ..existing
        })?;
        tracing::debug!(%id, minutes_from_now, "Re-armed reminder");
        Ok(true)
    }

    /// Trigger time of a pending reminder, if it is pending at all.
    pub fn pending_trigger(&self, id: &str) -> Result<Option<DateTime<FixedOffset>>, EngineError> {
        let pending = self.gateway.pending()?;
        Ok(pending.into_iter().find(|r| r.id == id).map(|r| r.trigger_at))
    }
}

fn request_for(medication: &Medication, occurrence: &ReminderOccurrence) -> NotificationRequest {
    let timing = match occurrence.window {
        MealWindow::Sleep => "before sleep",
        _ => medication.timing_mode.label(),
    };
    NotificationRequest {
        id: reminder_id(medication.id, occurrence.index),
        title: "Time to take your medicine".into(),
        body: format!("{} - {}", medication.name, timing),
        trigger_at: occurrence.trigger_at,
        repeats: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::repository::upsert_medication;
    use crate::engine::notify::testing::RecordingGateway;
    use crate::models::TimingMode;
    use chrono::NaiveTime;
    use std::sync::atomic::Ordering;

    fn profile() -> ScheduleProfile {
        ScheduleProfile {
            breakfast: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            lunch: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            dinner: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            sleep: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        }
    }

    fn med() -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: "Lisinopril".into(),
            timing_mode: TimingMode::AfterMeal,
            meal_windows: vec![MealWindow::Breakfast, MealWindow::Dinner],
            before_sleep: true,
            total_units: 30,
            units_per_dose: 1,
        }
    }

    fn day() -> NaiveDate {
        "2025-06-10".parse().unwrap()
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn scheduler() -> (Arc<RecordingGateway>, ReminderScheduler) {
        let gateway = Arc::new(RecordingGateway::new());
        let scheduler = ReminderScheduler::new(gateway.clone());
        (gateway, scheduler)
    }

    #[test]
    fn install_twice_is_idempotent() {
        let (gateway, scheduler) = scheduler();
        let m = med();

        scheduler.install(&m, &profile(), day()).unwrap();
        let first = gateway.pending_ids();
        scheduler.install(&m, &profile(), day()).unwrap();
        let second = gateway.pending_ids();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn shrinking_rule_leaves_no_orphans() {
        let (gateway, scheduler) = scheduler();
        let mut m = med();
        scheduler.install(&m, &profile(), day()).unwrap();
        assert_eq!(gateway.pending_ids().len(), 3);

        m.meal_windows = vec![MealWindow::Breakfast];
        m.before_sleep = false;
        scheduler.install(&m, &profile(), day()).unwrap();
        assert_eq!(gateway.pending_ids(), vec![reminder_id(m.id, 0)]);
    }

    #[test]
    fn install_carries_name_and_timing() {
        let (gateway, scheduler) = scheduler();
        let m = med();
        scheduler.install(&m, &profile(), day()).unwrap();

        let pending = gateway.pending().unwrap();
        let sleep = pending.iter().find(|r| r.id == reminder_id(m.id, 0)).unwrap();
        assert_eq!(sleep.body, "Lisinopril - before sleep");
        let breakfast = pending.iter().find(|r| r.id == reminder_id(m.id, 1)).unwrap();
        assert_eq!(breakfast.body, "Lisinopril - after meal");
        assert!(pending.iter().all(|r| !r.repeats));
    }

    #[test]
    fn cancel_all_clears_range_and_supply_warning() {
        let (gateway, scheduler) = scheduler();
        let conn = open_memory_database().unwrap();
        let mut m = med();
        m.total_units = 3; // 3 doses/day, exactly one day left
        upsert_medication(&conn, &m).unwrap();

        scheduler.install(&m, &profile(), day()).unwrap();
        scheduler
            .maybe_schedule_low_supply_warning(&conn, &m, at("2025-06-10T08:00:00+07:00"))
            .unwrap();
        assert_eq!(gateway.pending_ids().len(), 4);

        scheduler.cancel_all(m.id).unwrap();
        assert!(gateway.pending_ids().is_empty());
    }

    #[test]
    fn reinstall_covers_every_medication() {
        let (gateway, scheduler) = scheduler();
        let a = med();
        let mut b = med();
        b.id = Uuid::new_v4();
        b.meal_windows = vec![MealWindow::Lunch];
        b.before_sleep = false;

        scheduler
            .reinstall_for_profile(&profile(), &[a.clone(), b.clone()], day())
            .unwrap();
        assert_eq!(gateway.pending_ids().len(), 4);

        // Profile change shifts times but reuses identifiers.
        let mut late = profile();
        late.lunch = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
        scheduler
            .reinstall_for_profile(&late, &[a, b.clone()], day())
            .unwrap();
        let lunch = scheduler.pending_trigger(&reminder_id(b.id, 0)).unwrap().unwrap();
        assert_eq!(lunch, at("2025-06-10T13:30:00+07:00"));
    }

    #[test]
    fn low_supply_warning_fires_once_per_day() {
        let (gateway, scheduler) = scheduler();
        let conn = open_memory_database().unwrap();
        let mut m = med();
        m.meal_windows = vec![MealWindow::Breakfast];
        m.before_sleep = false;
        m.units_per_dose = 1;
        m.total_units = 2;
        upsert_medication(&conn, &m).unwrap();

        let now = at("2025-06-10T08:00:00+07:00");
        // Two days of supply: no warning.
        assert!(!scheduler.maybe_schedule_low_supply_warning(&conn, &m, now).unwrap());

        m.total_units = 1;
        assert!(scheduler.maybe_schedule_low_supply_warning(&conn, &m, now).unwrap());
        // Recomputing the same threshold does not re-arm.
        assert!(!scheduler.maybe_schedule_low_supply_warning(&conn, &m, now).unwrap());
        assert_eq!(gateway.pending_ids(), vec![supply_warning_id(m.id)]);
    }

    #[test]
    fn rearm_preserves_content_and_moves_trigger() {
        let (gateway, scheduler) = scheduler();
        let m = med();
        scheduler.install(&m, &profile(), day()).unwrap();

        let id = reminder_id(m.id, 1);
        let now = at("2025-06-10T07:35:00+07:00");
        assert!(scheduler.rearm(&id, config::SNOOZE_DURATION_MIN, now).unwrap());

        let pending = gateway.pending().unwrap();
        let rearmed = pending.iter().find(|r| r.id == id).unwrap();
        assert_eq!(rearmed.trigger_at, at("2025-06-10T07:45:00+07:00"));
        assert_eq!(rearmed.body, "Lisinopril - after meal");
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn rearm_of_unknown_identifier_is_a_noop() {
        let (gateway, scheduler) = scheduler();
        let now = at("2025-06-10T07:35:00+07:00");
        assert!(!scheduler.rearm("missing", 10, now).unwrap());
        assert!(gateway.pending_ids().is_empty());
    }

    #[test]
    fn gateway_failures_surface_without_retry() {
        let (gateway, scheduler) = scheduler();
        let m = med();
        gateway.fail_next.store(true, Ordering::SeqCst);
        let err = scheduler.install(&m, &profile(), day());
        assert!(matches!(err, Err(EngineError::Notify(_))));
        // The failed call was not retried behind the caller's back.
        assert!(gateway.pending_ids().is_empty());
    }
}

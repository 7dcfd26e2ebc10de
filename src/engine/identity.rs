//! Stable reminder naming.
//!
//! A reminder identifier is the medication's UUID plus the occurrence's
//! zero-based position in the deterministic output of
//! [`super::times::reminder_times`]. Re-running the calculator after a
//! profile change reproduces the same identifiers for the same logical
//! occurrences, so "cancel the whole range, then reinstall" never leaks
//! a stale reminder.

use uuid::Uuid;

use crate::config;

pub fn reminder_id(medication_id: Uuid, index: usize) -> String {
    format!("{medication_id}-{index}")
}

/// The fixed identifier range for one medication. Cancellation always
/// covers the whole range, even when the current rule produces fewer
/// occurrences than before.
pub fn all_reminder_ids(medication_id: Uuid) -> Vec<String> {
    (0..config::MAX_OCCURRENCES)
        .map(|index| reminder_id(medication_id, index))
        .collect()
}

/// Identifier of a medication's one-shot low-supply warning. Outside the
/// occurrence range so a reinstall never clobbers it.
pub fn supply_warning_id(medication_id: Uuid) -> String {
    format!("{medication_id}-supply")
}

/// Inverse of [`reminder_id`]. `None` for malformed identifiers or the
/// supply-warning form.
pub fn parse_reminder_id(id: &str) -> Option<(Uuid, usize)> {
    let (uuid_part, index_part) = id.rsplit_once('-')?;
    let medication_id = Uuid::parse_str(uuid_part).ok()?;
    let index = index_part.parse().ok()?;
    Some((medication_id, index))
}

//! Boundary to the platform notification capability.
//!
//! The engine only ever asks for one-shot triggers, cancels by
//! identifier list, and lists what is pending. It never relies on a
//! notification having actually fired; adherence state is derived from
//! dose logs and the wall clock alone. Failures surface to the caller
//! and are not retried.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification backend error: {0}")]
    Backend(String),
}

/// One trigger request. `repeats` is always false today; the field keeps
/// the wire shape honest about what the platform API accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub id: String,
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<FixedOffset>,
    pub repeats: bool,
}

pub trait NotificationGateway: Send + Sync {
    /// Install a trigger. Scheduling an identifier that is already
    /// pending replaces it (platform semantics).
    fn schedule(&self, request: NotificationRequest) -> Result<(), NotifyError>;

    /// Cancel by identifier list. Unknown identifiers are ignored.
    fn cancel(&self, ids: &[String]) -> Result<(), NotifyError>;

    /// Snapshot of currently pending requests.
    fn pending(&self) -> Result<Vec<NotificationRequest>, NotifyError>;
}

//! Per-user acknowledgement of an incident's current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logical mark per (incident, user); a new acknowledgement overwrites
/// the previous one (latest write wins).
///
/// `seen_at_version` is the incident's `status_version` at the moment the
/// user acknowledged; it never exceeds the current version at creation
/// time. The mark is independent of the status transition's optimistic
/// check — acknowledgement racing a status change is harmless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenMark {
  pub incident_id:     Uuid,
  pub user_id:         Uuid,
  pub seen_at_version: i64,
  pub seen_at:         DateTime<Utc>,
}

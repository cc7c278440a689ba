//! Incident — the tracked anomalous condition this service mutates.
//!
//! The incident record itself is thin; the audit trail lives in separate
//! append-only status change records, and per-user acknowledgement in seen
//! marks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::IncidentStatus;

/// A tracked anomaly with a mutable status and an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
  pub id:              Uuid,
  /// Owning tenant; every operation is scoped to it.
  pub organization_id: Uuid,
  pub title:           String,
  pub status:          IncidentStatus,
  /// Bumped by exactly one on every successful status mutation. Strictly
  /// increasing, never repeats — the optimistic-concurrency token.
  pub status_version:  i64,
  pub detected_at:     DateTime<Utc>,
  /// Non-null iff `status` is `Closed`; cleared when the incident reopens.
  pub closed_at:       Option<DateTime<Utc>>,
}

/// Input to [`IncidentStore::create_incident`](crate::store::IncidentStore::create_incident).
/// Creation seeds `status_version = 0` and appends no history.
#[derive(Debug, Clone)]
pub struct NewIncident {
  pub organization_id: Uuid,
  pub title:           String,
  pub status:          IncidentStatus,
  /// Defaults to now when `None`.
  pub detected_at:     Option<DateTime<Utc>>,
}

impl NewIncident {
  /// Convenience constructor: a freshly detected incident.
  pub fn new(organization_id: Uuid, title: impl Into<String>) -> Self {
    Self {
      organization_id,
      title: title.into(),
      status: IncidentStatus::Detected,
      detected_at: None,
    }
  }
}

//! Status change records — the append-only audit trail.
//!
//! One record per real transition: who, when, from, to, and an optional
//! free-text comment. Records are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::IncidentStatus;

/// One committed status transition. Immutable once created; presented
/// most-recent-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRecord {
  pub record_id:       Uuid,
  pub incident_id:     Uuid,
  pub actor_id:        Uuid,
  /// Server-assigned; never changes after creation.
  pub recorded_at:     DateTime<Utc>,
  pub previous_status: IncidentStatus,
  pub new_status:      IncidentStatus,
  pub comment:         Option<String>,
}

/// Input to [`IncidentStore::append_status_change`](crate::store::IncidentStore::append_status_change).
/// `record_id` and `recorded_at` are set by the store.
#[derive(Debug, Clone)]
pub struct NewStatusChange {
  pub incident_id:     Uuid,
  pub actor_id:        Uuid,
  pub previous_status: IncidentStatus,
  pub new_status:      IncidentStatus,
  pub comment:         Option<String>,
}

//! The detailed, externally-visible projection of an incident.
//!
//! Never stored, always derived: [`DetailedIncidentView::render`] takes the
//! relevant pieces of state (incident, history, the requesting user's seen
//! mark) as explicit inputs and mutates nothing. A torn read — a view built
//! from a slightly stale version/mark pair — is acceptable and self-corrects
//! on the next render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  history::StatusChangeRecord, incident::Incident, seen::SeenMark,
  status::IncidentStatus,
};

/// The serialized read model handed to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedIncidentView {
  pub id:              Uuid,
  pub organization_id: Uuid,
  pub title:           String,
  /// Integer wire value, per [`IncidentStatus`]'s serde representation.
  pub status:          IncidentStatus,
  /// Lower-case status name, for humans reading the payload.
  pub status_name:     String,
  pub status_version:  i64,
  pub detected_at:     DateTime<Utc>,
  pub closed_at:       Option<DateTime<Utc>>,
  /// Status change records, most-recent-first.
  pub history:         Vec<StatusChangeRecord>,
  /// Whether the requesting user's acknowledgement matches the current
  /// `status_version`. False when the user never acknowledged.
  pub has_seen_current_state: bool,
}

impl DetailedIncidentView {
  /// Build the view for one incident and one requesting user.
  ///
  /// `history` is passed through in the order given (callers fetch it
  /// most-recent-first); `seen_mark` is the requesting user's mark, if any.
  pub fn render(
    incident: &Incident,
    history: Vec<StatusChangeRecord>,
    seen_mark: Option<&SeenMark>,
  ) -> Self {
    let has_seen_current_state =
      seen_mark.is_some_and(|m| m.seen_at_version == incident.status_version);

    Self {
      id: incident.id,
      organization_id: incident.organization_id,
      title: incident.title.clone(),
      status: incident.status,
      status_name: incident.status.name().to_owned(),
      status_version: incident.status_version,
      detected_at: incident.detected_at,
      closed_at: incident.closed_at,
      history,
      has_seen_current_state,
    }
  }
}

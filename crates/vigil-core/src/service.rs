//! `IncidentStatusService` — version-guarded status transitions, audit
//! history, and per-user acknowledgement.
//!
//! The service holds no locks across requests. The critical section is the
//! single conditional write inside the store, so readers and the seen-mark
//! path are never blocked, and a caller that loses the race can simply
//! re-read and retry.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  history::NewStatusChange,
  incident::Incident,
  notify::{NotificationHook, StatusChangeEvent},
  seen::SeenMark,
  status::IncidentStatus,
  store::{IncidentStore, UpdateOutcome},
};

/// Orchestrates conditional status transitions against an [`IncidentStore`],
/// appending audit records and emitting [`StatusChangeEvent`]s to a
/// [`NotificationHook`].
pub struct IncidentStatusService<S, N> {
  store: S,
  hook:  N,
}

impl<S, N> IncidentStatusService<S, N>
where
  S: IncidentStore,
  N: NotificationHook,
{
  pub fn new(store: S, hook: N) -> Self { Self { store, hook } }

  /// Access the underlying store, e.g. for read-only view assembly.
  pub fn store(&self) -> &S { &self.store }

  /// Apply a status transition guarded by `expected_version`.
  ///
  /// Fails with [`Error::ConcurrentModification`] when the incident's
  /// version no longer matches — whether the caller's observation was
  /// already stale, or another writer won the race between our read and
  /// the conditional write. Both cases are retryable: re-read and
  /// re-apply. No partial side effect is produced before the conditional
  /// write commits.
  ///
  /// Setting the status the incident already has is an idempotent no-op:
  /// no version bump, no history record, no notification.
  pub async fn update_status(
    &self,
    organization_id: Uuid,
    incident_id: Uuid,
    expected_version: i64,
    new_status: IncidentStatus,
    actor_id: Uuid,
    comment: Option<String>,
  ) -> Result<Incident> {
    let incident = self
      .store
      .get_incident(organization_id, incident_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IncidentNotFound(incident_id))?;

    if expected_version != incident.status_version {
      return Err(Error::ConcurrentModification {
        incident_id,
        attempted: new_status,
      });
    }

    if new_status == incident.status {
      // Keeps repeated identical requests out of the audit trail.
      return Ok(incident);
    }

    let previous_status = incident.status;
    let closed_at = new_status.is_closed().then(Utc::now);

    let refreshed = match self
      .store
      .conditional_update_status(
        incident_id,
        expected_version,
        new_status,
        closed_at,
      )
      .await
      .map_err(Error::store)?
    {
      UpdateOutcome::Applied(incident) => incident,
      UpdateOutcome::VersionMismatch => {
        return Err(Error::ConcurrentModification {
          incident_id,
          attempted: new_status,
        });
      }
      UpdateOutcome::NotFound => {
        return Err(Error::IncidentNotFound(incident_id));
      }
    };

    // The status is committed from here on. The audit record and the
    // notification are best-effort side records; their failures are logged
    // and never surfaced as a failure of the committed transition.
    if let Err(e) = self
      .store
      .append_status_change(NewStatusChange {
        incident_id,
        actor_id,
        previous_status,
        new_status,
        comment,
      })
      .await
    {
      warn!(
        %incident_id,
        error = %e,
        "status change committed but history append failed"
      );
    }

    if let Err(e) = self
      .hook
      .notify(StatusChangeEvent {
        incident_id,
        previous_status,
        new_status,
        actor_id,
      })
      .await
    {
      warn!(%incident_id, error = %e, "notification hook delivery failed");
    }

    Ok(refreshed)
  }

  /// Record that `user_id` has seen the incident's current state.
  ///
  /// Latest write wins; no version guard by design. An acknowledgement
  /// racing a status change is not a correctness hazard — the user simply
  /// re-acknowledges on the next render.
  pub async fn mark_seen(
    &self,
    organization_id: Uuid,
    incident_id: Uuid,
    user_id: Uuid,
  ) -> Result<SeenMark> {
    let incident = self
      .store
      .get_incident(organization_id, incident_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::IncidentNotFound(incident_id))?;

    self
      .store
      .upsert_seen_mark(incident_id, user_id, incident.status_version)
      .await
      .map_err(Error::store)
  }
}

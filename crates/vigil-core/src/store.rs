//! The `IncidentStore` trait and the conditional-update outcome type.
//!
//! The trait is implemented by storage backends (e.g. `vigil-store-sqlite`).
//! Higher layers (`vigil-api`, the service) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  history::{NewStatusChange, StatusChangeRecord},
  incident::{Incident, NewIncident},
  seen::SeenMark,
  status::IncidentStatus,
};

// ─── Conditional update outcome ──────────────────────────────────────────────

/// Outcome of [`IncidentStore::conditional_update_status`].
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
  /// The write matched `expected_version` and committed; carries the
  /// refreshed incident.
  Applied(Incident),
  /// Another writer bumped the version between the caller's read and this
  /// write. The incident is untouched by this call.
  VersionMismatch,
  /// No incident with that id exists.
  NotFound,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an incident store backend.
///
/// Only [`conditional_update_status`](Self::conditional_update_status) may
/// mutate `status`/`status_version`; every other operation is read-only with
/// respect to those fields. Status change records are append-only; seen
/// marks are latest-write-wins upserts.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait IncidentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Incidents ─────────────────────────────────────────────────────────

  /// Create and persist a new incident with `status_version = 0`.
  fn create_incident(
    &self,
    input: NewIncident,
  ) -> impl Future<Output = Result<Incident, Self::Error>> + Send + '_;

  /// Org-scoped read. An id belonging to another organization behaves
  /// exactly like a missing id.
  fn get_incident(
    &self,
    organization_id: Uuid,
    incident_id: Uuid,
  ) -> impl Future<Output = Result<Option<Incident>, Self::Error>> + Send + '_;

  /// All incidents owned by an organization, most recently detected first.
  fn list_incidents(
    &self,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Incident>, Self::Error>> + Send + '_;

  /// The single atomic mutation of `status`/`status_version`.
  ///
  /// Implementations must express this as one compare-and-swap-style
  /// write — `SET status = ?, status_version = status_version + 1,
  /// closed_at = ? WHERE incident_id = ? AND status_version = ?` — so that
  /// exactly one of N racing callers holding the same `expected_version`
  /// observes [`UpdateOutcome::Applied`].
  fn conditional_update_status(
    &self,
    incident_id: Uuid,
    expected_version: i64,
    new_status: IncidentStatus,
    closed_at: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<UpdateOutcome, Self::Error>> + Send + '_;

  // ── Status history — append-only ──────────────────────────────────────

  /// Append one audit record. `record_id` and `recorded_at` are assigned by
  /// the store.
  fn append_status_change(
    &self,
    input: NewStatusChange,
  ) -> impl Future<Output = Result<StatusChangeRecord, Self::Error>> + Send + '_;

  /// Status change records for an incident, most-recent-first. `limit`
  /// caps the result when set.
  fn list_status_changes(
    &self,
    incident_id: Uuid,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<StatusChangeRecord>, Self::Error>> + Send + '_;

  // ── Seen marks ────────────────────────────────────────────────────────

  /// Upsert the (incident, user) acknowledgement mark. `seen_at` is
  /// assigned by the store.
  fn upsert_seen_mark(
    &self,
    incident_id: Uuid,
    user_id: Uuid,
    seen_at_version: i64,
  ) -> impl Future<Output = Result<SeenMark, Self::Error>> + Send + '_;

  /// Retrieve the acknowledgement mark for a (incident, user) pair, if any.
  fn get_seen_mark(
    &self,
    incident_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<SeenMark>, Self::Error>> + Send + '_;
}

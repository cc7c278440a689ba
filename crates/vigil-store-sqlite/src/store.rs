//! [`SqliteStore`] — the SQLite implementation of [`IncidentStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;
use vigil_core::{
  history::{NewStatusChange, StatusChangeRecord},
  incident::{Incident, NewIncident},
  seen::SeenMark,
  status::IncidentStatus,
  store::{IncidentStore, UpdateOutcome},
};

use crate::{
  Error, Result,
  encode::{
    RawIncident, RawSeenMark, RawStatusChange, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A vigil incident store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch an incident by id regardless of organization — used to refresh
  /// after a conditional write and to distinguish a version mismatch from a
  /// missing row.
  async fn fetch_incident(&self, incident_id: Uuid) -> Result<Option<Incident>> {
    let id_str = encode_uuid(incident_id);

    let raw: Option<RawIncident> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT incident_id, organization_id, title, status,
                      status_version, detected_at, closed_at
               FROM incidents WHERE incident_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawIncident {
                  incident_id:     row.get(0)?,
                  organization_id: row.get(1)?,
                  title:           row.get(2)?,
                  status:          row.get(3)?,
                  status_version:  row.get(4)?,
                  detected_at:     row.get(5)?,
                  closed_at:       row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIncident::into_incident).transpose()
  }
}

// ─── IncidentStore impl ──────────────────────────────────────────────────────

impl IncidentStore for SqliteStore {
  type Error = Error;

  // ── Incidents ─────────────────────────────────────────────────────────────

  async fn create_incident(&self, input: NewIncident) -> Result<Incident> {
    let now = Utc::now();
    let incident = Incident {
      id:              Uuid::new_v4(),
      organization_id: input.organization_id,
      title:           input.title,
      status:          input.status,
      status_version:  0,
      detected_at:     input.detected_at.unwrap_or(now),
      // Keep the closed_at invariant even for incidents born closed.
      closed_at:       input.status.is_closed().then_some(now),
    };

    let id_str        = encode_uuid(incident.id);
    let org_str       = encode_uuid(incident.organization_id);
    let title         = incident.title.clone();
    let status_raw    = incident.status.as_raw();
    let detected_str  = encode_dt(incident.detected_at);
    let closed_str    = incident.closed_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO incidents (
             incident_id, organization_id, title, status,
             status_version, detected_at, closed_at
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
          rusqlite::params![
            id_str, org_str, title, status_raw, detected_str, closed_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(incident)
  }

  async fn get_incident(
    &self,
    organization_id: Uuid,
    incident_id: Uuid,
  ) -> Result<Option<Incident>> {
    Ok(
      self
        .fetch_incident(incident_id)
        .await?
        .filter(|i| i.organization_id == organization_id),
    )
  }

  async fn list_incidents(&self, organization_id: Uuid) -> Result<Vec<Incident>> {
    let org_str = encode_uuid(organization_id);

    let raws: Vec<RawIncident> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT incident_id, organization_id, title, status,
                  status_version, detected_at, closed_at
           FROM incidents
           WHERE organization_id = ?1
           ORDER BY detected_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![org_str], |row| {
            Ok(RawIncident {
              incident_id:     row.get(0)?,
              organization_id: row.get(1)?,
              title:           row.get(2)?,
              status:          row.get(3)?,
              status_version:  row.get(4)?,
              detected_at:     row.get(5)?,
              closed_at:       row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawIncident::into_incident).collect()
  }

  async fn conditional_update_status(
    &self,
    incident_id: Uuid,
    expected_version: i64,
    new_status: IncidentStatus,
    closed_at: Option<DateTime<Utc>>,
  ) -> Result<UpdateOutcome> {
    let id_str     = encode_uuid(incident_id);
    let status_raw = new_status.as_raw();
    let closed_str = closed_at.map(encode_dt);

    // The compare-and-swap: the version predicate makes this UPDATE match
    // for exactly one of N racing callers holding the same
    // `expected_version`. The re-read lives in the same closure so the
    // returned row is this write's state, not a later writer's — no other
    // statement can run on the connection in between.
    let (affected, raw) = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE incidents
           SET status = ?1,
               status_version = status_version + 1,
               closed_at = ?2
           WHERE incident_id = ?3 AND status_version = ?4",
          rusqlite::params![status_raw, closed_str, id_str, expected_version],
        )?;

        let raw: Option<RawIncident> = conn
          .query_row(
            "SELECT incident_id, organization_id, title, status,
                    status_version, detected_at, closed_at
             FROM incidents WHERE incident_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawIncident {
                incident_id:     row.get(0)?,
                organization_id: row.get(1)?,
                title:           row.get(2)?,
                status:          row.get(3)?,
                status_version:  row.get(4)?,
                detected_at:     row.get(5)?,
                closed_at:       row.get(6)?,
              })
            },
          )
          .optional()?;

        Ok((affected, raw))
      })
      .await?;

    match (affected, raw) {
      (1, Some(raw)) => Ok(UpdateOutcome::Applied(raw.into_incident()?)),
      // Zero rows matched but the row exists: the version moved.
      (_, Some(_)) => Ok(UpdateOutcome::VersionMismatch),
      _ => Ok(UpdateOutcome::NotFound),
    }
  }

  // ── Status history — append-only ──────────────────────────────────────────

  async fn append_status_change(
    &self,
    input: NewStatusChange,
  ) -> Result<StatusChangeRecord> {
    let record = StatusChangeRecord {
      record_id:       Uuid::new_v4(),
      incident_id:     input.incident_id,
      actor_id:        input.actor_id,
      recorded_at:     Utc::now(),
      previous_status: input.previous_status,
      new_status:      input.new_status,
      comment:         input.comment,
    };

    let record_id_str   = encode_uuid(record.record_id);
    let incident_id_str = encode_uuid(record.incident_id);
    let actor_id_str    = encode_uuid(record.actor_id);
    let recorded_str    = encode_dt(record.recorded_at);
    let previous_raw    = record.previous_status.as_raw();
    let new_raw         = record.new_status.as_raw();
    let comment         = record.comment.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO status_changes (
             record_id, incident_id, actor_id, recorded_at,
             previous_status, new_status, comment
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            record_id_str,
            incident_id_str,
            actor_id_str,
            recorded_str,
            previous_raw,
            new_raw,
            comment,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_status_changes(
    &self,
    incident_id: Uuid,
    limit: Option<usize>,
  ) -> Result<Vec<StatusChangeRecord>> {
    let id_str = encode_uuid(incident_id);
    // SQLite's LIMIT -1 means "no limit".
    let limit = limit.map_or(-1, |n| n as i64);

    let raws: Vec<RawStatusChange> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, incident_id, actor_id, recorded_at,
                  previous_status, new_status, comment
           FROM status_changes
           WHERE incident_id = ?1
           ORDER BY recorded_at DESC, rowid DESC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit], |row| {
            Ok(RawStatusChange {
              record_id:       row.get(0)?,
              incident_id:     row.get(1)?,
              actor_id:        row.get(2)?,
              recorded_at:     row.get(3)?,
              previous_status: row.get(4)?,
              new_status:      row.get(5)?,
              comment:         row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStatusChange::into_record).collect()
  }

  // ── Seen marks ────────────────────────────────────────────────────────────

  async fn upsert_seen_mark(
    &self,
    incident_id: Uuid,
    user_id: Uuid,
    seen_at_version: i64,
  ) -> Result<SeenMark> {
    let mark = SeenMark {
      incident_id,
      user_id,
      seen_at_version,
      seen_at: Utc::now(),
    };

    let incident_id_str = encode_uuid(incident_id);
    let user_id_str     = encode_uuid(user_id);
    let seen_at_str     = encode_dt(mark.seen_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO seen_marks (incident_id, user_id, seen_at_version, seen_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (incident_id, user_id) DO UPDATE SET
             seen_at_version = excluded.seen_at_version,
             seen_at         = excluded.seen_at",
          rusqlite::params![
            incident_id_str,
            user_id_str,
            seen_at_version,
            seen_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(mark)
  }

  async fn get_seen_mark(
    &self,
    incident_id: Uuid,
    user_id: Uuid,
  ) -> Result<Option<SeenMark>> {
    let incident_id_str = encode_uuid(incident_id);
    let user_id_str     = encode_uuid(user_id);

    let raw: Option<RawSeenMark> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT incident_id, user_id, seen_at_version, seen_at
               FROM seen_marks
               WHERE incident_id = ?1 AND user_id = ?2",
              rusqlite::params![incident_id_str, user_id_str],
              |row| {
                Ok(RawSeenMark {
                  incident_id:     row.get(0)?,
                  user_id:         row.get(1)?,
                  seen_at_version: row.get(2)?,
                  seen_at:         row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSeenMark::into_mark).transpose()
  }
}

//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings (which sort lexicographically
//! in recorded order), statuses as their integer wire values, and UUIDs as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vigil_core::{
  history::StatusChangeRecord, incident::Incident, seen::SeenMark,
  status::IncidentStatus,
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── IncidentStatus ──────────────────────────────────────────────────────────

pub fn decode_status(raw: i64) -> Result<IncidentStatus> {
  Ok(IncidentStatus::from_raw(raw)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read from an `incidents` row.
pub struct RawIncident {
  pub incident_id:     String,
  pub organization_id: String,
  pub title:           String,
  pub status:          i64,
  pub status_version:  i64,
  pub detected_at:     String,
  pub closed_at:       Option<String>,
}

impl RawIncident {
  pub fn into_incident(self) -> Result<Incident> {
    Ok(Incident {
      id:              decode_uuid(&self.incident_id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      title:           self.title,
      status:          decode_status(self.status)?,
      status_version:  self.status_version,
      detected_at:     decode_dt(&self.detected_at)?,
      closed_at:       self.closed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw column values read from a `status_changes` row.
pub struct RawStatusChange {
  pub record_id:       String,
  pub incident_id:     String,
  pub actor_id:        String,
  pub recorded_at:     String,
  pub previous_status: i64,
  pub new_status:      i64,
  pub comment:         Option<String>,
}

impl RawStatusChange {
  pub fn into_record(self) -> Result<StatusChangeRecord> {
    Ok(StatusChangeRecord {
      record_id:       decode_uuid(&self.record_id)?,
      incident_id:     decode_uuid(&self.incident_id)?,
      actor_id:        decode_uuid(&self.actor_id)?,
      recorded_at:     decode_dt(&self.recorded_at)?,
      previous_status: decode_status(self.previous_status)?,
      new_status:      decode_status(self.new_status)?,
      comment:         self.comment,
    })
  }
}

/// Raw column values read from a `seen_marks` row.
pub struct RawSeenMark {
  pub incident_id:     String,
  pub user_id:         String,
  pub seen_at_version: i64,
  pub seen_at:         String,
}

impl RawSeenMark {
  pub fn into_mark(self) -> Result<SeenMark> {
    Ok(SeenMark {
      incident_id:     decode_uuid(&self.incident_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      seen_at_version: self.seen_at_version,
      seen_at:         decode_dt(&self.seen_at)?,
    })
  }
}

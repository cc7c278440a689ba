//! Error types for `vigil-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::status::IncidentStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("incident not found: {0}")]
  IncidentNotFound(Uuid),

  /// A raw status value outside the enumeration. The message carries the
  /// full accepted set so API clients can self-correct.
  #[error("invalid value for status: {given}; valid values: {accepted:?}")]
  InvalidStatusValue { given: i64, accepted: Vec<i64> },

  /// The incident's status changed between the caller's observation and the
  /// write attempt. Retryable: re-read the incident and re-apply.
  #[error(
    "status of incident {incident_id} changed concurrently while setting {attempted}"
  )]
  ConcurrentModification {
    incident_id: Uuid,
    attempted:   IncidentStatus,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error at the core/store seam.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! The incident status vocabulary.
//!
//! Statuses are a closed set with stable integer wire values. The gaps in
//! the numbering leave room for severity levels between `Warning` and
//! `Critical` without renumbering existing clients.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The state an incident is in. `Closed` is the terminal state.
///
/// Serialises as its integer wire value on every API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum IncidentStatus {
  Detected,
  Warning,
  Critical,
  Closed,
}

impl IncidentStatus {
  /// Every accepted status, in wire-value order.
  pub const ALL: [Self; 4] =
    [Self::Detected, Self::Closed, Self::Warning, Self::Critical];

  /// The stable integer used on the wire and in storage.
  pub const fn as_raw(self) -> i64 {
    match self {
      Self::Detected => 0,
      Self::Closed => 2,
      Self::Warning => 10,
      Self::Critical => 20,
    }
  }

  /// Map an externally supplied raw value onto the enumeration.
  ///
  /// Unknown values are rejected with [`Error::InvalidStatusValue`], which
  /// reports the full accepted set.
  pub fn from_raw(raw: i64) -> Result<Self> {
    match raw {
      0 => Ok(Self::Detected),
      2 => Ok(Self::Closed),
      10 => Ok(Self::Warning),
      20 => Ok(Self::Critical),
      other => Err(Error::InvalidStatusValue {
        given:    other,
        accepted: Self::ALL.map(Self::as_raw).to_vec(),
      }),
    }
  }

  /// `closed_at` on the incident is set exactly while this returns `true`.
  pub const fn is_closed(self) -> bool { matches!(self, Self::Closed) }

  /// Lower-case name used in log lines and error messages.
  pub const fn name(self) -> &'static str {
    match self {
      Self::Detected => "detected",
      Self::Warning => "warning",
      Self::Critical => "critical",
      Self::Closed => "closed",
    }
  }
}

impl From<IncidentStatus> for i64 {
  fn from(status: IncidentStatus) -> Self { status.as_raw() }
}

impl TryFrom<i64> for IncidentStatus {
  type Error = Error;

  fn try_from(raw: i64) -> Result<Self> { Self::from_raw(raw) }
}

impl std::fmt::Display for IncidentStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

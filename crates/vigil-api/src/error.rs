//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Optimistic-concurrency conflict. Distinct from `BadRequest` so client
  /// retry logic can branch: re-fetch and retry here, fix the request there.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<vigil_core::Error> for ApiError {
  fn from(e: vigil_core::Error) -> Self {
    match e {
      vigil_core::Error::IncidentNotFound(id) => {
        Self::NotFound(format!("incident {id} not found"))
      }
      // The Display impl already enumerates the accepted values.
      e @ vigil_core::Error::InvalidStatusValue { .. } => {
        Self::BadRequest(e.to_string())
      }
      vigil_core::Error::ConcurrentModification { attempted, .. } => {
        Self::Conflict(format!(
          "status changed concurrently; could not set status to {attempted}"
        ))
      }
      vigil_core::Error::Store(e) => Self::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

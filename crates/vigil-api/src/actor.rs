//! Actor identity extractor.
//!
//! Authentication and authorization run upstream of this service; the
//! boundary hands us an already-validated identity in the `x-vigil-actor`
//! header and we trust it. The extractor only checks that the header is
//! present and shaped like a UUID.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the validated actor/user id.
pub const ACTOR_HEADER: &str = "x-vigil-actor";

/// The identity on whose behalf the request runs. Doubles as the audit
/// `actor_id` for writes and the `user_id` for seen marks.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

impl<S> FromRequestParts<S> for Actor
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let value = parts
      .headers
      .get(ACTOR_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| {
        ApiError::BadRequest(format!("missing {ACTOR_HEADER} header"))
      })?;

    let id = Uuid::parse_str(value).map_err(|_| {
      ApiError::BadRequest(format!("{ACTOR_HEADER} is not a valid uuid"))
    })?;

    Ok(Self(id))
  }
}

//! Handlers for the organization-scoped `/incidents` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/organizations/:org/incidents` | All incidents for the tenant |
//! | `POST` | `/organizations/:org/incidents` | Body: [`CreateIncidentBody`]; 201 + view |
//! | `GET`  | `/organizations/:org/incidents/:id` | [`DetailedIncidentView`] for the requesting actor |
//! | `PUT`  | `/organizations/:org/incidents/:id` | Body: [`UpdateIncidentBody`]; returns the refreshed view |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use vigil_core::{
  incident::{Incident, NewIncident},
  notify::NotificationHook,
  service::IncidentStatusService,
  status::IncidentStatus,
  store::IncidentStore,
  view::DetailedIncidentView,
};

use crate::error::ApiError;
use crate::actor::Actor;

/// History entries included in a detailed view. The full log stays in the
/// store; the view is a bounded, most-recent-first window.
const HISTORY_LIMIT: usize = 100;

type Service<S, N> = Arc<IncidentStatusService<S, N>>;

// ─── View assembly ────────────────────────────────────────────────────────────

/// Fetch the pieces the pure projection needs and render them.
async fn assemble_view<S, N>(
  service: &IncidentStatusService<S, N>,
  incident: &Incident,
  user_id: Uuid,
) -> Result<DetailedIncidentView, ApiError>
where
  S: IncidentStore,
  N: NotificationHook,
{
  let history = service
    .store()
    .list_status_changes(incident.id, Some(HISTORY_LIMIT))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let seen_mark = service
    .store()
    .get_seen_mark(incident.id, user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(DetailedIncidentView::render(incident, history, seen_mark.as_ref()))
}

async fn fetch_incident<S, N>(
  service: &IncidentStatusService<S, N>,
  organization_id: Uuid,
  incident_id: Uuid,
) -> Result<Incident, ApiError>
where
  S: IncidentStore,
  N: NotificationHook,
{
  service
    .store()
    .get_incident(organization_id, incident_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("incident {incident_id} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /organizations/:org/incidents`
pub async fn list<S, N>(
  State(service): State<Service<S, N>>,
  Path(org_id): Path<Uuid>,
) -> Result<Json<Vec<Incident>>, ApiError>
where
  S: IncidentStore,
  N: NotificationHook,
{
  let incidents = service
    .store()
    .list_incidents(org_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(incidents))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateIncidentBody {
  pub title:       String,
  /// Raw status wire value; defaults to `Detected`.
  pub status:      Option<i64>,
  /// Defaults to now.
  pub detected_at: Option<DateTime<Utc>>,
}

/// `POST /organizations/:org/incidents` — returns 201 + the detailed view.
pub async fn create<S, N>(
  State(service): State<Service<S, N>>,
  Path(org_id): Path<Uuid>,
  Actor(actor_id): Actor,
  Json(body): Json<CreateIncidentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IncidentStore,
  N: NotificationHook,
{
  let status = match body.status {
    Some(raw) => IncidentStatus::from_raw(raw)?,
    None => IncidentStatus::Detected,
  };

  let incident = service
    .store()
    .create_incident(NewIncident {
      organization_id: org_id,
      title: body.title,
      status,
      detected_at: body.detected_at,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let view = assemble_view(&service, &incident, actor_id).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /organizations/:org/incidents/:id`
pub async fn get_one<S, N>(
  State(service): State<Service<S, N>>,
  Path((org_id, incident_id)): Path<(Uuid, Uuid)>,
  Actor(user_id): Actor,
) -> Result<Json<DetailedIncidentView>, ApiError>
where
  S: IncidentStore,
  N: NotificationHook,
{
  let incident = fetch_incident(&service, org_id, incident_id).await?;
  let view = assemble_view(&service, &incident, user_id).await?;
  Ok(Json(view))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /organizations/:org/incidents/:id`.
///
/// `status` and `has_seen` are independent: either or both may be present.
/// `expected_version` lets clients carry the optimistic-concurrency token
/// end-to-end; when absent, the version read at the start of this request
/// is used, so only a mid-request race can conflict.
#[derive(Debug, Deserialize)]
pub struct UpdateIncidentBody {
  pub status:           Option<i64>,
  pub comment:          Option<String>,
  pub has_seen:         Option<bool>,
  pub expected_version: Option<i64>,
}

/// `PUT /organizations/:org/incidents/:id` — returns the refreshed view.
pub async fn update<S, N>(
  State(service): State<Service<S, N>>,
  Path((org_id, incident_id)): Path<(Uuid, Uuid)>,
  Actor(actor_id): Actor,
  Json(body): Json<UpdateIncidentBody>,
) -> Result<Json<DetailedIncidentView>, ApiError>
where
  S: IncidentStore,
  N: NotificationHook,
{
  let mut incident = fetch_incident(&service, org_id, incident_id).await?;

  if let Some(raw) = body.status {
    let new_status = IncidentStatus::from_raw(raw)?;
    let expected_version =
      body.expected_version.unwrap_or(incident.status_version);

    incident = service
      .update_status(
        org_id,
        incident_id,
        expected_version,
        new_status,
        actor_id,
        body.comment,
      )
      .await?;
  }

  if body.has_seen == Some(true) {
    service.mark_seen(org_id, incident_id, actor_id).await?;
  }

  let view = assemble_view(&service, &incident, actor_id).await?;
  Ok(Json(view))
}

//! JSON REST API for vigil.
//!
//! Exposes an axum [`Router`] backed by an
//! [`IncidentStatusService`](vigil_core::service::IncidentStatusService)
//! over any [`vigil_core::store::IncidentStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility; the actor identity arrives
//! pre-validated in a header (see [`actor`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", vigil_api::api_router(service.clone()))
//! ```

pub mod actor;
pub mod error;
pub mod incidents;

use std::sync::Arc;

use axum::{Router, routing::get};
use vigil_core::{
  notify::NotificationHook, service::IncidentStatusService,
  store::IncidentStore,
};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(
  service: Arc<IncidentStatusService<S, N>>,
) -> Router<()>
where
  S: IncidentStore + 'static,
  N: NotificationHook + 'static,
{
  Router::new()
    .route(
      "/organizations/{org_id}/incidents",
      get(incidents::list::<S, N>).post(incidents::create::<S, N>),
    )
    .route(
      "/organizations/{org_id}/incidents/{incident_id}",
      get(incidents::get_one::<S, N>).put(incidents::update::<S, N>),
    )
    .with_state(service)
}

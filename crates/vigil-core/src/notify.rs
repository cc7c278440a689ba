//! Downstream notification hook for committed status transitions.

use std::future::Future;

use uuid::Uuid;

use crate::status::IncidentStatus;

/// Payload handed to the hook after a real transition commits. No event is
/// emitted for idempotent no-op updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeEvent {
  pub incident_id:     Uuid,
  pub previous_status: IncidentStatus,
  pub new_status:      IncidentStatus,
  pub actor_id:        Uuid,
}

/// Fire-and-forget consumer of committed transitions.
///
/// Delivery failures belong to the hook's owner: the service logs them and
/// never rolls back the already-committed status change.
pub trait NotificationHook: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notify(
    &self,
    event: StatusChangeEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// A hook that drops every event. The default when no downstream consumer
/// is wired up, and handy in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHook;

impl NotificationHook for NullHook {
  type Error = std::convert::Infallible;

  async fn notify(&self, _event: StatusChangeEvent) -> Result<(), Self::Error> {
    Ok(())
  }
}

//! Router-level tests: the full GET/PUT surface against an in-memory
//! SQLite store, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;
use vigil_api::actor::ACTOR_HEADER;
use vigil_core::{notify::NullHook, service::IncidentStatusService};
use vigil_store_sqlite::SqliteStore;

async fn router() -> Router {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let service = Arc::new(IncidentStatusService::new(store, NullHook));
  vigil_api::api_router(service)
}

fn request(
  method: &str,
  uri: &str,
  actor: Option<Uuid>,
  body: Option<Value>,
) -> Request<Body> {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(actor) = actor {
    builder = builder.header(ACTOR_HEADER, actor.to_string());
  }
  match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  }
}

async fn body_json(response: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

/// POST a fresh incident and return its id.
async fn create_incident(app: &Router, org: Uuid, actor: Uuid) -> Uuid {
  let response = app
    .clone()
    .oneshot(request(
      "POST",
      &format!("/organizations/{org}/incidents"),
      Some(actor),
      Some(json!({ "title": "p99 latency spike" })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);
  let view = body_json(response).await;
  view["id"].as_str().unwrap().parse().unwrap()
}

async fn put_status(
  app: &Router,
  org: Uuid,
  incident: Uuid,
  actor: Uuid,
  body: Value,
) -> (StatusCode, Value) {
  let response = app
    .clone()
    .oneshot(request(
      "PUT",
      &format!("/organizations/{org}/incidents/{incident}"),
      Some(actor),
      Some(body),
    ))
    .await
    .unwrap();
  let status = response.status();
  (status, body_json(response).await)
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_detected_view_at_version_zero() {
  let app = router().await;
  let org = Uuid::new_v4();
  let actor = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "POST",
      &format!("/organizations/{org}/incidents"),
      Some(actor),
      Some(json!({ "title": "disk pressure" })),
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::CREATED);

  let view = body_json(response).await;
  assert_eq!(view["status"], 0);
  assert_eq!(view["status_name"], "detected");
  assert_eq!(view["status_version"], 0);
  assert_eq!(view["history"], json!([]));
  assert_eq!(view["has_seen_current_state"], false);
}

#[tokio::test]
async fn missing_actor_header_is_bad_request() {
  let app = router().await;
  let org = Uuid::new_v4();

  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!("/organizations/{org}/incidents/{}", Uuid::new_v4()),
      None,
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_incident_is_not_found() {
  let app = router().await;
  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!(
        "/organizations/{}/incidents/{}",
        Uuid::new_v4(),
        Uuid::new_v4()
      ),
      Some(Uuid::new_v4()),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_from_wrong_organization_is_not_found() {
  let app = router().await;
  let org = Uuid::new_v4();
  let actor = Uuid::new_v4();
  let incident = create_incident(&app, org, actor).await;

  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!("/organizations/{}/incidents/{incident}", Uuid::new_v4()),
      Some(actor),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ─── Status updates ──────────────────────────────────────────────────────────

#[tokio::test]
async fn status_update_bumps_version_and_prepends_history() {
  let app = router().await;
  let org = Uuid::new_v4();
  let actor = Uuid::new_v4();
  let incident = create_incident(&app, org, actor).await;

  let (status, view) =
    put_status(&app, org, incident, actor, json!({ "status": 10 })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["status"], 10);
  assert_eq!(view["status_version"], 1);

  let (status, view) = put_status(
    &app,
    org,
    incident,
    actor,
    json!({ "status": 20, "comment": "spike confirmed" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["status"], 20);
  assert_eq!(view["status_version"], 2);

  let history = view["history"].as_array().unwrap();
  assert_eq!(history.len(), 2);
  // Most-recent-first.
  assert_eq!(history[0]["previous_status"], 10);
  assert_eq!(history[0]["new_status"], 20);
  assert_eq!(history[0]["comment"], "spike confirmed");
  assert_eq!(history[1]["previous_status"], 0);
  assert_eq!(history[1]["new_status"], 10);
}

#[tokio::test]
async fn invalid_status_value_lists_accepted_set() {
  let app = router().await;
  let org = Uuid::new_v4();
  let actor = Uuid::new_v4();
  let incident = create_incident(&app, org, actor).await;

  let (status, body) =
    put_status(&app, org, incident, actor, json!({ "status": 999 })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let message = body["error"].as_str().unwrap();
  assert!(message.contains("999"), "message was: {message}");
  for accepted in ["0", "2", "10", "20"] {
    assert!(message.contains(accepted), "message was: {message}");
  }

  // No state change: version untouched, history empty.
  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!("/organizations/{org}/incidents/{incident}"),
      Some(actor),
      None,
    ))
    .await
    .unwrap();
  let view = body_json(response).await;
  assert_eq!(view["status_version"], 0);
  assert_eq!(view["history"], json!([]));
}

#[tokio::test]
async fn stale_expected_version_is_conflict() {
  let app = router().await;
  let org = Uuid::new_v4();
  let actor = Uuid::new_v4();
  let incident = create_incident(&app, org, actor).await;

  put_status(&app, org, incident, actor, json!({ "status": 10 })).await;

  // Another client still holding version 0.
  let (status, body) = put_status(
    &app,
    org,
    incident,
    actor,
    json!({ "status": 2, "expected_version": 0 }),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  let message = body["error"].as_str().unwrap();
  assert!(message.contains("closed"), "message was: {message}");
}

#[tokio::test]
async fn same_status_put_is_idempotent() {
  let app = router().await;
  let org = Uuid::new_v4();
  let actor = Uuid::new_v4();
  let incident = create_incident(&app, org, actor).await;

  put_status(&app, org, incident, actor, json!({ "status": 10 })).await;

  let (status, view) =
    put_status(&app, org, incident, actor, json!({ "status": 10 })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["status_version"], 1);
  assert_eq!(view["history"].as_array().unwrap().len(), 1);
}

// ─── Seen marks ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn has_seen_flips_with_acknowledgement_and_status_changes() {
  let app = router().await;
  let org = Uuid::new_v4();
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let incident = create_incident(&app, org, alice).await;

  // Bob acknowledges the current state.
  let (status, view) =
    put_status(&app, org, incident, bob, json!({ "has_seen": true })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["has_seen_current_state"], true);

  // Alice escalates; Bob's acknowledgement goes stale.
  put_status(&app, org, incident, alice, json!({ "status": 20 })).await;

  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!("/organizations/{org}/incidents/{incident}"),
      Some(bob),
      None,
    ))
    .await
    .unwrap();
  let view = body_json(response).await;
  assert_eq!(view["has_seen_current_state"], false);

  // Bob re-acknowledges.
  let (_, view) =
    put_status(&app, org, incident, bob, json!({ "has_seen": true })).await;
  assert_eq!(view["has_seen_current_state"], true);
}

#[tokio::test]
async fn status_and_has_seen_apply_in_one_request() {
  let app = router().await;
  let org = Uuid::new_v4();
  let actor = Uuid::new_v4();
  let incident = create_incident(&app, org, actor).await;

  let (status, view) = put_status(
    &app,
    org,
    incident,
    actor,
    json!({ "status": 10, "has_seen": true }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["status_version"], 1);
  // The mark was taken after the transition, so it matches version 1.
  assert_eq!(view["has_seen_current_state"], true);
}

// ─── End-to-end scenario ─────────────────────────────────────────────────────

#[tokio::test]
async fn warning_at_v3_escalates_to_critical_at_v4() {
  let app = router().await;
  let org = Uuid::new_v4();
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();
  let incident = create_incident(&app, org, alice).await;

  // Walk the incident to Warning at version 3.
  for raw in [10, 20, 10] {
    let (status, _) =
      put_status(&app, org, incident, alice, json!({ "status": raw })).await;
    assert_eq!(status, StatusCode::OK);
  }

  let (status, view) = put_status(
    &app,
    org,
    incident,
    alice,
    json!({
      "status": 20,
      "comment": "spike confirmed",
      "expected_version": 3,
    }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["status"], 20);
  assert_eq!(view["status_name"], "critical");
  assert_eq!(view["status_version"], 4);

  let history = view["history"].as_array().unwrap();
  assert_eq!(history[0]["previous_status"], 10);
  assert_eq!(history[0]["new_status"], 20);
  assert_eq!(history[0]["comment"], "spike confirmed");

  // Bob acknowledges; his mark lands at version 4.
  let (status, view) =
    put_status(&app, org, incident, bob, json!({ "has_seen": true })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["has_seen_current_state"], true);
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_scoped_to_the_organization() {
  let app = router().await;
  let org_a = Uuid::new_v4();
  let org_b = Uuid::new_v4();
  let actor = Uuid::new_v4();

  create_incident(&app, org_a, actor).await;
  create_incident(&app, org_a, actor).await;
  create_incident(&app, org_b, actor).await;

  let response = app
    .clone()
    .oneshot(request(
      "GET",
      &format!("/organizations/{org_a}/incidents"),
      Some(actor),
      None,
    ))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let incidents = body_json(response).await;
  assert_eq!(incidents.as_array().unwrap().len(), 2);
}

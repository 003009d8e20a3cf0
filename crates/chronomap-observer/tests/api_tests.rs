//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chronomap_core::driver::TimelineCommand;
use chronomap_core::store::EventStore;
use chronomap_observer::router::build_router;
use chronomap_observer::state::AppState;
use chronomap_types::{AnimationPhase, AnimationStatus, EventRecord, TimelineSnapshot};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

fn record(title: &str, date: &str, city: Option<&str>) -> EventRecord {
    EventRecord {
        title: title.to_owned(),
        date: date.to_owned(),
        description: None,
        lat: 48.85,
        lon: 2.35,
        city: city.map(str::to_owned),
        country: None,
    }
}

fn store() -> EventStore {
    EventStore::from_records(vec![
        record("Second", "2021-06-14", Some("Paris")),
        record("First", "2020-01-01", None),
    ])
}

fn make_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(&store()))
}

fn make_state_with_driver() -> (Arc<AppState>, mpsc::Receiver<TimelineCommand>) {
    let (tx, rx) = mpsc::channel(8);
    (Arc::new(AppState::with_commands(&store(), tx)), rx)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html_with_events_in_timeline_order() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.contains("text/html"));

    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("Chronomap"));
    let first = html.find("First").unwrap();
    let second = html.find("Second").unwrap();
    assert!(first < second);
    assert!(html.contains("Paris"));
}

#[tokio::test]
async fn test_index_with_no_events() {
    let router = build_router(Arc::new(AppState::default()));

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_to_string(response.into_body()).await;
    assert!(html.contains("No events loaded."));
}

#[tokio::test]
async fn test_events_returns_records_as_loaded() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records.first().unwrap()["title"], "Second");
    assert_eq!(records.first().unwrap()["lat"], 48.85);
}

#[tokio::test]
async fn test_get_timeline_returns_latest_snapshot() {
    let state = make_test_state();
    state.publish(&TimelineSnapshot {
        event_count: 2,
        current_index: Some(1),
        previous_index: Some(0),
        current_date: Some("2021-06-14".to_owned()),
        playing: true,
        ..TimelineSnapshot::empty()
    });
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/timeline").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["event_count"], 2);
    assert_eq!(json["current_index"], 1);
    assert_eq!(json["current_date"], "2021-06-14");
    assert_eq!(json["playing"], true);
    assert_eq!(json["animation"]["phase"], "idle");
}

#[tokio::test]
async fn test_control_without_driver_is_unavailable() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(post("/api/timeline/advance"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 503);
    assert!(json["error"].as_str().unwrap().contains("not attached"));
}

#[tokio::test]
async fn test_control_after_driver_stopped_is_unavailable() {
    let (state, rx) = make_state_with_driver();
    drop(rx);
    let router = build_router(state);

    let response = router.oneshot(post("/api/timeline/reset")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_control_endpoints_forward_commands() {
    let (state, mut rx) = make_state_with_driver();
    let cases = [
        ("/api/timeline/advance", TimelineCommand::Advance),
        ("/api/timeline/reset", TimelineCommand::Reset),
        ("/api/timeline/select/1", TimelineCommand::Select(1)),
        ("/api/timeline/drag/7", TimelineCommand::Drag(7)),
        ("/api/playback/play", TimelineCommand::Play),
        ("/api/playback/pause", TimelineCommand::Pause),
    ];

    for (uri, expected) in cases {
        let router = build_router(Arc::clone(&state));
        let response = router.oneshot(post(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["ok"], true);
        assert_eq!(rx.recv().await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_select_reports_the_requested_index() {
    let (state, mut rx) = make_state_with_driver();
    let router = build_router(state);

    let response = router
        .oneshot(post("/api/timeline/select/4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["message"], "Event 4 selected");
    assert_eq!(rx.recv().await.unwrap(), TimelineCommand::Select(4));
}

#[tokio::test]
async fn test_timeline_serves_final_frame_after_animation_completes() {
    let state = make_test_state();
    let running = TimelineSnapshot {
        event_count: 2,
        current_index: Some(1),
        animation: AnimationStatus {
            phase: AnimationPhase::Running,
            start: Some(0),
            end: Some(1),
            progress: 0.5,
            point: None,
        },
        ..TimelineSnapshot::empty()
    };
    state.publish(&running);

    let response = build_router(Arc::clone(&state))
        .oneshot(Request::get("/api/timeline").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["animation"]["phase"], "running");

    state.publish(&TimelineSnapshot {
        event_count: 2,
        current_index: Some(1),
        ..TimelineSnapshot::empty()
    });

    let response = build_router(state)
        .oneshot(Request::get("/api/timeline").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["animation"]["phase"], "idle");
    assert_eq!(json["current_index"], 1);
}

#[tokio::test]
async fn test_select_with_non_numeric_index_is_rejected() {
    let (state, mut rx) = make_state_with_driver();
    let router = build_router(state);

    let response = router
        .oneshot(post("/api/timeline/select/latest"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_control_requires_post() {
    let (state, _rx) = make_state_with_driver();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/timeline/advance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let router = build_router(make_test_state());

    let response = router
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_broadcast_reaches_subscribers() {
    let state = make_test_state();
    let mut rx = state.subscribe();

    let snapshot = TimelineSnapshot {
        event_count: 2,
        current_index: Some(0),
        ..TimelineSnapshot::empty()
    };
    assert_eq!(state.broadcast(&snapshot), 1);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.current_index, Some(0));
    assert_eq!(received.animation.phase, AnimationPhase::Idle);
}

#[tokio::test]
async fn test_broadcast_without_subscribers_is_not_an_error() {
    let state = make_test_state();
    assert_eq!(state.broadcast(&TimelineSnapshot::empty()), 0);
}

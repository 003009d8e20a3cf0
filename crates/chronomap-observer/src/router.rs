//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin map clients.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{control, handlers, ws};

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- HTML status page
/// - `GET /events` -- raw event records
/// - `GET /ws/frames` -- `WebSocket` snapshot stream
/// - `GET /api/timeline` -- latest snapshot
/// - `POST /api/timeline/{advance,reset}`
/// - `POST /api/timeline/select/{index}`, `POST /api/timeline/drag/{index}`
/// - `POST /api/playback/{play,pause}`
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page and data
        .route("/", get(handlers::index))
        .route("/events", get(handlers::list_events))
        // WebSocket
        .route("/ws/frames", get(ws::ws_frames))
        // Timeline
        .route("/api/timeline", get(handlers::get_timeline))
        .route("/api/timeline/advance", post(control::advance))
        .route("/api/timeline/reset", post(control::reset))
        .route("/api/timeline/select/{index}", post(control::select))
        .route("/api/timeline/drag/{index}", post(control::drag))
        // Playback
        .route("/api/playback/play", post(control::play))
        .route("/api/playback/pause", post(control::pause))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

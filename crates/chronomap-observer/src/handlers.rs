//! Read-only endpoint handlers for the Observer server.
//!
//! All handlers read from the shared [`AppState`]; none of them touch the
//! timeline controller.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | HTML status page with the event list |
//! | `GET` | `/events` | Raw event records as loaded |
//! | `GET` | `/api/timeline` | Latest timeline snapshot |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use minijinja::{Environment, context};

use crate::error::ObserverError;
use crate::state::AppState;

/// The status page template.
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Serve the HTML status page.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ObserverError> {
    let snapshot = state.latest();

    let mut env = Environment::new();
    env.add_template("index", INDEX_TEMPLATE)?;
    let page = env.get_template("index")?.render(context! {
        event_count => state.events.len(),
        current_date => snapshot.current_date,
        current_index => snapshot.current_index,
        phase => snapshot.animation.phase,
        playing => snapshot.playing,
        events => state.events.as_slice(),
    })?;

    Ok(Html(page))
}

/// Return the event records exactly as loaded.
pub async fn list_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.records.as_ref().clone())
}

/// Return the latest timeline snapshot.
pub async fn get_timeline(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.latest())
}

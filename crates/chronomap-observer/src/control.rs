//! Control endpoints forwarding UI actions to the timeline driver.
//!
//! Each handler sends one [`TimelineCommand`] and returns as soon as the
//! driver has accepted it; the resulting state arrives through
//! `/api/timeline` and `/ws/frames`. Indices are forwarded as given and
//! clamped by the timeline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/timeline/advance` | Step forward with animation |
//! | `POST` | `/api/timeline/reset` | Back to the first event |
//! | `POST` | `/api/timeline/select/{index}` | Select from the event list |
//! | `POST` | `/api/timeline/drag/{index}` | Move the slider |
//! | `POST` | `/api/playback/play` | Start continuous playback |
//! | `POST` | `/api/playback/pause` | Stop continuous playback |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chronomap_core::driver::TimelineCommand;
use tracing::debug;

use crate::error::ObserverError;
use crate::state::AppState;

/// Generic acknowledgement.
#[derive(Debug, serde::Serialize)]
struct CommandResponse {
    /// Whether the driver accepted the command.
    ok: bool,
    /// Human-readable message.
    message: String,
}

async fn forward(
    state: &AppState,
    command: TimelineCommand,
    message: &str,
) -> Result<Json<CommandResponse>, ObserverError> {
    state.send_command(command).await?;
    debug!(?command, "Command forwarded to timeline driver");
    Ok(Json(CommandResponse {
        ok: true,
        message: message.to_owned(),
    }))
}

/// Advance the timeline one event.
pub async fn advance(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, TimelineCommand::Advance, "Timeline advanced").await
}

/// Cancel any animation and return to the first event.
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, TimelineCommand::Reset, "Timeline reset").await
}

/// Select an event from the list.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(
        &state,
        TimelineCommand::Select(index),
        &format!("Event {index} selected"),
    )
    .await
}

/// Move the slider by hand.
pub async fn drag(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, ObserverError> {
    forward(
        &state,
        TimelineCommand::Drag(index),
        &format!("Slider moved to {index}"),
    )
    .await
}

/// Start continuous playback.
pub async fn play(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, TimelineCommand::Play, "Playback started").await
}

/// Stop continuous playback.
pub async fn pause(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    forward(&state, TimelineCommand::Pause, "Playback paused").await
}

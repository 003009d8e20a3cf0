//! Frame callback that updates the Observer API state.
//!
//! After every timeline state change, this callback broadcasts the
//! [`TimelineSnapshot`] to all connected `WebSocket` clients and publishes
//! it as the snapshot served by `GET /api/timeline`. Publishing replaces
//! the stored value without waiting on readers, so no frame is dropped.

use std::sync::Arc;

use chronomap_core::driver::FrameCallback;
use chronomap_observer::state::AppState;
use chronomap_types::TimelineSnapshot;
use tracing::trace;

/// Callback that bridges the timeline driver to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl FrameCallback for ObserverCallback {
    fn on_frame(&mut self, snapshot: &TimelineSnapshot) {
        let receivers = self.state.broadcast(snapshot);
        trace!(
            current_index = ?snapshot.current_index,
            progress = snapshot.animation.progress,
            receivers,
            "Snapshot broadcast sent"
        );

        self.state.publish(snapshot);
    }
}

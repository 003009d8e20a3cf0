//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for timeline snapshots, the
//! latest published snapshot, the raw event records served by `/events`,
//! the time-sorted events listed on the index page, and the command sender
//! into the timeline driver. Handlers never touch the timeline controller
//! directly.

use std::sync::Arc;

use chronomap_core::driver::TimelineCommand;
use chronomap_core::store::EventStore;
use chronomap_types::{Event, EventRecord, TimelineSnapshot};
use tokio::sync::{broadcast, mpsc, watch};

use crate::error::ObserverError;

/// Capacity of the broadcast channel for timeline snapshots.
///
/// A subscriber falling behind by more than this many frames receives a
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest frame.
const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for timeline snapshots.
    pub tx: broadcast::Sender<TimelineSnapshot>,
    /// The latest published snapshot. Replacing it never waits on
    /// readers, so the final frame of a run is always the one served.
    pub snapshot: Arc<watch::Sender<TimelineSnapshot>>,
    /// The event records as loaded, in source order.
    pub records: Arc<Vec<EventRecord>>,
    /// The loaded events in timeline order.
    pub events: Arc<Vec<Event>>,
    /// Command sender into the timeline driver (present while it runs).
    pub commands: Option<mpsc::Sender<TimelineCommand>>,
}

impl AppState {
    /// Create a state serving the contents of `store` with no driver
    /// attached.
    pub fn new(store: &EventStore) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(watch::Sender::new(TimelineSnapshot::empty())),
            records: Arc::new(store.records().to_vec()),
            events: Arc::new(store.events().to_vec()),
            commands: None,
        }
    }

    /// Create a state serving the contents of `store` with a driver
    /// attached.
    pub fn with_commands(store: &EventStore, commands: mpsc::Sender<TimelineCommand>) -> Self {
        Self {
            commands: Some(commands),
            ..Self::new(store)
        }
    }

    /// Subscribe to the snapshot broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TimelineSnapshot> {
        self.tx.subscribe()
    }

    /// Publish a snapshot to all connected clients.
    ///
    /// Returns the number of receivers reached; 0 when no clients are
    /// connected, which is not an error.
    pub fn broadcast(&self, snapshot: &TimelineSnapshot) -> usize {
        self.tx.send(snapshot.clone()).unwrap_or(0)
    }

    /// Store `snapshot` as the one served by `GET /api/timeline` and to
    /// newly connected `WebSocket` clients.
    pub fn publish(&self, snapshot: &TimelineSnapshot) {
        self.snapshot.send_replace(snapshot.clone());
    }

    /// A copy of the latest published snapshot.
    pub fn latest(&self) -> TimelineSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Forward a command to the timeline driver.
    pub async fn send_command(&self, command: TimelineCommand) -> Result<(), ObserverError> {
        let commands = self
            .commands
            .as_ref()
            .ok_or_else(|| ObserverError::Unavailable("timeline driver not attached".to_owned()))?;
        commands
            .send(command)
            .await
            .map_err(|e| ObserverError::Unavailable(format!("timeline driver stopped: {e}")))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&EventStore::empty())
    }
}

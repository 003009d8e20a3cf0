//! Engine binary for the Chronomap timeline map.
//!
//! This is the main entry point that wires together event loading, the
//! timeline controller, its async driver, and the Observer API. It loads
//! configuration, initializes all subsystems, and drives the timeline
//! until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `chronomap-config.yaml` plus environment
//!    overrides
//! 3. Load events from the configured file or URL
//! 4. Start the Observer API server
//! 5. Build and initialize the timeline controller
//! 6. Run the timeline driver until shutdown
//! 7. Log the result

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chronomap_core::clock::{Clock, SystemClock};
use chronomap_core::config::ChronomapConfig;
use chronomap_core::driver::{self, TimelineCommand};
use chronomap_core::playback::AutoPlay;
use chronomap_core::scene::SceneMap;
use chronomap_core::slider::SliderState;
use chronomap_core::store::EventStore;
use chronomap_core::timeline::TimelineController;
use chronomap_observer::server::ServerConfig;
use chronomap_observer::startup::spawn_observer;
use chronomap_observer::state::AppState;
use chronomap_types::LatLng;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Name of the configuration file, relative to the working directory.
const CONFIG_FILE: &str = "chronomap-config.yaml";

/// Capacity of the command channel between observer and driver.
const COMMAND_CAPACITY: usize = 64;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the observer cannot bind,
/// or the driver refuses to start. A failed event load is not an error:
/// the timeline runs empty.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("chronomap-engine starting");

    // 2. Load configuration.
    let config = load_config(Path::new(CONFIG_FILE)).context("loading configuration")?;
    info!(
        events_path = %config.data.events_path.display(),
        events_url = config.data.events_url.as_deref().unwrap_or("-"),
        animation_ms = config.animation.duration_ms,
        frame_interval_ms = config.animation.frame_interval_ms,
        observer_port = config.observer.port,
        "Configuration loaded"
    );

    // 3. Load events.
    let source = config.data.source();
    let store = EventStore::load(&source).await;
    info!(%source, events = store.len(), records = store.records().len(), "Events loaded");

    // 4. Start Observer API server.
    let (commands_tx, mut commands_rx) = mpsc::channel(COMMAND_CAPACITY);
    let app_state = Arc::new(AppState::with_commands(&store, commands_tx.clone()));
    let (observer_handle, addr) = spawn_observer(
        &ServerConfig::from(&config.observer),
        Arc::clone(&app_state),
    )
    .await
    .map_err(EngineError::from)?;
    info!(%addr, "Observer API server started");

    // 5. Build the timeline.
    let [lat, lon] = config.map.initial_center;
    let map = SceneMap::new(LatLng::new(lat, lon), config.map.initial_zoom);
    let slider = SliderState::new(store.last_index().unwrap_or(0));
    let clock = SystemClock;
    let now = clock.now_ms();
    let mut controller = TimelineController::new(store, map, slider, clock, config);
    controller.initialize(now);

    // Ctrl-C becomes a shutdown command so the driver stops between steps.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
        }
        if commands_tx.send(TimelineCommand::Shutdown).await.is_err() {
            warn!("Timeline driver already stopped");
        }
    });

    // 6. Run the timeline driver.
    let mut autoplay = AutoPlay::new();
    let mut callback = ObserverCallback::new(app_state);
    let summary = driver::run_timeline(
        &mut controller,
        &mut autoplay,
        &mut commands_rx,
        &mut callback,
    )
    .await
    .map_err(EngineError::from)?;

    // 7. Log results.
    observer_handle.abort();
    info!(
        end_reason = ?summary.end_reason,
        commands = summary.commands,
        frames = summary.frames,
        "chronomap-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist, then apply environment overrides.
fn load_config(path: &Path) -> Result<ChronomapConfig, EngineError> {
    if path.exists() {
        // from_file applies the environment overrides itself.
        return Ok(ChronomapConfig::from_file(path)?);
    }
    info!(path = %path.display(), "Config file not found, using defaults");
    let mut config = ChronomapConfig::default();
    config.apply_env_overrides()?;
    Ok(config)
}

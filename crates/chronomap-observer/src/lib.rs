//! Observer API server for the Chronomap timeline map.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Data endpoint** (`GET /events`) serving the event records as loaded
//! - **`WebSocket` endpoint** (`/ws/frames`) streaming timeline snapshots
//!   via [`tokio::sync::broadcast`]
//! - **Timeline REST endpoints** for the latest snapshot and the UI
//!   actions (advance, reset, select, drag, play, pause)
//! - **HTML status page** (`GET /`) listing the events
//!
//! # Architecture
//!
//! The timeline controller lives on the driver task. The observer reads
//! the last snapshot the driver published and forwards actions over an
//! `mpsc` channel, so no request ever runs inside a timeline step.

pub mod control;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;

//! Shared type definitions for the Chronomap timeline map.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: the event records served by the observer, the loaded events
//! the timeline engine works on, and the snapshot it publishes. Types flow
//! downstream to `TypeScript` via `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for map layer handles
//! - [`enums`] -- Marker presentation, animation phase, and action enums
//! - [`structs`] -- Events, coordinates, segments, and timeline snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AnimationPhase, IconVariant, MarkerOpacity, TimelineAction};
pub use ids::LayerId;
pub use structs::{
    AnimationStatus, Event, EventRecord, LatLng, MarkerPresentation, Popup, Segment,
    TimelineSnapshot,
};

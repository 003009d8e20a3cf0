//! Core entity structs for the Chronomap timeline map.
//!
//! [`EventRecord`] is the wire shape delivered by the data fetch. The event
//! store turns each record into an [`Event`] by parsing its calendar date
//! into a millisecond timestamp. Everything else here describes what the
//! timeline engine shows on the map at a given position.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::enums::{AnimationPhase, IconVariant, MarkerOpacity};

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LatLng {
    /// Latitude in degrees, `-90..=90`.
    pub lat: f64,
    /// Longitude in degrees, `-180..=180`.
    pub lon: f64,
}

impl LatLng {
    /// Construct a coordinate.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Linear interpolation towards `other`.
    ///
    /// `t` is clamped to `[0, 1]`; `0` yields `self`, `1` yields `other`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            lat: (other.lat - self.lat).mul_add(t, self.lat),
            lon: (other.lon - self.lon).mul_add(t, self.lon),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// One event as delivered by the data source.
///
/// Unknown JSON fields are ignored so richer datasets load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventRecord {
    /// Headline shown in the marker popup. May be empty.
    #[serde(default)]
    pub title: String,
    /// Calendar date string (e.g. `2021-06-14`).
    #[validate(length(min = 1))]
    pub date: String,
    /// Optional long-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Latitude in degrees.
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    /// Longitude in degrees.
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    /// Optional city name.
    #[serde(default)]
    pub city: Option<String>,
    /// Optional country name.
    #[serde(default)]
    pub country: Option<String>,
}

/// A loaded event with its derived timestamp. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Headline shown in the marker popup.
    pub title: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// The calendar date string as supplied by the source.
    pub date: String,
    /// Milliseconds since the Unix epoch, derived from `date`.
    #[ts(type = "number")]
    pub timestamp: i64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Optional city name.
    pub city: Option<String>,
    /// Optional country name.
    pub country: Option<String>,
}

impl Event {
    /// The event's position on the map.
    pub const fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Content of the popup bound to an event marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Popup {
    /// Event title.
    pub title: String,
    /// Event date as supplied by the source.
    pub date: String,
    /// Description, or a placeholder when the event has none.
    pub description: String,
}

// ---------------------------------------------------------------------------
// Rendered state
// ---------------------------------------------------------------------------

/// A connecting path between two consecutive visible events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Segment {
    /// Sorted index of the start event.
    pub start: usize,
    /// Sorted index of the end event.
    pub end: usize,
    /// Start coordinate.
    pub from: LatLng,
    /// End coordinate.
    pub to: LatLng,
    /// Fade opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Presentation attributes of one event marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarkerPresentation {
    /// Sorted index of the event.
    pub index: usize,
    /// Icon variant.
    pub icon: IconVariant,
    /// Opacity level.
    pub opacity: MarkerOpacity,
    /// Whether the marker is on the map.
    pub attached: bool,
}

/// Progress of the segment-drawing animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnimationStatus {
    /// Lifecycle phase.
    pub phase: AnimationPhase,
    /// Sorted index of the start event, when an animation is in flight.
    pub start: Option<usize>,
    /// Sorted index of the end event, when an animation is in flight.
    pub end: Option<usize>,
    /// Interpolation fraction in `[0, 1]`.
    pub progress: f64,
    /// The interpolated point, once the first tick has run.
    pub point: Option<LatLng>,
}

impl AnimationStatus {
    /// Status of a controller with nothing in flight.
    pub const fn idle() -> Self {
        Self {
            phase: AnimationPhase::Idle,
            start: None,
            end: None,
            progress: 0.0,
            point: None,
        }
    }
}

/// JSON-serializable view of the whole timeline, published after every
/// position change and animation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimelineSnapshot {
    /// Number of loaded events.
    pub event_count: usize,
    /// Current timeline position, `None` before the first positioning or
    /// when the dataset is empty.
    pub current_index: Option<usize>,
    /// Position before the last change.
    pub previous_index: Option<usize>,
    /// Current date label (`YYYY-MM-DD`).
    pub current_date: Option<String>,
    /// Visibility threshold in milliseconds since the epoch.
    #[ts(type = "number | null")]
    pub threshold: Option<i64>,
    /// Marker presentation, one entry per event.
    pub markers: Vec<MarkerPresentation>,
    /// Fixed segments currently drawn.
    pub segments: Vec<Segment>,
    /// Animation progress.
    pub animation: AnimationStatus,
    /// Whether continuous playback is active.
    pub playing: bool,
}

impl TimelineSnapshot {
    /// Snapshot of an empty, inert timeline.
    pub const fn empty() -> Self {
        Self {
            event_count: 0,
            current_index: None,
            previous_index: None,
            current_date: None,
            threshold: None,
            markers: Vec::new(),
            segments: Vec::new(),
            animation: AnimationStatus::idle(),
            playing: false,
        }
    }
}

impl Default for TimelineSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

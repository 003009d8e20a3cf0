//! Enumeration types for the Chronomap timeline map.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Marker presentation
// ---------------------------------------------------------------------------

/// Icon variant shown for an event marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum IconVariant {
    /// Regular-size marker for every visible event that is not current.
    Normal,
    /// Enlarged marker for the event at the visibility threshold.
    Highlighted,
}

/// Opacity level of an event marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MarkerOpacity {
    /// Past events: drawn semi-transparent.
    Dim,
    /// The current event: fully opaque.
    Full,
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Lifecycle phase of the segment-drawing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AnimationPhase {
    /// No animation in flight.
    Idle,
    /// A segment is being drawn; ticks advance the interpolated point.
    Running,
    /// Cancellation was requested; the next tick finalizes and returns to idle.
    CancelRequested,
}

// ---------------------------------------------------------------------------
// Timeline actions
// ---------------------------------------------------------------------------

/// The user action that caused a timeline position change.
///
/// Only [`Advance`](Self::Advance) and [`Select`](Self::Select) may
/// trigger the drawing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TimelineAction {
    /// Step forward by one event ("play").
    Advance,
    /// Jump to an event picked from the event list.
    Select,
    /// Manual slider drag.
    Drag,
    /// Return to the first event.
    Reset,
}

impl TimelineAction {
    /// Whether a position change from this action is allowed to animate.
    pub const fn may_animate(self) -> bool {
        matches!(self, Self::Advance | Self::Select)
    }
}

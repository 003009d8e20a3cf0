//! Visibility projection: which events a timeline position shows.
//!
//! An event is visible iff its timestamp is at or before the threshold.
//! Exactly one visible event is current (highlighted icon, full opacity);
//! the remaining visible events are dimmed. Markers of events past the
//! threshold are detached from the map entirely rather than hidden.

use chronomap_types::{Event, IconVariant, LayerId, MarkerOpacity, MarkerPresentation, Popup};

use crate::config::StyleConfig;
use crate::map::{Layer, MapSurface};

/// Popup text used when an event has no description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Result of projecting the event list onto a threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// The visibility threshold in milliseconds since the epoch.
    pub threshold: i64,
    /// Sorted indices of the visible events, ascending.
    pub visible: Vec<usize>,
    /// Index of the highlighted event.
    pub current: Option<usize>,
    /// Per-event marker presentation, indexed like the event list.
    pub presentations: Vec<MarkerPresentation>,
}

/// Project `events` onto `threshold`.
///
/// The highlighted event is the one at `current_index` when its timestamp
/// equals the threshold. Otherwise (a threshold not taken from the current
/// position) it is the last event whose timestamp equals the threshold, and
/// none if no event does.
pub fn project(events: &[Event], threshold: i64, current_index: usize) -> Projection {
    let current = events
        .get(current_index)
        .filter(|event| event.timestamp == threshold)
        .map(|_| current_index)
        .or_else(|| events.iter().rposition(|event| event.timestamp == threshold));

    let mut visible = Vec::new();
    let presentations = events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let attached = event.timestamp <= threshold;
            if attached {
                visible.push(index);
            }
            let is_current = current == Some(index);
            MarkerPresentation {
                index,
                icon: if is_current {
                    IconVariant::Highlighted
                } else {
                    IconVariant::Normal
                },
                opacity: if is_current {
                    MarkerOpacity::Full
                } else {
                    MarkerOpacity::Dim
                },
                attached,
            }
        })
        .collect();

    Projection {
        threshold,
        visible,
        current,
        presentations,
    }
}

/// Popup content for an event marker.
pub fn popup_for(event: &Event) -> Popup {
    Popup {
        title: event.title.clone(),
        date: event.date.clone(),
        description: event
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_owned()),
    }
}

/// Numeric opacity for a marker opacity level.
pub fn marker_alpha(opacity: MarkerOpacity, style: &StyleConfig) -> f64 {
    match opacity {
        MarkerOpacity::Dim => style.dim_opacity.clamp(0.0, 1.0),
        MarkerOpacity::Full => 1.0,
    }
}

/// The persistent event markers, one per event, created once per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    ids: Vec<LayerId>,
}

impl MarkerSet {
    /// Create a detached marker for every event.
    pub fn create(events: &[Event], map: &mut dyn MapSurface, style: &StyleConfig) -> Self {
        let ids = events
            .iter()
            .map(|event| {
                map.create_layer(Layer::Marker {
                    position: event.position(),
                    icon: IconVariant::Normal,
                    opacity: marker_alpha(MarkerOpacity::Dim, style),
                    popup: popup_for(event),
                })
            })
            .collect();
        Self { ids }
    }

    /// Marker handles, indexed like the event list.
    pub fn ids(&self) -> &[LayerId] {
        &self.ids
    }

    /// Handle of the marker for event `index`.
    pub fn get(&self, index: usize) -> Option<LayerId> {
        self.ids.get(index).copied()
    }

    /// Apply a projection: restyle every marker, attach the visible ones,
    /// detach the rest. Attach/detach are guarded so repeated application
    /// is a no-op.
    pub fn apply(&self, projection: &Projection, map: &mut dyn MapSurface, style: &StyleConfig) {
        for (id, presentation) in self.ids.iter().zip(&projection.presentations) {
            map.set_icon(*id, presentation.icon);
            map.set_opacity(*id, marker_alpha(presentation.opacity, style));
            if presentation.attached {
                if !map.has_layer(*id) {
                    map.add_layer(*id);
                }
            } else if map.has_layer(*id) {
                map.remove_layer(*id);
            }
        }
    }
}

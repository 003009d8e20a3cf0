//! The map capability consumed by the timeline engine.
//!
//! Tile rendering and camera control belong to the host. The engine only
//! needs to create layers, attach and detach them, restyle markers, reshape
//! polylines, and move the camera. [`MapSurface`] captures exactly that.
//!
//! Attach and detach are idempotent: adding a layer that is already on the
//! map, or removing one that is not, is a no-op and never an error.

use chronomap_types::{IconVariant, LatLng, LayerId, Popup};

use crate::config::StyleConfig;

/// Stroke style of a polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    /// Stroke colour.
    pub color: String,
    /// Stroke width.
    pub weight: u32,
    /// Stroke opacity in `[0, 1]`.
    pub opacity: f64,
    /// Dash pattern; `None` draws a solid line.
    pub dash: Option<String>,
}

impl PolylineStyle {
    /// Dashed, faded style of a fixed path segment.
    pub fn segment(style: &StyleConfig, opacity: f64) -> Self {
        Self {
            color: style.path_color.clone(),
            weight: style.path_weight,
            opacity,
            dash: Some(style.path_dash.clone()),
        }
    }

    /// Solid style of the line being drawn by the animation.
    pub fn drawing(style: &StyleConfig) -> Self {
        Self {
            color: style.path_color.clone(),
            weight: style.path_weight,
            opacity: 1.0,
            dash: None,
        }
    }
}

/// A layer to create on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// An event marker with a popup.
    Marker {
        /// Marker position.
        position: LatLng,
        /// Icon variant.
        icon: IconVariant,
        /// Marker opacity in `[0, 1]`.
        opacity: f64,
        /// Popup content.
        popup: Popup,
    },
    /// A polyline through the given points.
    Polyline {
        /// The vertices.
        points: Vec<LatLng>,
        /// Stroke style.
        style: PolylineStyle,
    },
    /// A filled circle of fixed pixel radius.
    CircleMarker {
        /// Centre.
        position: LatLng,
        /// Radius in pixels.
        radius: u32,
        /// Fill colour.
        color: String,
    },
}

/// Options for an animated camera transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlyOptions {
    /// Transition duration in milliseconds.
    pub duration_ms: u64,
}

/// Map rendering and camera capability.
///
/// Methods addressing an unknown [`LayerId`] are no-ops.
pub trait MapSurface: Send {
    /// Create a layer without attaching it and return its handle.
    fn create_layer(&mut self, layer: Layer) -> LayerId;

    /// Attach a layer to the map. No-op if already attached.
    fn add_layer(&mut self, id: LayerId);

    /// Detach a layer from the map, keeping it for later re-attachment.
    /// No-op if not attached.
    fn remove_layer(&mut self, id: LayerId);

    /// Whether the layer is currently attached.
    fn has_layer(&self, id: LayerId) -> bool;

    /// Detach and forget a layer. The handle is invalid afterwards.
    fn drop_layer(&mut self, id: LayerId);

    /// Jump the camera to `center` at `zoom`.
    fn set_view(&mut self, center: LatLng, zoom: u8);

    /// Animate the camera to `center` at `zoom`.
    fn fly_to(&mut self, center: LatLng, zoom: u8, options: FlyOptions);

    /// Change a marker's icon.
    fn set_icon(&mut self, id: LayerId, icon: IconVariant);

    /// Change a marker's opacity.
    fn set_opacity(&mut self, id: LayerId, opacity: f64);

    /// Move a marker or circle marker.
    fn set_lat_lng(&mut self, id: LayerId, position: LatLng);

    /// Replace a polyline's vertices.
    fn set_lat_lngs(&mut self, id: LayerId, points: Vec<LatLng>);

    /// Create a layer and attach it in one step.
    fn add_new_layer(&mut self, layer: Layer) -> LayerId {
        let id = self.create_layer(layer);
        self.add_layer(id);
        id
    }
}

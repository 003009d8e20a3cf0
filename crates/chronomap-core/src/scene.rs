//! In-memory [`MapSurface`] implementation.
//!
//! [`SceneMap`] records every layer, whether it is attached, and where the
//! camera points. The engine runs the timeline headless against it and
//! publishes the resulting state to browser clients; tests use it to check
//! what the timeline put on the map.

use std::collections::BTreeMap;

use chronomap_types::{IconVariant, LatLng, LayerId};
use tracing::trace;

use crate::map::{FlyOptions, Layer, MapSurface};

/// Where the camera points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Centre of the view.
    pub center: LatLng,
    /// Zoom level.
    pub zoom: u8,
    /// Whether the last move was an animated fly-to.
    pub animated: bool,
}

/// A layer together with its attachment state.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayer {
    /// The layer as last updated.
    pub layer: Layer,
    /// Whether the layer is on the map.
    pub attached: bool,
}

/// Headless map scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMap {
    layers: BTreeMap<LayerId, SceneLayer>,
    camera: Camera,
}

impl SceneMap {
    /// A scene with the camera at `center`/`zoom` and no layers.
    pub const fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            layers: BTreeMap::new(),
            camera: Camera {
                center,
                zoom,
                animated: false,
            },
        }
    }

    /// Current camera.
    pub const fn camera(&self) -> Camera {
        self.camera
    }

    /// Look up a layer.
    pub fn layer(&self, id: LayerId) -> Option<&SceneLayer> {
        self.layers.get(&id)
    }

    /// Number of layers known to the scene, attached or not.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Iterate over attached layers.
    pub fn attached(&self) -> impl Iterator<Item = (&LayerId, &Layer)> {
        self.layers
            .iter()
            .filter(|(_, entry)| entry.attached)
            .map(|(id, entry)| (id, &entry.layer))
    }

    /// Attached polylines as `(points, opacity, dashed)`.
    pub fn attached_polylines(&self) -> Vec<(&[LatLng], f64, bool)> {
        self.attached()
            .filter_map(|(_, layer)| match layer {
                Layer::Polyline { points, style } => {
                    Some((points.as_slice(), style.opacity, style.dash.is_some()))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of attached circle markers.
    pub fn attached_circle_markers(&self) -> usize {
        self.attached()
            .filter(|(_, layer)| matches!(layer, Layer::CircleMarker { .. }))
            .count()
    }
}

impl Default for SceneMap {
    fn default() -> Self {
        Self::new(LatLng::new(20.0, 0.0), 6)
    }
}

impl MapSurface for SceneMap {
    fn create_layer(&mut self, layer: Layer) -> LayerId {
        let id = LayerId::new();
        self.layers.insert(
            id,
            SceneLayer {
                layer,
                attached: false,
            },
        );
        id
    }

    fn add_layer(&mut self, id: LayerId) {
        if let Some(entry) = self.layers.get_mut(&id) {
            entry.attached = true;
        }
    }

    fn remove_layer(&mut self, id: LayerId) {
        if let Some(entry) = self.layers.get_mut(&id) {
            entry.attached = false;
        }
    }

    fn has_layer(&self, id: LayerId) -> bool {
        self.layers.get(&id).is_some_and(|entry| entry.attached)
    }

    fn drop_layer(&mut self, id: LayerId) {
        self.layers.remove(&id);
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        trace!(lat = center.lat, lon = center.lon, zoom, "set_view");
        self.camera = Camera {
            center,
            zoom,
            animated: false,
        };
    }

    fn fly_to(&mut self, center: LatLng, zoom: u8, options: FlyOptions) {
        trace!(
            lat = center.lat,
            lon = center.lon,
            zoom,
            duration_ms = options.duration_ms,
            "fly_to"
        );
        self.camera = Camera {
            center,
            zoom,
            animated: true,
        };
    }

    fn set_icon(&mut self, id: LayerId, icon: IconVariant) {
        if let Some(SceneLayer {
            layer: Layer::Marker { icon: current, .. },
            ..
        }) = self.layers.get_mut(&id)
        {
            *current = icon;
        }
    }

    fn set_opacity(&mut self, id: LayerId, opacity: f64) {
        if let Some(SceneLayer {
            layer: Layer::Marker {
                opacity: current, ..
            },
            ..
        }) = self.layers.get_mut(&id)
        {
            *current = opacity;
        }
    }

    fn set_lat_lng(&mut self, id: LayerId, position: LatLng) {
        match self.layers.get_mut(&id).map(|entry| &mut entry.layer) {
            Some(
                Layer::Marker {
                    position: current, ..
                }
                | Layer::CircleMarker {
                    position: current, ..
                },
            ) => *current = position,
            _ => {}
        }
    }

    fn set_lat_lngs(&mut self, id: LayerId, points: Vec<LatLng>) {
        if let Some(SceneLayer {
            layer: Layer::Polyline {
                points: current, ..
            },
            ..
        }) = self.layers.get_mut(&id)
        {
            *current = points;
        }
    }
}

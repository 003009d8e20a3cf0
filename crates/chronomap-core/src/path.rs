//! Path rendering: connecting segments between consecutive visible events.
//!
//! Segments fade with age. A segment ending at `end` drawn at threshold `T`
//! has opacity `1 - min(1, (T - end) / max_span)`, where `max_span` is the
//! time between the first and last event of the whole list. A zero span
//! (one event, or all simultaneous) means no fade.
//!
//! [`render`] is a pure function of its inputs. [`SegmentLayers`] holds the
//! map layers of the current pass so the next pass can discard them all
//! before drawing; nothing is mutated incrementally.

use chronomap_types::{Event, LayerId, Segment};
use tracing::trace;

use crate::config::StyleConfig;
use crate::map::{Layer, MapSurface, PolylineStyle};

/// Fade opacity of a segment ending at `end_timestamp`, clamped to `[0, 1]`.
#[allow(clippy::cast_precision_loss)]
pub fn fade_opacity(threshold: i64, end_timestamp: i64, max_span: i64) -> f64 {
    if max_span <= 0 {
        return 1.0;
    }
    let age = threshold.saturating_sub(end_timestamp) as f64;
    let fade = (age / max_span as f64).min(1.0);
    (1.0 - fade).clamp(0.0, 1.0)
}

/// Build the segment for the pair `(start, end)` of sorted indices.
pub fn segment_between(
    events: &[Event],
    start: usize,
    end: usize,
    threshold: i64,
    max_span: i64,
) -> Option<Segment> {
    let from = events.get(start)?;
    let to = events.get(end)?;
    Some(Segment {
        start,
        end,
        from: from.position(),
        to: to.position(),
        opacity: fade_opacity(threshold, to.timestamp, max_span),
    })
}

/// One segment per adjacent pair of `visible` (sorted indices into
/// `events`). With `suppress_last` the final pair is left out so the
/// animation can draw it.
pub fn render(
    events: &[Event],
    visible: &[usize],
    threshold: i64,
    max_span: i64,
    suppress_last: bool,
) -> Vec<Segment> {
    let pair_count = visible.len().saturating_sub(1);
    let keep = if suppress_last {
        pair_count.saturating_sub(1)
    } else {
        pair_count
    };
    visible
        .windows(2)
        .take(keep)
        .filter_map(|pair| match pair {
            [start, end] => segment_between(events, *start, *end, threshold, max_span),
            _ => None,
        })
        .collect()
}

/// The fixed segments currently drawn on the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentLayers {
    drawn: Vec<(Segment, LayerId)>,
    threshold: Option<i64>,
}

impl SegmentLayers {
    /// Nothing drawn yet.
    pub const fn new() -> Self {
        Self {
            drawn: Vec::new(),
            threshold: None,
        }
    }

    /// Discard every drawn segment and draw `segments` for `threshold`.
    pub fn redraw(
        &mut self,
        segments: Vec<Segment>,
        threshold: i64,
        map: &mut dyn MapSurface,
        style: &StyleConfig,
    ) {
        self.clear(map);
        self.threshold = Some(threshold);
        for segment in segments {
            self.push(segment, map, style);
        }
        trace!(threshold, segments = self.drawn.len(), "Segments redrawn");
    }

    /// Draw one more segment in the current pass.
    pub fn push(&mut self, segment: Segment, map: &mut dyn MapSurface, style: &StyleConfig) {
        let id = map.add_new_layer(Layer::Polyline {
            points: vec![segment.from, segment.to],
            style: PolylineStyle::segment(style, segment.opacity),
        });
        self.drawn.push((segment, id));
    }

    /// Remove every drawn segment from the map.
    pub fn clear(&mut self, map: &mut dyn MapSurface) {
        for (_, id) in self.drawn.drain(..) {
            map.drop_layer(id);
        }
    }

    /// Threshold of the latest pass.
    pub const fn threshold(&self) -> Option<i64> {
        self.threshold
    }

    /// Whether the pair `(start, end)` is drawn.
    pub fn contains_pair(&self, start: usize, end: usize) -> bool {
        self.drawn
            .iter()
            .any(|(segment, _)| segment.start == start && segment.end == end)
    }

    /// The drawn segments in drawing order.
    pub fn segments(&self) -> Vec<Segment> {
        self.drawn.iter().map(|(segment, _)| segment.clone()).collect()
    }

    /// Number of drawn segments.
    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    /// Whether nothing is drawn.
    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scene::SceneMap;

    fn event(timestamp: i64, lat: f64) -> Event {
        Event {
            title: format!("t{timestamp}"),
            description: None,
            date: "1970-01-01".to_owned(),
            timestamp,
            latitude: lat,
            longitude: lat,
            city: None,
            country: None,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_span_never_fades() {
        assert!(close(fade_opacity(1_000, 0, 0), 1.0));
        assert!(close(fade_opacity(i64::MAX, i64::MIN, 0), 1.0));
    }

    #[test]
    fn opacity_is_non_increasing_with_age_and_clamped() {
        let span = 1_000;
        let mut last = f64::INFINITY;
        for age in (-500..=3_000).step_by(50) {
            let opacity = fade_opacity(age, 0, span);
            assert!((0.0..=1.0).contains(&opacity));
            assert!(opacity <= last);
            last = opacity;
        }
        assert!(close(fade_opacity(0, 0, span), 1.0));
        assert!(close(fade_opacity(500, 0, span), 0.5));
        assert!(close(fade_opacity(5_000, 0, span), 0.0));
    }

    #[test]
    fn render_builds_one_segment_per_adjacent_pair() {
        let events = vec![event(0, 0.0), event(100, 1.0), event(200, 2.0)];
        let segments = render(&events, &[0, 1, 2], 200, 200, false);
        assert_eq!(segments.len(), 2);
        let first = segments.first().unwrap();
        assert_eq!((first.start, first.end), (0, 1));
        assert!(close(first.opacity, 0.5));
        let second = segments.get(1).unwrap();
        assert_eq!((second.start, second.end), (1, 2));
        assert!(close(second.opacity, 1.0));
    }

    #[test]
    fn suppress_last_drops_final_pair_only() {
        let events = vec![event(0, 0.0), event(100, 1.0), event(200, 2.0)];
        let segments = render(&events, &[0, 1, 2], 200, 200, true);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments.first().unwrap().end, 1);
        assert!(render(&events, &[0, 1], 100, 200, true).is_empty());
        assert!(render(&events, &[0], 0, 200, true).is_empty());
        assert!(render(&events, &[], 0, 200, false).is_empty());
    }

    #[test]
    fn render_is_idempotent() {
        let events = vec![event(0, 0.0), event(100, 1.0), event(200, 2.0)];
        let a = render(&events, &[0, 1, 2], 200, 200, false);
        let b = render(&events, &[0, 1, 2], 200, 200, false);
        assert_eq!(a, b);
    }

    #[test]
    fn redraw_discards_previous_layers() {
        let events = vec![event(0, 0.0), event(100, 1.0), event(200, 2.0)];
        let style = StyleConfig::default();
        let mut map = SceneMap::default();
        let mut layers = SegmentLayers::new();

        layers.redraw(render(&events, &[0, 1, 2], 200, 200, false), 200, &mut map, &style);
        assert_eq!(map.attached_polylines().len(), 2);
        layers.redraw(render(&events, &[0, 1, 2], 200, 200, false), 200, &mut map, &style);
        assert_eq!(map.attached_polylines().len(), 2);
        assert_eq!(map.layer_count(), 2);

        layers.redraw(render(&events, &[0, 1], 100, 200, false), 100, &mut map, &style);
        assert_eq!(map.attached_polylines().len(), 1);
        assert!(layers.contains_pair(0, 1));
        assert!(!layers.contains_pair(1, 2));
        assert_eq!(layers.threshold(), Some(100));

        layers.clear(&mut map);
        assert!(layers.is_empty());
        assert_eq!(map.layer_count(), 0);
    }

    #[test]
    fn drawn_segments_are_dashed_with_fade_opacity() {
        let events = vec![event(0, 0.0), event(100, 1.0)];
        let style = StyleConfig::default();
        let mut map = SceneMap::default();
        let mut layers = SegmentLayers::new();
        layers.redraw(render(&events, &[0, 1], 100, 100, false), 100, &mut map, &style);
        let lines = map.attached_polylines();
        let (points, opacity, dashed) = lines.first().unwrap();
        assert_eq!(points.len(), 2);
        assert!(close(*opacity, 1.0));
        assert!(*dashed);
    }
}

//! Timeline controller: the orchestrator between slider and map.
//!
//! The controller owns every piece of mutable timeline state: the current
//! and previous position, the pending-animation flag, the persistent event
//! markers, the drawn segments, and the animation. Collaborators are
//! injected at construction, so a controller can run against a real map
//! bridge, the in-memory [`SceneMap`](crate::scene::SceneMap), or anything
//! else implementing [`MapSurface`].
//!
//! A position change runs the pipeline
//! `index state -> visibility -> path -> (maybe) animation` to completion
//! before returning. Animation frames are produced separately by
//! [`TimelineController::tick`].

use chronomap_types::{AnimationPhase, Event, TimelineSnapshot};
use tracing::{debug, info};

use crate::animation::{AnimationController, TickOutcome};
use crate::clock::Clock;
use crate::config::ChronomapConfig;
use crate::map::{FlyOptions, MapSurface};
use crate::path::{SegmentLayers, render};
use crate::slider::Slider;
use crate::store::{EventStore, format_date};
use crate::visibility::{MarkerSet, Projection, project};

/// What a position change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionChange {
    /// Nothing happened: empty dataset or same index.
    Unchanged,
    /// The timeline moved without starting an animation.
    Moved,
    /// The timeline moved and the newest segment started animating.
    Animating,
}

/// The timeline-to-map synchronization engine.
pub struct TimelineController<M, S, C> {
    store: EventStore,
    map: M,
    slider: S,
    clock: C,
    config: ChronomapConfig,
    markers: MarkerSet,
    segments: SegmentLayers,
    animation: AnimationController,
    projection: Option<Projection>,
    current: Option<usize>,
    previous: Option<usize>,
    pending_animation: bool,
}

impl<M, S, C> TimelineController<M, S, C>
where
    M: MapSurface,
    S: Slider,
    C: Clock,
{
    /// Build a controller over `store`. Nothing touches the map until
    /// [`initialize`](Self::initialize) or the first position change.
    pub fn new(store: EventStore, map: M, slider: S, clock: C, config: ChronomapConfig) -> Self {
        let animation = AnimationController::new(config.animation.clone(), config.style.clone());
        Self {
            store,
            map,
            slider,
            clock,
            config,
            markers: MarkerSet::default(),
            segments: SegmentLayers::new(),
            animation,
            projection: None,
            current: None,
            previous: None,
            pending_animation: false,
        }
    }

    /// Create the event markers and take the first position.
    ///
    /// With `playback.start_at_now` the timeline starts at the event
    /// closest to `now`, otherwise at the first event.
    pub fn initialize(&mut self, now: i64) -> PositionChange {
        if self.store.is_empty() {
            info!("No events loaded; timeline is inert");
            return PositionChange::Unchanged;
        }
        self.ensure_markers();
        let start = if self.config.playback.start_at_now {
            self.store.closest_to(now).unwrap_or(0)
        } else {
            0
        };
        info!(
            events = self.store.len(),
            start,
            max_span_ms = self.store.max_span(),
            "Timeline initialized"
        );
        self.pending_animation = false;
        let index = self.slider.set(start);
        self.on_position_change(index)
    }

    /// React to the slider taking value `index`.
    ///
    /// Out-of-range indices are clamped. The pending-animation flag is
    /// consumed by every change that gets past the same-index guard.
    pub fn on_position_change(&mut self, index: usize) -> PositionChange {
        let Some(last) = self.store.last_index() else {
            return PositionChange::Unchanged;
        };
        let index = index.min(last);
        if self.current == Some(index) {
            return PositionChange::Unchanged;
        }
        self.ensure_markers();

        self.previous = self.current;
        self.current = Some(index);
        let should_animate = std::mem::take(&mut self.pending_animation);

        let animation_idle = self.animation.is_idle();
        if self.animation.is_running() {
            self.animation.request_cancel();
        }

        let events = self.store.events();
        let Some(threshold) = events.get(index).map(|event| event.timestamp) else {
            return PositionChange::Unchanged;
        };
        let projection = project(events, threshold, index);
        self.markers
            .apply(&projection, &mut self.map, &self.config.style);

        let single_step = self
            .previous
            .and_then(|previous| previous.checked_add(1))
            .is_some_and(|next| next == index);
        let animate_pair = match projection.visible.as_slice() {
            [.., start, end] if should_animate && single_step && animation_idle => {
                Some((*start, *end))
            }
            _ => None,
        };

        let segments = render(
            events,
            &projection.visible,
            threshold,
            self.store.max_span(),
            animate_pair.is_some(),
        );
        self.segments
            .redraw(segments, threshold, &mut self.map, &self.config.style);

        debug!(
            index,
            previous = ?self.previous,
            visible = projection.visible.len(),
            segments = self.segments.len(),
            "Timeline position changed"
        );
        self.projection = Some(projection);

        match animate_pair {
            Some((start, end)) => {
                let now = self.clock.now_ms();
                if self.animation.start(events, start, end, now) {
                    PositionChange::Animating
                } else {
                    PositionChange::Moved
                }
            }
            None => PositionChange::Moved,
        }
    }

    /// Step forward one event with animation. No-op at the last event.
    pub fn advance(&mut self) -> PositionChange {
        let Some(last) = self.store.last_index() else {
            return PositionChange::Unchanged;
        };
        let next = self
            .current
            .map_or(0, |current| current.saturating_add(1).min(last));
        self.pending_animation = true;
        let index = self.slider.set(next);
        self.on_position_change(index)
    }

    /// Jump to an event picked from the event list.
    ///
    /// The move animates when it is a single step forward; otherwise the
    /// camera flies to the selected event.
    pub fn select(&mut self, index: usize) -> PositionChange {
        if self.store.is_empty() {
            return PositionChange::Unchanged;
        }
        self.pending_animation = true;
        let index = self.slider.set(index);
        let change = self.on_position_change(index);
        if change != PositionChange::Animating
            && let Some(event) = self.store.get(index)
        {
            self.map.fly_to(
                event.position(),
                self.config.map.fly_to_zoom,
                FlyOptions {
                    duration_ms: self.config.map.fly_to_duration_ms,
                },
            );
        }
        change
    }

    /// Move the slider by hand. Never animates.
    pub fn drag(&mut self, index: usize) -> PositionChange {
        if self.store.is_empty() {
            return PositionChange::Unchanged;
        }
        self.pending_animation = false;
        let index = self.slider.set(index);
        self.on_position_change(index)
    }

    /// Cancel any running animation and return to the first event.
    pub fn reset(&mut self) -> PositionChange {
        if self.store.is_empty() {
            return PositionChange::Unchanged;
        }
        self.pending_animation = false;
        if self.animation.request_cancel() {
            debug!("Reset cancelled running animation");
        }
        let index = self.slider.set(0);
        self.on_position_change(index)
    }

    /// Produce one animation frame at the injected clock's time.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();
        self.animation.tick(
            now,
            self.store.events(),
            self.store.max_span(),
            &mut self.map,
            &mut self.segments,
        )
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self, playing: bool) -> TimelineSnapshot {
        let current = self.current.and_then(|index| self.store.get(index));
        TimelineSnapshot {
            event_count: self.store.len(),
            current_index: self.current,
            previous_index: self.previous,
            current_date: current.map(|event| format_date(event.timestamp)),
            threshold: current.map(|event| event.timestamp),
            markers: self
                .projection
                .as_ref()
                .map(|projection| projection.presentations.clone())
                .unwrap_or_default(),
            segments: self.segments.segments(),
            animation: self.animation.status(),
            playing,
        }
    }

    /// Whether an animation is in flight, including one awaiting its
    /// cancellation tick.
    pub const fn is_animating(&self) -> bool {
        !self.animation.is_idle()
    }

    /// Current animation phase.
    pub const fn animation_phase(&self) -> AnimationPhase {
        self.animation.phase()
    }

    /// Current timeline position.
    pub const fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Position before the last change.
    pub const fn previous_index(&self) -> Option<usize> {
        self.previous
    }

    /// Whether the next position change is allowed to animate.
    pub const fn pending_animation(&self) -> bool {
        self.pending_animation
    }

    /// Whether the timeline sits on the last event.
    pub fn at_end(&self) -> bool {
        self.current.is_some() && self.current == self.store.last_index()
    }

    /// The loaded events.
    pub fn events(&self) -> &[Event] {
        self.store.events()
    }

    /// The event store.
    pub const fn store(&self) -> &EventStore {
        &self.store
    }

    /// The map surface.
    pub const fn map(&self) -> &M {
        &self.map
    }

    /// The slider.
    pub const fn slider(&self) -> &S {
        &self.slider
    }

    /// The persistent event markers.
    pub const fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// The segments of the latest render pass, plus any finalized
    /// animation segment.
    pub const fn segments(&self) -> &SegmentLayers {
        &self.segments
    }

    /// Active configuration.
    pub const fn config(&self) -> &ChronomapConfig {
        &self.config
    }

    fn ensure_markers(&mut self) {
        if self.markers.ids().is_empty() && !self.store.is_empty() {
            self.markers =
                MarkerSet::create(self.store.events(), &mut self.map, &self.config.style);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chronomap_types::{EventRecord, IconVariant, MarkerOpacity};

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::PlaybackConfig;
    use crate::scene::SceneMap;
    use crate::slider::SliderState;

    type Controller = TimelineController<SceneMap, SliderState, ManualClock>;

    const DAY: i64 = 86_400_000;

    fn record(title: &str, date: &str, lat: f64, lon: f64) -> EventRecord {
        EventRecord {
            title: title.to_owned(),
            date: date.to_owned(),
            description: None,
            lat,
            lon,
            city: None,
            country: None,
        }
    }

    fn config() -> ChronomapConfig {
        ChronomapConfig {
            playback: PlaybackConfig {
                start_at_now: false,
                ..PlaybackConfig::default()
            },
            ..ChronomapConfig::default()
        }
    }

    fn controller(records: Vec<EventRecord>) -> (Controller, ManualClock) {
        let store = EventStore::from_records(records);
        let slider = SliderState::new(store.last_index().unwrap_or(0));
        let clock = ManualClock::new(0);
        let controller =
            TimelineController::new(store, SceneMap::default(), slider, clock.clone(), config());
        (controller, clock)
    }

    fn two_events() -> Vec<EventRecord> {
        vec![
            record("A", "2020-01-01", 0.0, 0.0),
            record("B", "2020-01-02", 10.0, 20.0),
        ]
    }

    fn three_events() -> Vec<EventRecord> {
        vec![
            record("A", "2020-01-01", 0.0, 0.0),
            record("B", "2020-01-02", 10.0, 20.0),
            record("C", "2020-01-03", 20.0, 40.0),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn attached_markers(controller: &Controller) -> usize {
        controller
            .markers()
            .ids()
            .iter()
            .filter(|id| controller.map().has_layer(**id))
            .count()
    }

    #[test]
    fn empty_store_makes_every_action_a_no_op() {
        let (mut timeline, _) = controller(Vec::new());
        assert_eq!(timeline.initialize(0), PositionChange::Unchanged);
        assert_eq!(timeline.advance(), PositionChange::Unchanged);
        assert_eq!(timeline.select(3), PositionChange::Unchanged);
        assert_eq!(timeline.drag(1), PositionChange::Unchanged);
        assert_eq!(timeline.reset(), PositionChange::Unchanged);
        assert_eq!(timeline.on_position_change(0), PositionChange::Unchanged);
        assert_eq!(timeline.tick(), TickOutcome::Idle);
        assert_eq!(timeline.map().layer_count(), 0);
        let snapshot = timeline.snapshot(false);
        assert_eq!(snapshot.event_count, 0);
        assert!(snapshot.current_index.is_none());
    }

    #[test]
    fn initialize_creates_markers_and_shows_first_event() {
        let (mut timeline, _) = controller(three_events());
        assert_eq!(timeline.initialize(0), PositionChange::Moved);
        assert_eq!(timeline.current_index(), Some(0));
        assert_eq!(timeline.markers().ids().len(), 3);
        assert_eq!(attached_markers(&timeline), 1);
        assert!(timeline.segments().is_empty());
        assert!(!timeline.is_animating());
    }

    #[test]
    fn initialize_starts_closest_to_now_when_configured() {
        let store = EventStore::from_records(three_events());
        let slider = SliderState::new(2);
        let mut timeline = TimelineController::new(
            store,
            SceneMap::default(),
            slider,
            ManualClock::new(0),
            ChronomapConfig::default(),
        );
        let jan_2 = timeline.events().get(1).unwrap().timestamp;
        timeline.initialize(jan_2 + DAY / 4);
        assert_eq!(timeline.current_index(), Some(1));
        assert_eq!(timeline.slider().get(), 1);
        assert_eq!(attached_markers(&timeline), 2);
        assert_eq!(timeline.segments().len(), 1);
    }

    #[test]
    fn same_index_is_a_no_op() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        timeline.drag(1);
        let layers = timeline.map().layer_count();
        let before = timeline.snapshot(false);
        assert_eq!(timeline.drag(1), PositionChange::Unchanged);
        assert_eq!(timeline.snapshot(false), before);
        assert_eq!(timeline.map().layer_count(), layers);
        assert_eq!(timeline.previous_index(), Some(0));
    }

    #[test]
    fn out_of_range_index_is_clamped() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        assert_eq!(timeline.on_position_change(99), PositionChange::Moved);
        assert_eq!(timeline.current_index(), Some(2));
        assert_eq!(timeline.drag(42), PositionChange::Unchanged);
        assert_eq!(timeline.slider().get(), 2);
    }

    #[test]
    fn exactly_one_highlighted_event_at_every_position() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        for index in [2, 0, 1, 2] {
            timeline.drag(index);
            let snapshot = timeline.snapshot(false);
            let highlighted: Vec<usize> = snapshot
                .markers
                .iter()
                .filter(|m| m.icon == IconVariant::Highlighted && m.opacity == MarkerOpacity::Full)
                .map(|m| m.index)
                .collect();
            assert_eq!(highlighted, vec![index]);
            assert_eq!(attached_markers(&timeline), index + 1);
        }
    }

    #[test]
    fn advance_one_step_suppresses_last_segment_and_animates() {
        let (mut timeline, clock) = controller(two_events());
        timeline.initialize(0);
        assert_eq!(timeline.advance(), PositionChange::Animating);
        assert!(timeline.segments().is_empty());
        assert_eq!(timeline.animation_phase(), AnimationPhase::Running);
        assert!(!timeline.pending_animation());

        // Two-event scenario: linear interpolation over 15 seconds.
        assert_eq!(timeline.tick(), TickOutcome::Continue);
        clock.advance(7_500);
        assert_eq!(timeline.tick(), TickOutcome::Continue);
        let status = timeline.snapshot(false).animation;
        assert!(close(status.progress, 0.5));
        let point = status.point.unwrap();
        assert!(close(point.lat, 5.0));
        assert!(close(point.lon, 10.0));
        assert!(close(timeline.map().camera().center.lat, 5.0));
        assert_eq!(timeline.map().camera().zoom, 6);

        clock.advance(7_500);
        assert_eq!(timeline.tick(), TickOutcome::Completed);
        assert!(!timeline.is_animating());
        let segments = timeline.segments().segments();
        assert_eq!(segments.len(), 1);
        let segment = segments.first().unwrap();
        assert_eq!((segment.start, segment.end), (0, 1));
        assert!(close(segment.opacity, 1.0));
        assert_eq!(timeline.map().attached_circle_markers(), 0);
        // Two markers plus one fixed segment.
        assert_eq!(timeline.map().layer_count(), 3);
    }

    #[test]
    fn moving_backwards_never_animates() {
        let (mut timeline, _) = controller(two_events());
        timeline.initialize(0);
        timeline.drag(1);
        assert_eq!(timeline.select(0), PositionChange::Moved);
        assert!(!timeline.is_animating());
        assert!(timeline.segments().is_empty());
        assert_eq!(attached_markers(&timeline), 1);
    }

    #[test]
    fn drag_forward_one_step_does_not_animate() {
        let (mut timeline, _) = controller(two_events());
        timeline.initialize(0);
        assert_eq!(timeline.drag(1), PositionChange::Moved);
        assert!(!timeline.is_animating());
        assert_eq!(timeline.segments().len(), 1);
    }

    #[test]
    fn jump_of_two_with_flag_draws_fixed_segments_without_animation() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        assert_eq!(timeline.select(2), PositionChange::Moved);
        assert!(!timeline.is_animating());
        assert_eq!(timeline.segments().len(), 2);
        assert!(!timeline.pending_animation());
        let camera = timeline.map().camera();
        assert!(camera.animated);
        assert!(close(camera.center.lat, 20.0));
    }

    #[test]
    fn select_one_step_forward_animates_instead_of_flying() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        assert_eq!(timeline.select(1), PositionChange::Animating);
        assert!(!timeline.map().camera().animated);
    }

    #[test]
    fn jump_mid_animation_cancels_within_one_tick() {
        let (mut timeline, clock) = controller(three_events());
        timeline.initialize(0);
        timeline.advance();
        clock.advance(5_000);
        timeline.tick();

        assert_eq!(timeline.drag(2), PositionChange::Moved);
        assert_eq!(timeline.animation_phase(), AnimationPhase::CancelRequested);
        clock.advance(16);
        assert_eq!(timeline.tick(), TickOutcome::Cancelled);
        assert_eq!(timeline.animation_phase(), AnimationPhase::Idle);

        // The (0, 1) pair is drawn exactly once.
        let segments = timeline.segments().segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments.iter().filter(|s| (s.start, s.end) == (0, 1)).count(),
            1
        );
        assert_eq!(timeline.map().attached_circle_markers(), 0);
        assert_eq!(timeline.map().layer_count(), 3 + 2);
    }

    #[test]
    fn jump_back_mid_animation_leaves_no_segment() {
        let (mut timeline, clock) = controller(three_events());
        timeline.initialize(0);
        timeline.advance();
        clock.advance(1_000);
        timeline.tick();

        timeline.drag(0);
        clock.advance(16);
        assert_eq!(timeline.tick(), TickOutcome::Cancelled);
        assert!(timeline.segments().is_empty());
        assert_eq!(timeline.map().layer_count(), 3);
        assert_eq!(attached_markers(&timeline), 1);
    }

    #[test]
    fn advance_while_animating_draws_everything_fixed() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        assert_eq!(timeline.advance(), PositionChange::Animating);
        assert_eq!(timeline.advance(), PositionChange::Moved);
        assert_eq!(timeline.segments().len(), 2);
        assert_eq!(timeline.tick(), TickOutcome::Cancelled);
        assert_eq!(timeline.segments().len(), 2);
        assert_eq!(timeline.tick(), TickOutcome::Idle);
    }

    #[test]
    fn advance_at_last_event_is_a_no_op() {
        let (mut timeline, _) = controller(two_events());
        timeline.initialize(0);
        timeline.drag(1);
        assert!(timeline.at_end());
        assert_eq!(timeline.advance(), PositionChange::Unchanged);
        // The unused flag is consumed by the next real change.
        assert!(timeline.pending_animation());
        assert_eq!(timeline.drag(0), PositionChange::Moved);
        assert!(!timeline.pending_animation());
    }

    #[test]
    fn reset_cancels_animation_and_returns_to_start() {
        let (mut timeline, clock) = controller(three_events());
        timeline.initialize(0);
        timeline.advance();
        clock.advance(3_000);
        timeline.tick();

        assert_eq!(timeline.reset(), PositionChange::Moved);
        assert_eq!(timeline.slider().get(), 0);
        assert_eq!(timeline.current_index(), Some(0));
        assert!(!timeline.pending_animation());
        assert_eq!(timeline.tick(), TickOutcome::Cancelled);
        assert!(timeline.segments().is_empty());
        assert_eq!(timeline.map().layer_count(), 3);
    }

    #[test]
    fn rerender_is_idempotent() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        timeline.drag(2);
        let first = timeline.snapshot(false);
        timeline.drag(0);
        timeline.drag(2);
        let second = timeline.snapshot(false);
        assert_eq!(first.segments, second.segments);
        assert_eq!(first.markers, second.markers);
        assert_eq!(timeline.map().layer_count(), 3 + 2);
    }

    #[test]
    fn older_segments_fade() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        timeline.drag(2);
        let segments = timeline.segments().segments();
        let opacities: Vec<f64> = segments.iter().map(|s| s.opacity).collect();
        assert!(close(*opacities.first().unwrap(), 0.5));
        assert!(close(*opacities.get(1).unwrap(), 1.0));
    }

    #[test]
    fn snapshot_reports_date_and_threshold() {
        let (mut timeline, _) = controller(three_events());
        timeline.initialize(0);
        timeline.drag(1);
        let snapshot = timeline.snapshot(true);
        assert_eq!(snapshot.event_count, 3);
        assert_eq!(snapshot.current_index, Some(1));
        assert_eq!(snapshot.previous_index, Some(0));
        assert_eq!(snapshot.current_date.as_deref(), Some("2020-01-02"));
        assert_eq!(
            snapshot.threshold,
            timeline.events().get(1).map(|e| e.timestamp)
        );
        assert!(snapshot.playing);
    }
}

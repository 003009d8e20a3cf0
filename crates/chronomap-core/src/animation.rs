//! Animation controller: draws the newest segment over time.
//!
//! When the timeline advances by one step, the segment into the new event
//! is drawn progressively instead of appearing at once. The controller is
//! an explicit state machine driven by [`AnimationController::tick`], which
//! any scheduling primitive (frame callback, tokio interval, test loop) can
//! call.
//!
//! ```text
//!  Idle --start--> Running --request_cancel--> CancelRequested
//!   ^                 |                               |
//!   +----progress=1---+------------next tick----------+
//! ```
//!
//! # Invariants
//!
//! 1. At most one animation exists; `start` is rejected unless idle.
//! 2. Progress is `min((now - started_at) / duration, 1)`, derived from the
//!    wall clock, so late or dropped ticks self-correct.
//! 3. Cancellation is deferred: it takes effect on the next tick, never
//!    inside `request_cancel`.
//! 4. Finishing (naturally or by cancellation) always removes the
//!    interpolated line and point and returns to idle.
//! 5. All camera and layer mutations happen inside `tick`.

use chronomap_types::{AnimationPhase, AnimationStatus, Event, LatLng, LayerId};
use tracing::{debug, trace};

use crate::config::{AnimationConfig, StyleConfig};
use crate::map::{Layer, MapSurface, PolylineStyle};
use crate::path::{SegmentLayers, segment_between};

/// An animation in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningAnimation {
    /// Sorted index of the start event.
    pub start_index: usize,
    /// Sorted index of the end event.
    pub end_index: usize,
    /// Start coordinate.
    pub from: LatLng,
    /// End coordinate.
    pub to: LatLng,
    /// Wall-clock start time in milliseconds since the epoch.
    pub started_at: i64,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// Interpolation fraction of the latest tick.
    pub progress: f64,
    /// Interpolated point of the latest tick.
    pub point: Option<LatLng>,
    line: Option<LayerId>,
    marker: Option<LayerId>,
}

impl RunningAnimation {
    /// Fraction of the animation elapsed at `now`, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_at(&self, now: i64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at).max(0);
        (elapsed as f64 / self.duration_ms as f64).min(1.0)
    }
}

/// Animation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnimationState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Drawing in progress.
    Running(RunningAnimation),
    /// Cancellation requested; finalized on the next tick.
    CancelRequested(RunningAnimation),
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was in flight.
    Idle,
    /// Progress advanced; more ticks are needed.
    Continue,
    /// The animation reached its end and was finalized.
    Completed,
    /// A cancellation was honoured and the animation finalized.
    Cancelled,
}

impl TickOutcome {
    /// Whether the tick changed anything visible.
    pub const fn changed(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Owner of the single animation state.
#[derive(Debug, Clone)]
pub struct AnimationController {
    state: AnimationState,
    config: AnimationConfig,
    style: StyleConfig,
}

impl AnimationController {
    /// An idle controller.
    pub const fn new(config: AnimationConfig, style: StyleConfig) -> Self {
        Self {
            state: AnimationState::Idle,
            config,
            style,
        }
    }

    /// Current state.
    pub const fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Current phase.
    pub const fn phase(&self) -> AnimationPhase {
        match self.state {
            AnimationState::Idle => AnimationPhase::Idle,
            AnimationState::Running(_) => AnimationPhase::Running,
            AnimationState::CancelRequested(_) => AnimationPhase::CancelRequested,
        }
    }

    /// Whether nothing is in flight.
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, AnimationState::Idle)
    }

    /// Whether an animation is drawing and has not been asked to stop.
    pub const fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running(_))
    }

    /// Serializable progress report.
    pub fn status(&self) -> AnimationStatus {
        match &self.state {
            AnimationState::Idle => AnimationStatus::idle(),
            AnimationState::Running(run) | AnimationState::CancelRequested(run) => {
                AnimationStatus {
                    phase: self.phase(),
                    start: Some(run.start_index),
                    end: Some(run.end_index),
                    progress: run.progress,
                    point: run.point,
                }
            }
        }
    }

    /// Begin drawing the segment from event `start_index` to `end_index`.
    ///
    /// Returns `false` (and changes nothing) unless idle and both indices
    /// exist.
    pub fn start(&mut self, events: &[Event], start_index: usize, end_index: usize, now: i64) -> bool {
        if !self.is_idle() {
            debug!(start_index, end_index, "Animation start rejected: not idle");
            return false;
        }
        let (Some(from), Some(to)) = (events.get(start_index), events.get(end_index)) else {
            return false;
        };
        debug!(start_index, end_index, duration_ms = self.config.duration_ms, "Animation started");
        self.state = AnimationState::Running(RunningAnimation {
            start_index,
            end_index,
            from: from.position(),
            to: to.position(),
            started_at: now,
            duration_ms: self.config.duration_ms,
            progress: 0.0,
            point: None,
            line: None,
            marker: None,
        });
        true
    }

    /// Ask a running animation to stop at the next tick.
    ///
    /// Returns `false` when nothing is running (including when a
    /// cancellation is already pending).
    pub fn request_cancel(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            AnimationState::Running(run) => {
                debug!(
                    start_index = run.start_index,
                    end_index = run.end_index,
                    progress = run.progress,
                    "Animation cancel requested"
                );
                self.state = AnimationState::CancelRequested(run);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Advance the animation to `now`.
    ///
    /// `segments` is the path renderer's current pass: finalization adds
    /// the animated pair to it unless that pass already drew the pair or
    /// the pair's end event is past the pass threshold.
    pub fn tick(
        &mut self,
        now: i64,
        events: &[Event],
        max_span: i64,
        map: &mut dyn MapSurface,
        segments: &mut SegmentLayers,
    ) -> TickOutcome {
        match std::mem::take(&mut self.state) {
            AnimationState::Idle => TickOutcome::Idle,
            AnimationState::CancelRequested(run) => {
                self.finalize(run, events, max_span, map, segments);
                TickOutcome::Cancelled
            }
            AnimationState::Running(mut run) => {
                let progress = run.progress_at(now);
                let point = run.from.lerp(run.to, progress);
                run.progress = progress;
                run.point = Some(point);

                map.set_view(point, self.config.follow_zoom);
                self.draw_interpolated(&mut run, map, point);
                trace!(progress, lat = point.lat, lon = point.lon, "Animation tick");

                if progress < 1.0 {
                    self.state = AnimationState::Running(run);
                    TickOutcome::Continue
                } else {
                    self.finalize(run, events, max_span, map, segments);
                    TickOutcome::Completed
                }
            }
        }
    }

    /// Create or update the interpolated line and point.
    fn draw_interpolated(&self, run: &mut RunningAnimation, map: &mut dyn MapSurface, point: LatLng) {
        let points = vec![run.from, point];
        match run.line {
            Some(id) => map.set_lat_lngs(id, points),
            None => {
                run.line = Some(map.add_new_layer(Layer::Polyline {
                    points,
                    style: PolylineStyle::drawing(&self.style),
                }));
            }
        }
        match run.marker {
            Some(id) => map.set_lat_lng(id, point),
            None => {
                run.marker = Some(map.add_new_layer(Layer::CircleMarker {
                    position: point,
                    radius: self.style.point_radius,
                    color: self.style.path_color.clone(),
                }));
            }
        }
    }

    /// Draw the fixed segment, remove interpolated artifacts, go idle.
    fn finalize(
        &mut self,
        run: RunningAnimation,
        events: &[Event],
        max_span: i64,
        map: &mut dyn MapSurface,
        segments: &mut SegmentLayers,
    ) {
        if let Some(id) = run.line {
            map.drop_layer(id);
        }
        if let Some(id) = run.marker {
            map.drop_layer(id);
        }

        let end_timestamp = events.get(run.end_index).map(|e| e.timestamp);
        let threshold = segments.threshold().or(end_timestamp);
        let drawn = match (threshold, end_timestamp) {
            (Some(threshold), Some(end_ts))
                if end_ts <= threshold && !segments.contains_pair(run.start_index, run.end_index) =>
            {
                segment_between(events, run.start_index, run.end_index, threshold, max_span)
                    .map(|segment| segments.push(segment, map, &self.style))
                    .is_some()
            }
            _ => false,
        };

        debug!(
            start_index = run.start_index,
            end_index = run.end_index,
            progress = run.progress,
            segment_drawn = drawn,
            "Animation finalized"
        );
        self.state = AnimationState::Idle;
    }
}

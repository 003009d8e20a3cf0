//! Continuous playback layered on top of [`TimelineController::advance`].
//!
//! Playback is a policy, not part of the controller: it polls at a fixed
//! interval and advances one step whenever no animation is in flight. The
//! step that reaches the last event ends playback.

use tracing::{debug, info};

use crate::clock::Clock;
use crate::map::MapSurface;
use crate::slider::Slider;
use crate::timeline::{PositionChange, TimelineController};

/// Result of one playback poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    /// Playback is paused.
    Idle,
    /// The timeline advanced to this index.
    Advanced(usize),
    /// An animation is in flight; try again at the next poll.
    Waiting,
    /// Nothing left to play; playback stopped.
    Finished,
}

/// Play/pause state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoPlay {
    playing: bool,
}

impl AutoPlay {
    /// Paused playback.
    pub const fn new() -> Self {
        Self { playing: false }
    }

    /// Whether playback is active.
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playing.
    pub fn play(&mut self) {
        if !self.playing {
            info!("Playback started");
        }
        self.playing = true;
    }

    /// Stop playing. A running animation is left to finish.
    pub fn pause(&mut self) {
        if self.playing {
            info!("Playback paused");
        }
        self.playing = false;
    }

    /// Flip between playing and paused; returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
        self.playing
    }

    /// Advance the timeline if playing and no animation is in flight.
    pub fn poll<M, S, C>(&mut self, timeline: &mut TimelineController<M, S, C>) -> PlaybackStep
    where
        M: MapSurface,
        S: Slider,
        C: Clock,
    {
        if !self.playing {
            return PlaybackStep::Idle;
        }
        if timeline.is_animating() {
            return PlaybackStep::Waiting;
        }
        match timeline.advance() {
            PositionChange::Unchanged => {
                self.stop_at_end();
                PlaybackStep::Finished
            }
            PositionChange::Moved | PositionChange::Animating => {
                let index = timeline.current_index().unwrap_or(0);
                debug!(index, "Playback advanced");
                if timeline.at_end() {
                    self.stop_at_end();
                }
                PlaybackStep::Advanced(index)
            }
        }
    }

    fn stop_at_end(&mut self) {
        self.playing = false;
        info!("Playback reached the last event");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chronomap_types::EventRecord;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{ChronomapConfig, PlaybackConfig};
    use crate::scene::SceneMap;
    use crate::slider::SliderState;
    use crate::store::EventStore;

    fn timeline(count: usize) -> (TimelineController<SceneMap, SliderState, ManualClock>, ManualClock) {
        let records = (1..=count)
            .map(|day| EventRecord {
                title: format!("day {day}"),
                date: format!("2020-01-{day:02}"),
                description: None,
                lat: 0.0,
                lon: 0.0,
                city: None,
                country: None,
            })
            .collect();
        let store = EventStore::from_records(records);
        let slider = SliderState::new(store.last_index().unwrap_or(0));
        let clock = ManualClock::new(0);
        let config = ChronomapConfig {
            playback: PlaybackConfig {
                start_at_now: false,
                ..PlaybackConfig::default()
            },
            ..ChronomapConfig::default()
        };
        let mut controller =
            TimelineController::new(store, SceneMap::default(), slider, clock.clone(), config);
        controller.initialize(0);
        (controller, clock)
    }

    #[test]
    fn paused_playback_does_nothing() {
        let (mut controller, _) = timeline(3);
        let mut play = AutoPlay::new();
        assert_eq!(play.poll(&mut controller), PlaybackStep::Idle);
        assert_eq!(controller.current_index(), Some(0));
    }

    #[test]
    fn waits_for_animation_then_advances() {
        let (mut controller, clock) = timeline(3);
        let mut play = AutoPlay::new();
        play.play();

        assert_eq!(play.poll(&mut controller), PlaybackStep::Advanced(1));
        assert!(controller.is_animating());
        assert_eq!(play.poll(&mut controller), PlaybackStep::Waiting);

        clock.advance(15_000);
        controller.tick();
        assert_eq!(play.poll(&mut controller), PlaybackStep::Advanced(2));
        assert!(!play.is_playing());
        assert_eq!(play.poll(&mut controller), PlaybackStep::Idle);
    }

    #[test]
    fn playing_from_the_end_finishes_immediately() {
        let (mut controller, _) = timeline(2);
        controller.drag(1);
        let mut play = AutoPlay::new();
        assert!(play.toggle());
        assert_eq!(play.poll(&mut controller), PlaybackStep::Finished);
        assert!(!play.is_playing());
    }

    #[test]
    fn toggle_flips_state() {
        let mut play = AutoPlay::new();
        assert!(play.toggle());
        assert!(!play.toggle());
        play.pause();
        assert!(!play.is_playing());
    }
}

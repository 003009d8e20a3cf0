//! Async driver loop owning a [`TimelineController`].
//!
//! [`run_timeline`] is the single task that touches the controller. It
//! multiplexes three sources with `tokio::select!`:
//!
//! - **Commands** from the observer (or any other producer) over an `mpsc`
//!   channel: advance, select, drag, reset, play, pause, shutdown
//! - **Frames** at `animation.frame_interval_ms`, driving the animation
//! - **Playback polls** at `playback.poll_interval_ms`, driving auto-play
//!
//! Each branch runs to completion before the next one is polled, so a
//! position change can never interleave with an animation frame.

use std::time::Duration;

use chronomap_types::TimelineSnapshot;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::map::MapSurface;
use crate::playback::{AutoPlay, PlaybackStep};
use crate::slider::Slider;
use crate::timeline::TimelineController;

/// Errors that can occur when starting the driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A configured interval was zero.
    #[error("{name} must be greater than zero")]
    ZeroInterval {
        /// The configuration field.
        name: &'static str,
    },
}

/// A request for the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineCommand {
    /// Step forward with animation.
    Advance,
    /// Select an event from the list.
    Select(usize),
    /// Move the slider by hand.
    Drag(usize),
    /// Cancel any animation and go back to the first event.
    Reset,
    /// Start continuous playback.
    Play,
    /// Stop continuous playback.
    Pause,
    /// Stop the driver.
    Shutdown,
}

/// Why the driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEndReason {
    /// A [`TimelineCommand::Shutdown`] was received.
    Shutdown,
    /// Every command sender was dropped.
    ChannelClosed,
}

/// Result of a driver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSummary {
    /// Why the driver stopped.
    pub end_reason: DriverEndReason,
    /// Commands processed.
    pub commands: u64,
    /// Animation frames that changed the map.
    pub frames: u64,
}

/// Callback invoked after every state change.
///
/// Implementations publish the snapshot to observers.
pub trait FrameCallback: Send {
    /// Called with the latest snapshot.
    fn on_frame(&mut self, snapshot: &TimelineSnapshot);
}

/// A callback that discards every snapshot.
pub struct NoOpCallback;

impl FrameCallback for NoOpCallback {
    fn on_frame(&mut self, _snapshot: &TimelineSnapshot) {}
}

/// Drive `controller` until shutdown or until the command channel closes.
///
/// # Errors
///
/// Returns [`DriverError::ZeroInterval`] if the frame or poll interval is
/// configured as zero.
pub async fn run_timeline<M, S, C>(
    controller: &mut TimelineController<M, S, C>,
    autoplay: &mut AutoPlay,
    commands: &mut mpsc::Receiver<TimelineCommand>,
    callback: &mut dyn FrameCallback,
) -> Result<DriverSummary, DriverError>
where
    M: MapSurface,
    S: Slider,
    C: Clock,
{
    let frame_ms = controller.config().animation.frame_interval_ms;
    let poll_ms = controller.config().playback.poll_interval_ms;
    if frame_ms == 0 {
        return Err(DriverError::ZeroInterval {
            name: "animation.frame_interval_ms",
        });
    }
    if poll_ms == 0 {
        return Err(DriverError::ZeroInterval {
            name: "playback.poll_interval_ms",
        });
    }

    let mut frames = interval(Duration::from_millis(frame_ms));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut polls = interval(Duration::from_millis(poll_ms));
    polls.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut command_count: u64 = 0;
    let mut frame_count: u64 = 0;

    info!(frame_ms, poll_ms, events = controller.events().len(), "Timeline driver starting");
    callback.on_frame(&controller.snapshot(autoplay.is_playing()));

    let end_reason = loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    break DriverEndReason::ChannelClosed;
                };
                command_count = command_count.saturating_add(1);
                debug!(?command, "Timeline command");
                match command {
                    TimelineCommand::Shutdown => break DriverEndReason::Shutdown,
                    TimelineCommand::Advance => {
                        controller.advance();
                    }
                    TimelineCommand::Select(index) => {
                        controller.select(index);
                    }
                    TimelineCommand::Drag(index) => {
                        controller.drag(index);
                    }
                    TimelineCommand::Reset => {
                        controller.reset();
                    }
                    TimelineCommand::Play => autoplay.play(),
                    TimelineCommand::Pause => autoplay.pause(),
                }
                callback.on_frame(&controller.snapshot(autoplay.is_playing()));
            }

            _ = frames.tick() => {
                if controller.tick().changed() {
                    frame_count = frame_count.saturating_add(1);
                    callback.on_frame(&controller.snapshot(autoplay.is_playing()));
                }
            }

            _ = polls.tick() => {
                match autoplay.poll(controller) {
                    PlaybackStep::Advanced(_) | PlaybackStep::Finished => {
                        callback.on_frame(&controller.snapshot(autoplay.is_playing()));
                    }
                    PlaybackStep::Idle | PlaybackStep::Waiting => {}
                }
            }
        }
    };

    info!(
        ?end_reason,
        commands = command_count,
        frames = frame_count,
        "Timeline driver stopped"
    );
    Ok(DriverSummary {
        end_reason,
        commands: command_count,
        frames: frame_count,
    })
}

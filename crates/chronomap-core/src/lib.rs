//! Timeline-to-map synchronization engine for the Chronomap timeline map.
//!
//! This crate maps a scalar timeline position onto a consistent set of
//! visible markers, fading path segments, and an optional animation that
//! draws the newest segment, including cancellation when the timeline jumps
//! mid-animation.
//!
//! # Modules
//!
//! - [`store`] -- Loading, validating, and time-sorting events.
//! - [`visibility`] -- Threshold projection and marker presentation.
//! - [`path`] -- Connecting segments with age-based fade.
//! - [`animation`] -- The segment-drawing state machine.
//! - [`timeline`] -- [`TimelineController`], the orchestrator.
//! - [`playback`] -- Continuous auto-play on top of `advance`.
//! - [`driver`] -- The async loop owning a controller.
//! - [`map`], [`slider`], [`clock`] -- Capabilities injected into the
//!   controller.
//! - [`scene`] -- Headless [`MapSurface`] implementation.
//! - [`config`] -- Configuration loading from `chronomap-config.yaml`.
//!
//! [`TimelineController`]: timeline::TimelineController
//! [`MapSurface`]: map::MapSurface

pub mod animation;
pub mod clock;
pub mod config;
pub mod driver;
pub mod map;
pub mod path;
pub mod playback;
pub mod scene;
pub mod slider;
pub mod store;
pub mod timeline;
pub mod visibility;

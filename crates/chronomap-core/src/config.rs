//! Configuration loading and typed config structures for Chronomap.
//!
//! The configuration lives in `chronomap-config.yaml` next to the binary's
//! working directory. Every section and field is optional; missing values
//! fall back to the defaults below, which reproduce the stock behaviour of
//! the timeline map (15 second segment animation, zoom 6 follow camera,
//! dimmed past markers at 0.6 opacity).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::store::EventSource;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong shape.
    #[error("invalid value for {name}: {reason}")]
    InvalidOverride {
        /// The environment variable name.
        name: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChronomapConfig {
    /// Where events are loaded from.
    #[serde(default)]
    pub data: DataConfig,

    /// Segment-drawing animation parameters.
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Initial camera and list-selection camera parameters.
    #[serde(default)]
    pub map: MapConfig,

    /// Marker and path styling.
    #[serde(default)]
    pub style: StyleConfig,

    /// Continuous playback parameters.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Observer HTTP server binding.
    #[serde(default)]
    pub observer: ObserverConfig,
}

impl ChronomapConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CHRONOMAP_EVENTS_PATH` overrides `data.events_path`
    /// - `CHRONOMAP_EVENTS_URL` overrides `data.events_url`
    /// - `CHRONOMAP_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] for a malformed override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `CHRONOMAP_PORT` is not
    /// a valid port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `CHRONOMAP_PORT` is not
    /// a valid port number.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CHRONOMAP_EVENTS_PATH") {
            self.data.events_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("CHRONOMAP_EVENTS_URL") {
            self.data.events_url = Some(val);
        }
        if let Some(val) = lookup("CHRONOMAP_PORT") {
            self.observer.port = val.parse().map_err(|e| ConfigError::InvalidOverride {
                name: "CHRONOMAP_PORT",
                reason: format!("{e}"),
            })?;
        }
        Ok(())
    }
}

/// Event data source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Path to the JSON event list.
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,

    /// Optional HTTP URL to fetch the event list from instead of the file.
    #[serde(default)]
    pub events_url: Option<String>,
}

impl DataConfig {
    /// Where to load events from: the URL when set, the file otherwise.
    pub fn source(&self) -> EventSource {
        self.events_url.as_ref().map_or_else(
            || EventSource::File(self.events_path.clone()),
            |url| EventSource::Url(url.clone()),
        )
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
            events_url: None,
        }
    }
}

/// Segment-drawing animation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimationConfig {
    /// Wall-clock duration of one segment animation in milliseconds.
    #[serde(default = "default_animation_duration_ms")]
    pub duration_ms: u64,

    /// Zoom level the camera follows the interpolated point at.
    #[serde(default = "default_zoom")]
    pub follow_zoom: u8,

    /// Interval between animation ticks in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_animation_duration_ms(),
            follow_zoom: default_zoom(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// Camera configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapConfig {
    /// Initial camera centre as `[lat, lon]`.
    #[serde(default = "default_initial_center")]
    pub initial_center: [f64; 2],

    /// Initial zoom level.
    #[serde(default = "default_zoom")]
    pub initial_zoom: u8,

    /// Zoom level used when flying to an event picked from the list.
    #[serde(default = "default_zoom")]
    pub fly_to_zoom: u8,

    /// Duration of the fly-to transition in milliseconds.
    #[serde(default = "default_fly_to_duration_ms")]
    pub fly_to_duration_ms: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_center: default_initial_center(),
            initial_zoom: default_zoom(),
            fly_to_zoom: default_zoom(),
            fly_to_duration_ms: default_fly_to_duration_ms(),
        }
    }
}

/// Marker and path styling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleConfig {
    /// Opacity of visible markers that are not current.
    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f64,

    /// Stroke width of path segments.
    #[serde(default = "default_path_weight")]
    pub path_weight: u32,

    /// Dash pattern of fixed path segments.
    #[serde(default = "default_path_dash")]
    pub path_dash: String,

    /// Stroke colour of path segments and the animated point.
    #[serde(default = "default_path_color")]
    pub path_color: String,

    /// Radius of the animated point.
    #[serde(default = "default_point_radius")]
    pub point_radius: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            dim_opacity: default_dim_opacity(),
            path_weight: default_path_weight(),
            path_dash: default_path_dash(),
            path_color: default_path_color(),
            point_radius: default_point_radius(),
        }
    }
}

/// Continuous playback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// How often playback checks whether it may advance, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Start at the event closest to the current date instead of the first.
    #[serde(default = "default_true")]
    pub start_at_now: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            start_at_now: true,
        }
    }
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_events_path() -> PathBuf {
    PathBuf::from("data/events.json")
}

const fn default_animation_duration_ms() -> u64 {
    15_000
}

const fn default_zoom() -> u8 {
    6
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_initial_center() -> [f64; 2] {
    [20.0, 0.0]
}

const fn default_fly_to_duration_ms() -> u64 {
    1_500
}

const fn default_dim_opacity() -> f64 {
    0.6
}

const fn default_path_weight() -> u32 {
    3
}

fn default_path_dash() -> String {
    "5, 5".to_owned()
}

fn default_path_color() -> String {
    "red".to_owned()
}

const fn default_point_radius() -> u32 {
    5
}

const fn default_poll_interval_ms() -> u64 {
    100
}

const fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    5000
}

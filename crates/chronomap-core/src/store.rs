//! Event store: the immutable, time-sorted event list.
//!
//! Events arrive as [`EventRecord`]s from a single read-only fetch (a JSON
//! file or an HTTP endpoint). Each record's calendar date is parsed into a
//! millisecond timestamp and the list is stable-sorted ascending, so events
//! sharing a timestamp keep their original relative order.
//!
//! Loading never crashes the caller: [`EventStore::load`] logs a failure and
//! yields an empty store, and every downstream component treats an empty
//! store as inert. Individual records with an unparseable date or invalid
//! coordinates are skipped with a warning.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chronomap_types::{Event, EventRecord};
use tracing::{error, info, warn};
use validator::Validate;

/// Errors that can occur while fetching or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the events file failed.
    #[error("failed to read events file {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The payload was not a JSON array of event records.
    #[error("failed to parse events JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP request failed or returned a non-success status.
    #[error("failed to fetch events: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where the event list is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    /// A JSON file on disk.
    File(PathBuf),
    /// An HTTP(S) endpoint returning the JSON list.
    Url(String),
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// The loaded, time-sorted event list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStore {
    records: Vec<EventRecord>,
    events: Vec<Event>,
}

impl EventStore {
    /// An empty store.
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Build a store from raw records.
    ///
    /// Records failing validation or date parsing are skipped. The
    /// remaining events are stable-sorted by timestamp.
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        let mut events: Vec<Event> = records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| match to_event(record) {
                Ok(event) => Some(event),
                Err(reason) => {
                    warn!(position, title = %record.title, %reason, "Skipping event record");
                    None
                }
            })
            .collect();
        events.sort_by_key(|event| event.timestamp);
        Self { records, events }
    }

    /// Decode a JSON array of event records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if the payload is not a JSON array of
    /// event records.
    pub fn parse_json(json: &str) -> Result<Self, StoreError> {
        let records: Vec<EventRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Read and decode a JSON events file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read, or
    /// [`StoreError::Json`] if it cannot be decoded.
    pub fn load_file(path: &Path) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_json(&contents)
    }

    /// Fetch and decode the event list from an HTTP endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] on a transport error or non-success
    /// status, or [`StoreError::Json`] if the body cannot be decoded.
    pub async fn fetch_url(url: &str) -> Result<Self, StoreError> {
        let body = reqwest::get(url).await?.error_for_status()?.text().await?;
        Self::parse_json(&body)
    }

    /// Fetch from `source`, propagating failures.
    ///
    /// # Errors
    ///
    /// Returns whatever [`load_file`](Self::load_file) or
    /// [`fetch_url`](Self::fetch_url) returns.
    pub async fn try_load(source: &EventSource) -> Result<Self, StoreError> {
        match source {
            EventSource::File(path) => Self::load_file(path),
            EventSource::Url(url) => Self::fetch_url(url).await,
        }
    }

    /// Fetch from `source` once. On failure the error is logged and an
    /// empty store is returned; no retry is attempted.
    pub async fn load(source: &EventSource) -> Self {
        match Self::try_load(source).await {
            Ok(store) => {
                info!(
                    %source,
                    records = store.records.len(),
                    events = store.events.len(),
                    "Events loaded"
                );
                store
            }
            Err(e) => {
                error!(%source, error = %e, "Failed loading events");
                Self::empty()
            }
        }
    }

    /// The raw records in source order, including skipped ones.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// The time-sorted events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of loaded events.
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events were loaded.
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event at sorted position `index`.
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// The earliest event.
    pub fn first(&self) -> Option<&Event> {
        self.events.first()
    }

    /// The latest event.
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Highest valid timeline position, `None` when empty.
    pub const fn last_index(&self) -> Option<usize> {
        self.events.len().checked_sub(1)
    }

    /// Time between the first and last event in milliseconds; 0 for fewer
    /// than two events or when all events share one timestamp.
    pub fn max_span(&self) -> i64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.timestamp.saturating_sub(first.timestamp),
            _ => 0,
        }
    }

    /// Index of the event whose timestamp is closest to `timestamp`.
    ///
    /// Ties resolve to the earliest index.
    pub fn closest_to(&self, timestamp: i64) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (index, event) in self.events.iter().enumerate() {
            let diff = event.timestamp.abs_diff(timestamp);
            match best {
                Some((_, best_diff)) if diff >= best_diff => {}
                _ => best = Some((index, diff)),
            }
        }
        best.map(|(index, _)| index)
    }
}

/// Convert a validated record into an event.
fn to_event(record: &EventRecord) -> Result<Event, String> {
    record.validate().map_err(|e| format!("{e}"))?;
    if !record.lat.is_finite() || !record.lon.is_finite() {
        return Err("coordinates are not finite".to_owned());
    }
    let timestamp =
        parse_date(&record.date).ok_or_else(|| format!("unparseable date {:?}", record.date))?;
    Ok(Event {
        title: record.title.clone(),
        description: record.description.clone(),
        date: record.date.clone(),
        timestamp,
        latitude: record.lat,
        longitude: record.lon,
        city: record.city.clone(),
        country: record.country.clone(),
    })
}

/// Parse a calendar date string into milliseconds since the epoch (UTC).
///
/// Accepted forms: RFC 3339 datetimes, `YYYY-MM-DDTHH:MM[:SS]` and
/// `YYYY-MM-DD HH:MM[:SS]` (UTC), `YYYY-MM-DD`, `YYYY-MM`, and `YYYY`
/// (midnight UTC of the first day).
pub fn parse_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).timestamp_millis());
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01-01"), "%Y-%m-%d"))
        .ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Format a timestamp as a `YYYY-MM-DD` date label (UTC).
pub fn format_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .map_or_else(String::new, |dt| dt.format("%Y-%m-%d").to_string())
}

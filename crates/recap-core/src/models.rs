use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Milliseconds in one second.
pub const MS_PER_SECOND: f64 = 1_000.0;
/// Milliseconds in one minute.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// One object from a streaming-history export file, as written by the
/// exporter.
///
/// Only the schema fields are typed. Every other key (IP address, user
/// agent, episode metadata, ...) lands in [`RawPlaybackRecord::extra`] and is
/// dropped by projection.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlaybackRecord {
    /// Timestamp of the stream; usually an RFC 3339 string.
    pub ts: Value,
    /// Milliseconds actually played.
    pub ms_played: u64,
    pub platform: Option<String>,
    pub master_metadata_track_name: Option<String>,
    pub master_metadata_album_artist_name: Option<String>,
    pub master_metadata_album_album_name: Option<String>,
    pub spotify_track_uri: Option<String>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
    pub skipped: Option<bool>,
    /// Keys outside the schema.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A raw record after the loader has parsed its timestamp.
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    /// Absolute instant of the stream.
    pub timestamp_utc: DateTime<Utc>,
    /// Calendar date of `timestamp_utc`.
    pub stream_date: NaiveDate,
    pub raw: RawPlaybackRecord,
}

impl LoadedRecord {
    /// Wrap `raw`, deriving `stream_date` from `timestamp_utc`.
    pub fn new(raw: RawPlaybackRecord, timestamp_utc: DateTime<Utc>) -> Self {
        Self {
            timestamp_utc,
            stream_date: timestamp_utc.date_naive(),
            raw,
        }
    }
}

/// A single streamed track, narrowed to the fields the recap is allowed to
/// see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    /// Device or app the stream played on.
    pub platform: String,
    pub timestamp_utc: DateTime<Utc>,
    pub stream_date: NaiveDate,
    pub ms_played: u64,
    /// `ms_played / 1000`.
    pub seconds: f64,
    /// `seconds / 60`.
    pub minutes: f64,
    pub track_name: String,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    /// Stable track identifier; every event carries one and counts as one stream.
    pub track_uri: String,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
    pub skipped: bool,
}

impl PlaybackEvent {
    /// Seconds played for a millisecond count.
    pub fn seconds_for(ms_played: u64) -> f64 {
        ms_played as f64 / MS_PER_SECOND
    }

    /// Minutes played for a millisecond count.
    pub fn minutes_for(ms_played: u64) -> f64 {
        ms_played as f64 / MS_PER_MINUTE
    }
}

/// Inclusive bounds on `stream_date`. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(min_date: Option<NaiveDate>, max_date: Option<NaiveDate>) -> Self {
        Self { min_date, max_date }
    }

    /// January 1st through December 31st of `year`.
    ///
    /// Returns an unbounded range for years chrono cannot represent.
    pub fn for_year(year: i32) -> Self {
        Self {
            min_date: NaiveDate::from_ymd_opt(year, 1, 1),
            max_date: NaiveDate::from_ymd_opt(year, 12, 31),
        }
    }

    /// Whether `date` lies within the range. Both bounds are inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(min) = self.min_date {
            if date < min {
                return false;
            }
        }
        if let Some(max) = self.max_date {
            if date > max {
                return false;
            }
        }
        true
    }

    /// The year both bounds share, if they do.
    pub fn single_year(&self) -> Option<i32> {
        match (self.min_date, self.max_date) {
            (Some(min), Some(max)) if min.year() == max.year() => Some(min.year()),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

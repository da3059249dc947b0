use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Naive patterns tried after RFC 3339; all are interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses the `ts` field of streaming-history records.
///
/// Exports write `"2025-03-14T21:07:45Z"`, but older dumps and hand-edited
/// files also show up with naive date-times or Unix seconds.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Attempt to parse a [`serde_json::Value`] into a UTC [`DateTime`].
    ///
    /// * JSON string → RFC 3339 (with `Z` or an offset), then the naive
    ///   patterns in [`NAIVE_FORMATS`], then a bare `YYYY-MM-DD` at midnight.
    /// * JSON number → Unix timestamp in seconds (integer or float).
    /// * anything else → `None`.
    pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(s) => Self::parse_str(s.trim()),
            Value::Number(n) => {
                if let Some(secs) = n.as_i64() {
                    DateTime::from_timestamp(secs, 0)
                } else if let Some(f) = n.as_f64() {
                    Self::from_fractional_seconds(f)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Epoch seconds with a fractional part. The sub-second part is always
    /// measured forward from the floor, so `-1.5` is 500ms after `-2`.
    fn from_fractional_seconds(f: f64) -> Option<DateTime<Utc>> {
        if !f.is_finite() {
            return None;
        }
        let floor = f.floor();
        let mut secs = floor as i64;
        let mut nanos = ((f - floor) * 1_000_000_000.0).round() as u32;
        if nanos >= 1_000_000_000 {
            secs = secs.checked_add(1)?;
            nanos = 0;
        }
        DateTime::from_timestamp(secs, nanos)
    }

    /// Parse a timestamp string. See [`TimestampProcessor::parse`].
    pub fn parse_str(s: &str) -> Option<DateTime<Utc>> {
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }

        debug!("could not parse timestamp string \"{}\"", s);
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

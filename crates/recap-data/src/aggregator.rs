//! Schema projection and grouped summaries over playback events.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use recap_core::error::{RecapError, Result};
use recap_core::models::{LoadedRecord, PlaybackEvent, MS_PER_MINUTE};
use serde::Serialize;

/// Monday through Sunday.
const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ── Keys and metrics ──────────────────────────────────────────────────────────

/// Dimension used to bucket events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Track name plus artist name.
    Track,
    Artist,
    /// Stream date.
    Day,
    /// Year and month of the stream date.
    Month,
    DayOfWeek,
    /// Hour of the UTC timestamp.
    HourOfDay,
    Platform,
}

/// Chronological subset of [`GroupKey`] usable with
/// [`StreamAggregator::series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKey {
    Day,
    Month,
    DayOfWeek,
    HourOfDay,
}

impl From<TimeKey> for GroupKey {
    fn from(key: TimeKey) -> Self {
        match key {
            TimeKey::Day => GroupKey::Day,
            TimeKey::Month => GroupKey::Month,
            TimeKey::DayOfWeek => GroupKey::DayOfWeek,
            TimeKey::HourOfDay => GroupKey::HourOfDay,
        }
    }
}

/// Quantity computed per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Number of events in the group.
    Count,
    /// Sum of minutes played in the group.
    TotalMinutes,
}

/// The value of one group under a [`GroupKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupValue {
    Track { name: String, artist: String },
    Artist { name: String },
    Day { date: NaiveDate },
    Month { year: i32, month: u32 },
    DayOfWeek { weekday: Weekday },
    HourOfDay { hour: u32 },
    Platform { name: String },
}

impl GroupValue {
    /// Extract the group of `event` under `key`.
    ///
    /// Track and artist grouping skip events without an artist name.
    pub fn of(event: &PlaybackEvent, key: GroupKey) -> Option<Self> {
        let value = match key {
            GroupKey::Track => GroupValue::Track {
                name: event.track_name.clone(),
                artist: event.artist_name.clone()?,
            },
            GroupKey::Artist => GroupValue::Artist {
                name: event.artist_name.clone()?,
            },
            GroupKey::Day => GroupValue::Day {
                date: event.stream_date,
            },
            GroupKey::Month => GroupValue::Month {
                year: event.stream_date.year(),
                month: event.stream_date.month(),
            },
            GroupKey::DayOfWeek => GroupValue::DayOfWeek {
                weekday: event.stream_date.weekday(),
            },
            GroupKey::HourOfDay => GroupValue::HourOfDay {
                hour: event.timestamp_utc.hour(),
            },
            GroupKey::Platform => GroupValue::Platform {
                name: event.platform.clone(),
            },
        };
        Some(value)
    }

    /// Human-readable label, e.g. `"2025-03"` or `"Wednesday"`.
    pub fn label(&self) -> String {
        match self {
            GroupValue::Track { name, artist } => format!("{} - {}", name, artist),
            GroupValue::Artist { name } | GroupValue::Platform { name } => name.clone(),
            GroupValue::Day { date } => date.format("%Y-%m-%d").to_string(),
            GroupValue::Month { year, month } => format!("{:04}-{:02}", year, month),
            GroupValue::DayOfWeek { weekday } => weekday_name(*weekday).to_string(),
            GroupValue::HourOfDay { hour } => format!("{:02}:00", hour),
        }
    }

    /// Position on a time axis; `None` for non-chronological groups.
    fn ordinal(&self) -> Option<i64> {
        match self {
            GroupValue::Day { date } => Some(i64::from(date.num_days_from_ce())),
            GroupValue::Month { year, month } => Some(i64::from(*year) * 12 + i64::from(*month)),
            GroupValue::DayOfWeek { weekday } => Some(i64::from(weekday.num_days_from_monday())),
            GroupValue::HourOfDay { hour } => Some(i64::from(*hour)),
            _ => None,
        }
    }
}

/// Metric value of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Minutes(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Count(n) => *n as f64,
            MetricValue::Minutes(m) => *m,
        }
    }
}

/// One row of a top-N table or time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    pub key: GroupValue,
    pub value: MetricValue,
}

// ── GroupStats ────────────────────────────────────────────────────────────────

/// Running totals for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub count: u64,
    pub ms_played: u64,
}

impl GroupStats {
    pub fn add_event(&mut self, event: &PlaybackEvent) {
        self.count += 1;
        self.ms_played += event.ms_played;
    }

    /// Minutes from the summed milliseconds, so the result does not depend on
    /// the order events were added in.
    pub fn minutes(&self) -> f64 {
        self.ms_played as f64 / MS_PER_MINUTE
    }

    pub fn value(&self, metric: Metric) -> MetricValue {
        match metric {
            Metric::Count => MetricValue::Count(self.count),
            Metric::TotalMinutes => MetricValue::Minutes(self.minutes()),
        }
    }
}

// ── SummaryStats ──────────────────────────────────────────────────────────────

/// Headline numbers for a set of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    /// `Σ ms_played / 60000`.
    pub total_minutes: f64,
    /// Number of events; each carries exactly one track URI.
    pub total_streams: u64,
    /// Distinct (track name, artist name) pairs.
    pub unique_tracks: usize,
    /// Distinct non-null artist names.
    pub unique_artists: usize,
}

// ── StreamAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that projects and groups playback events.
pub struct StreamAggregator;

impl StreamAggregator {
    /// Narrow loaded records to [`PlaybackEvent`]s.
    ///
    /// Fields outside the schema are dropped. A record without a track name,
    /// platform or track URI fails with [`RecapError::Schema`]; the loader is
    /// expected to have removed trackless records already.
    pub fn project(records: &[LoadedRecord]) -> Result<Vec<PlaybackEvent>> {
        records.iter().map(Self::project_record).collect()
    }

    /// Total minutes, stream count and distinct track/artist counts.
    pub fn summary_stats(events: &[PlaybackEvent]) -> SummaryStats {
        let mut total_ms: u64 = 0;
        let mut tracks: HashSet<(&str, &str)> = HashSet::new();
        let mut artists: HashSet<&str> = HashSet::new();

        for event in events {
            total_ms += event.ms_played;
            if let Some(artist) = event.artist_name.as_deref() {
                tracks.insert((event.track_name.as_str(), artist));
                artists.insert(artist);
            }
        }

        SummaryStats {
            total_minutes: total_ms as f64 / MS_PER_MINUTE,
            total_streams: events.len() as u64,
            unique_tracks: tracks.len(),
            unique_artists: artists.len(),
        }
    }

    /// Rank the groups of `key` by `metric`, highest first.
    ///
    /// Ties keep the order in which groups first appear in `events`. Day of
    /// week always yields all seven days, zero-filled, with ties in calendar
    /// order. `limit` keeps the first N rows; `None` keeps all.
    pub fn top_by(
        events: &[PlaybackEvent],
        key: GroupKey,
        metric: Metric,
        limit: Option<usize>,
    ) -> Vec<RankedGroup> {
        let groups = if key == GroupKey::DayOfWeek {
            Self::group_by_weekday(events)
        } else {
            Self::group_in_encounter_order(events, key)
        };

        let mut ranked: Vec<RankedGroup> = groups
            .into_iter()
            .map(|(key, stats)| RankedGroup {
                key,
                value: stats.value(metric),
            })
            .collect();

        // `sort_by` is stable, which gives the tie-break.
        ranked.sort_by(|a, b| b.value.as_f64().total_cmp(&a.value.as_f64()));

        if let Some(n) = limit {
            ranked.truncate(n);
        }
        ranked
    }

    /// Time series of `metric` per `key`, in chronological order.
    ///
    /// Only periods with events appear, except for day of week, which always
    /// has seven rows from Monday to Sunday.
    pub fn series(events: &[PlaybackEvent], key: TimeKey, metric: Metric) -> Vec<RankedGroup> {
        // BTreeMap keeps the periods sorted.
        let mut map: BTreeMap<i64, (GroupValue, GroupStats)> = BTreeMap::new();

        if key == TimeKey::DayOfWeek {
            for weekday in WEEK {
                let value = GroupValue::DayOfWeek { weekday };
                if let Some(ordinal) = value.ordinal() {
                    map.insert(ordinal, (value, GroupStats::default()));
                }
            }
        }

        for event in events {
            let Some(value) = GroupValue::of(event, key.into()) else {
                continue;
            };
            let Some(ordinal) = value.ordinal() else {
                continue;
            };
            map.entry(ordinal)
                .or_insert_with(|| (value, GroupStats::default()))
                .1
                .add_event(event);
        }

        map.into_values()
            .map(|(key, stats)| RankedGroup {
                key,
                value: stats.value(metric),
            })
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn project_record(record: &LoadedRecord) -> Result<PlaybackEvent> {
        let raw = &record.raw;
        let track_name = raw
            .master_metadata_track_name
            .clone()
            .ok_or(RecapError::Schema {
                field: "master_metadata_track_name",
            })?;
        let platform = raw
            .platform
            .clone()
            .ok_or(RecapError::Schema { field: "platform" })?;
        let track_uri = raw
            .spotify_track_uri
            .clone()
            .ok_or(RecapError::Schema {
                field: "spotify_track_uri",
            })?;

        Ok(PlaybackEvent {
            platform,
            timestamp_utc: record.timestamp_utc,
            stream_date: record.stream_date,
            ms_played: raw.ms_played,
            seconds: PlaybackEvent::seconds_for(raw.ms_played),
            minutes: PlaybackEvent::minutes_for(raw.ms_played),
            track_name,
            artist_name: raw.master_metadata_album_artist_name.clone(),
            album_name: raw.master_metadata_album_album_name.clone(),
            track_uri,
            reason_start: raw.reason_start.clone(),
            reason_end: raw.reason_end.clone(),
            // Older exports leave `skipped` null for streams that were not skipped.
            skipped: raw.skipped.unwrap_or(false),
        })
    }

    /// Group `events`, keeping groups in order of first appearance.
    fn group_in_encounter_order(
        events: &[PlaybackEvent],
        key: GroupKey,
    ) -> Vec<(GroupValue, GroupStats)> {
        let mut index: HashMap<GroupValue, usize> = HashMap::new();
        let mut groups: Vec<(GroupValue, GroupStats)> = Vec::new();

        for event in events {
            let Some(value) = GroupValue::of(event, key) else {
                continue;
            };
            let slot = *index.entry(value.clone()).or_insert_with(|| {
                groups.push((value, GroupStats::default()));
                groups.len() - 1
            });
            groups[slot].1.add_event(event);
        }

        groups
    }

    /// All seven weekdays in calendar order, zero-filled.
    fn group_by_weekday(events: &[PlaybackEvent]) -> Vec<(GroupValue, GroupStats)> {
        let mut days: Vec<(GroupValue, GroupStats)> = WEEK
            .iter()
            .map(|&weekday| (GroupValue::DayOfWeek { weekday }, GroupStats::default()))
            .collect();

        for event in events {
            let slot = event.stream_date.weekday().num_days_from_monday() as usize;
            days[slot].1.add_event(event);
        }

        days
    }
}

/// Full English name of a weekday.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use recap_core::models::RawPlaybackRecord;
    use serde_json::json;

    fn make_event(ts: &str, track: &str, artist: Option<&str>, ms: u64) -> PlaybackEvent {
        let timestamp = DateTime::parse_from_rfc3339(ts)
            .unwrap()
            .with_timezone(&Utc);
        PlaybackEvent {
            platform: "android".to_string(),
            timestamp_utc: timestamp,
            stream_date: timestamp.date_naive(),
            ms_played: ms,
            seconds: PlaybackEvent::seconds_for(ms),
            minutes: PlaybackEvent::minutes_for(ms),
            track_name: track.to_string(),
            artist_name: artist.map(str::to_string),
            album_name: None,
            track_uri: format!("spotify:track:{}", track),
            reason_start: None,
            reason_end: None,
            skipped: false,
        }
    }

    fn on_platform(mut event: PlaybackEvent, platform: &str) -> PlaybackEvent {
        event.platform = platform.to_string();
        event
    }

    fn loaded(value: serde_json::Value) -> LoadedRecord {
        let raw: RawPlaybackRecord = serde_json::from_value(value).unwrap();
        let ts = recap_core::data_processors::TimestampProcessor::parse(&raw.ts).unwrap();
        LoadedRecord::new(raw, ts)
    }

    fn labels(rows: &[RankedGroup]) -> Vec<String> {
        rows.iter().map(|r| r.key.label()).collect()
    }

    fn values(rows: &[RankedGroup]) -> Vec<f64> {
        rows.iter().map(|r| r.value.as_f64()).collect()
    }

    /// Three plays of ("A", "X") on 2025-01-01.
    fn single_track_day() -> Vec<PlaybackEvent> {
        vec![
            make_event("2025-01-01T08:00:00Z", "A", Some("X"), 60_000),
            make_event("2025-01-01T09:00:00Z", "A", Some("X"), 120_000),
            make_event("2025-01-01T10:00:00Z", "A", Some("X"), 30_000),
        ]
    }

    // ── project ───────────────────────────────────────────────────────────────

    #[test]
    fn test_project_keeps_schema_and_derives_durations() {
        let record = loaded(json!({
            "ts": "2025-04-05T18:30:00Z",
            "platform": "web_player",
            "ms_played": 150_000,
            "master_metadata_track_name": "Song",
            "master_metadata_album_artist_name": "Band",
            "master_metadata_album_album_name": "Record",
            "spotify_track_uri": "spotify:track:abc",
            "reason_start": "fwdbtn",
            "reason_end": "endplay",
            "skipped": true,
            "ip_addr": "203.0.113.9",
            "username": "someone",
        }));

        let events = StreamAggregator::project(&[record]).unwrap();
        let event = &events[0];

        assert_eq!(event.platform, "web_player");
        assert_eq!(event.track_name, "Song");
        assert_eq!(event.artist_name.as_deref(), Some("Band"));
        assert_eq!(event.album_name.as_deref(), Some("Record"));
        assert_eq!(event.track_uri, "spotify:track:abc");
        assert_eq!(event.reason_start.as_deref(), Some("fwdbtn"));
        assert_eq!(event.reason_end.as_deref(), Some("endplay"));
        assert!(event.skipped);
        assert_eq!(event.seconds, 150.0);
        assert_eq!(event.minutes, 2.5);
        assert_eq!(event.stream_date, event.timestamp_utc.date_naive());
    }

    #[test]
    fn test_project_never_exposes_unknown_fields() {
        let record = loaded(json!({
            "ts": "2025-04-05T18:30:00Z",
            "platform": "ios",
            "ms_played": 1,
            "master_metadata_track_name": "Song",
            "spotify_track_uri": "spotify:track:song",
            "ip_addr": "203.0.113.9",
        }));

        let events = StreamAggregator::project(&[record]).unwrap();
        let serialized = serde_json::to_value(&events[0]).unwrap();
        let keys: Vec<&str> = serialized
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert!(!keys.contains(&"ip_addr"));
        assert!(!serialized.to_string().contains("203.0.113.9"));
    }

    #[test]
    fn test_project_missing_track_name_is_schema_error() {
        let record = loaded(json!({
            "ts": "2025-04-05T18:30:00Z",
            "platform": "ios",
            "ms_played": 1,
            "master_metadata_track_name": null,
        }));

        let err = StreamAggregator::project(&[record]).unwrap_err();
        assert!(matches!(
            err,
            RecapError::Schema {
                field: "master_metadata_track_name"
            }
        ));
    }

    #[test]
    fn test_project_missing_platform_is_schema_error() {
        let record = loaded(json!({
            "ts": "2025-04-05T18:30:00Z",
            "ms_played": 1,
            "master_metadata_track_name": "Song",
        }));

        let err = StreamAggregator::project(&[record]).unwrap_err();
        assert!(matches!(err, RecapError::Schema { field: "platform" }));
    }

    #[test]
    fn test_project_missing_track_uri_is_schema_error() {
        let record = loaded(json!({
            "ts": "2025-04-05T18:30:00Z",
            "platform": "ios",
            "ms_played": 1,
            "master_metadata_track_name": "Song",
            "spotify_track_uri": null,
        }));

        let err = StreamAggregator::project(&[record]).unwrap_err();
        assert!(matches!(
            err,
            RecapError::Schema {
                field: "spotify_track_uri"
            }
        ));
    }

    #[test]
    fn test_project_null_skipped_is_not_skipped() {
        let record = loaded(json!({
            "ts": "2025-04-05T18:30:00Z",
            "platform": "ios",
            "ms_played": 1,
            "master_metadata_track_name": "Song",
            "spotify_track_uri": "spotify:track:song",
            "skipped": null,
        }));

        let events = StreamAggregator::project(&[record]).unwrap();
        assert!(!events[0].skipped);
    }

    // ── summary_stats ─────────────────────────────────────────────────────────

    #[test]
    fn test_summary_stats_single_track_example() {
        let stats = StreamAggregator::summary_stats(&single_track_day());
        assert_eq!(stats.total_minutes, 3.5);
        assert_eq!(stats.total_streams, 3);
        assert_eq!(stats.unique_tracks, 1);
        assert_eq!(stats.unique_artists, 1);
    }

    #[test]
    fn test_summary_stats_empty() {
        let stats = StreamAggregator::summary_stats(&[]);
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.total_minutes, 0.0);
    }

    #[test]
    fn test_summary_stats_identity_is_name_and_artist_not_uri() {
        let mut remaster = make_event("2025-01-02T08:00:00Z", "A", Some("X"), 1_000);
        remaster.track_uri = "spotify:track:A-remaster".to_string();
        let events = vec![
            make_event("2025-01-01T08:00:00Z", "A", Some("X"), 1_000),
            remaster,
            make_event("2025-01-03T08:00:00Z", "A", Some("Y"), 1_000),
        ];

        let stats = StreamAggregator::summary_stats(&events);
        assert_eq!(stats.unique_tracks, 2);
        assert_eq!(stats.unique_artists, 2);
    }

    #[test]
    fn test_summary_stats_null_artist() {
        let events = vec![
            make_event("2025-01-01T08:00:00Z", "Orphan", None, 90_000),
            make_event("2025-01-01T09:00:00Z", "B", Some("Y"), 30_000),
        ];

        let stats = StreamAggregator::summary_stats(&events);
        assert_eq!(stats.total_minutes, 2.0);
        assert_eq!(stats.total_streams, 2);
        assert_eq!(stats.unique_tracks, 1);
        assert_eq!(stats.unique_artists, 1);
    }

    #[test]
    fn test_summary_stats_unique_tracks_never_exceed_streams() {
        let events = vec![
            make_event("2025-01-01T08:00:00Z", "A", Some("X"), 1),
            make_event("2025-01-01T08:01:00Z", "A", Some("X"), 1),
            make_event("2025-01-01T08:02:00Z", "A", Some("Y"), 1),
            make_event("2025-01-01T08:03:00Z", "B", None, 1),
        ];

        let stats = StreamAggregator::summary_stats(&events);
        assert_eq!(stats.total_streams, 4);
        assert_eq!(stats.unique_tracks, 2);
        assert!(stats.unique_tracks as u64 <= stats.total_streams);
    }

    #[test]
    fn test_summary_stats_total_minutes_matches_millisecond_sum() {
        let ms_values = [1u64, 333, 59_999, 60_001, 1_234_567, 7];
        let events: Vec<PlaybackEvent> = ms_values
            .iter()
            .enumerate()
            .map(|(i, &ms)| make_event("2025-05-05T05:05:05Z", &format!("T{i}"), Some("X"), ms))
            .collect();

        let stats = StreamAggregator::summary_stats(&events);
        let expected = ms_values.iter().sum::<u64>() as f64 / 60_000.0;
        assert_eq!(stats.total_minutes, expected);
        assert!(stats.unique_tracks as u64 <= stats.total_streams);
    }

    // ── top_by ────────────────────────────────────────────────────────────────

    #[test]
    fn test_top_by_track_minutes_example() {
        let rows = StreamAggregator::top_by(
            &single_track_day(),
            GroupKey::Track,
            Metric::TotalMinutes,
            Some(1),
        );
        assert_eq!(
            rows,
            vec![RankedGroup {
                key: GroupValue::Track {
                    name: "A".to_string(),
                    artist: "X".to_string(),
                },
                value: MetricValue::Minutes(3.5),
            }]
        );
    }

    #[test]
    fn test_top_by_count_sorted_descending() {
        let events = vec![
            make_event("2025-01-01T08:00:00Z", "A", Some("X"), 1),
            make_event("2025-01-01T08:01:00Z", "B", Some("Y"), 1),
            make_event("2025-01-01T08:02:00Z", "B", Some("Y"), 1),
            make_event("2025-01-01T08:03:00Z", "C", Some("Z"), 1),
            make_event("2025-01-01T08:04:00Z", "C", Some("Z"), 1),
            make_event("2025-01-01T08:05:00Z", "C", Some("Z"), 1),
        ];

        let rows = StreamAggregator::top_by(&events, GroupKey::Artist, Metric::Count, None);
        assert_eq!(labels(&rows), vec!["Z", "Y", "X"]);
        assert_eq!(values(&rows), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_top_by_ties_keep_first_encountered_order() {
        let events = vec![
            make_event("2025-01-01T08:00:00Z", "Late", Some("Q"), 60_000),
            make_event("2025-01-01T08:01:00Z", "Early", Some("P"), 60_000),
            make_event("2025-01-01T08:02:00Z", "Big", Some("R"), 120_000),
            make_event("2025-01-01T08:03:00Z", "Mid", Some("S"), 60_000),
        ];

        let first = StreamAggregator::top_by(&events, GroupKey::Track, Metric::TotalMinutes, None);
        assert_eq!(
            labels(&first),
            vec!["Big - R", "Late - Q", "Early - P", "Mid - S"]
        );

        let again = StreamAggregator::top_by(&events, GroupKey::Track, Metric::TotalMinutes, None);
        assert_eq!(first, again);
    }

    #[test]
    fn test_top_by_limit_truncates_and_none_returns_all() {
        let events: Vec<PlaybackEvent> = (0..8)
            .map(|i| make_event("2025-01-01T08:00:00Z", &format!("T{i}"), Some("X"), 1))
            .collect();

        assert_eq!(
            StreamAggregator::top_by(&events, GroupKey::Track, Metric::Count, Some(5)).len(),
            5
        );
        assert_eq!(
            StreamAggregator::top_by(&events, GroupKey::Track, Metric::Count, None).len(),
            8
        );
        assert!(StreamAggregator::top_by(&events, GroupKey::Track, Metric::Count, Some(0)).is_empty());
    }

    #[test]
    fn test_top_by_track_and_artist_skip_null_artist() {
        let events = vec![
            make_event("2025-01-01T08:00:00Z", "Orphan", None, 500_000),
            make_event("2025-01-01T09:00:00Z", "B", Some("Y"), 1_000),
        ];

        let tracks = StreamAggregator::top_by(&events, GroupKey::Track, Metric::TotalMinutes, None);
        assert_eq!(labels(&tracks), vec!["B - Y"]);
        let artists = StreamAggregator::top_by(&events, GroupKey::Artist, Metric::Count, None);
        assert_eq!(labels(&artists), vec!["Y"]);
        let days = StreamAggregator::top_by(&events, GroupKey::Day, Metric::Count, None);
        assert_eq!(values(&days), vec![2.0]);
    }

    #[test]
    fn test_top_by_day_month_hour_platform() {
        let events = vec![
            on_platform(make_event("2025-01-31T23:30:00Z", "A", Some("X"), 60_000), "ios"),
            on_platform(make_event("2025-02-01T07:10:00Z", "A", Some("X"), 60_000), "osx"),
            on_platform(make_event("2025-02-02T07:50:00Z", "B", Some("Y"), 60_000), "osx"),
        ];

        let days = StreamAggregator::top_by(&events, GroupKey::Day, Metric::Count, None);
        assert_eq!(labels(&days), vec!["2025-01-31", "2025-02-01", "2025-02-02"]);

        let months = StreamAggregator::top_by(&events, GroupKey::Month, Metric::Count, None);
        assert_eq!(labels(&months), vec!["2025-02", "2025-01"]);
        assert_eq!(values(&months), vec![2.0, 1.0]);

        let hours = StreamAggregator::top_by(&events, GroupKey::HourOfDay, Metric::Count, None);
        assert_eq!(labels(&hours), vec!["07:00", "23:00"]);

        let platforms =
            StreamAggregator::top_by(&events, GroupKey::Platform, Metric::TotalMinutes, Some(1));
        assert_eq!(labels(&platforms), vec!["osx"]);
        assert_eq!(values(&platforms), vec![2.0]);
    }

    #[test]
    fn test_top_by_day_of_week_always_seven_rows() {
        // 2025-01-01 is a Wednesday, 2025-01-04 a Saturday.
        let events = vec![
            make_event("2025-01-01T08:00:00Z", "A", Some("X"), 60_000),
            make_event("2025-01-04T08:00:00Z", "A", Some("X"), 60_000),
            make_event("2025-01-04T09:00:00Z", "A", Some("X"), 60_000),
        ];

        let rows = StreamAggregator::top_by(&events, GroupKey::DayOfWeek, Metric::Count, None);
        assert_eq!(rows.len(), 7);
        assert_eq!(
            labels(&rows),
            vec![
                "Saturday",
                "Wednesday",
                "Monday",
                "Tuesday",
                "Thursday",
                "Friday",
                "Sunday"
            ]
        );
        assert_eq!(values(&rows), vec![2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

        let empty = StreamAggregator::top_by(&[], GroupKey::DayOfWeek, Metric::TotalMinutes, None);
        assert_eq!(empty.len(), 7);
        assert!(empty.iter().all(|r| r.value == MetricValue::Minutes(0.0)));
    }

    #[test]
    fn test_top_by_empty_input() {
        for key in [
            GroupKey::Track,
            GroupKey::Artist,
            GroupKey::Day,
            GroupKey::Month,
            GroupKey::HourOfDay,
            GroupKey::Platform,
        ] {
            assert!(StreamAggregator::top_by(&[], key, Metric::Count, Some(5)).is_empty());
        }
    }

    // ── series ────────────────────────────────────────────────────────────────

    #[test]
    fn test_series_is_chronological() {
        let events = vec![
            make_event("2025-03-10T12:00:00Z", "A", Some("X"), 60_000),
            make_event("2024-12-31T12:00:00Z", "A", Some("X"), 60_000),
            make_event("2025-03-01T12:00:00Z", "A", Some("X"), 120_000),
        ];

        let months = StreamAggregator::series(&events, TimeKey::Month, Metric::TotalMinutes);
        assert_eq!(labels(&months), vec!["2024-12", "2025-03"]);
        assert_eq!(values(&months), vec![1.0, 3.0]);

        let days = StreamAggregator::series(&events, TimeKey::Day, Metric::Count);
        assert_eq!(labels(&days), vec!["2024-12-31", "2025-03-01", "2025-03-10"]);
    }

    #[test]
    fn test_series_day_of_week_calendar_order() {
        let events = vec![make_event("2025-01-05T12:00:00Z", "A", Some("X"), 60_000)];

        let rows = StreamAggregator::series(&events, TimeKey::DayOfWeek, Metric::Count);
        assert_eq!(
            labels(&rows),
            vec![
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday"
            ]
        );
        assert_eq!(values(&rows), vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_series_hour_of_day_uses_utc_hour() {
        let events = vec![
            make_event("2025-01-05T23:00:00Z", "A", Some("X"), 1),
            make_event("2025-01-05T00:59:00Z", "A", Some("X"), 1),
        ];

        let rows = StreamAggregator::series(&events, TimeKey::HourOfDay, Metric::Count);
        assert_eq!(labels(&rows), vec!["00:00", "23:00"]);
    }

    #[test]
    fn test_series_empty() {
        assert!(StreamAggregator::series(&[], TimeKey::Month, Metric::Count).is_empty());
        assert_eq!(
            StreamAggregator::series(&[], TimeKey::DayOfWeek, Metric::Count).len(),
            7
        );
    }

    // ── serialisation ─────────────────────────────────────────────────────────

    #[test]
    fn test_ranked_group_serialises_tagged_key_and_bare_value() {
        let row = RankedGroup {
            key: GroupValue::Month {
                year: 2025,
                month: 3,
            },
            value: MetricValue::Count(4),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(
            value,
            json!({"key": {"kind": "month", "year": 2025, "month": 3}, "value": 4})
        );
    }
}

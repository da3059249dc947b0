//! End-to-end pipeline: load, project, and assemble a [`RecapReport`].

use std::path::PathBuf;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use recap_core::error::Result;
use recap_core::models::{DateRange, PlaybackEvent};
use serde::Serialize;
use tracing::info;

use crate::aggregator::{GroupKey, Metric, RankedGroup, StreamAggregator, SummaryStats, TimeKey};
use crate::reader::load_events;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of events the report covers.
    pub events: usize,
    /// Earliest stream date in the data, if any.
    pub first_stream_date: Option<NaiveDate>,
    /// Latest stream date in the data, if any.
    pub last_stream_date: Option<NaiveDate>,
}

/// Everything the presentation layer shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecapReport {
    pub metadata: ReportMetadata,
    pub summary: SummaryStats,
    pub top_tracks_by_plays: Vec<RankedGroup>,
    pub top_tracks_by_minutes: Vec<RankedGroup>,
    pub top_artists_by_plays: Vec<RankedGroup>,
    pub top_artists_by_minutes: Vec<RankedGroup>,
    pub top_platforms: Vec<RankedGroup>,
    /// Minutes per weekday, Monday first.
    pub minutes_by_weekday: Vec<RankedGroup>,
    /// Minutes per month, chronological.
    pub minutes_by_month: Vec<RankedGroup>,
    /// Minutes per UTC hour, chronological.
    pub minutes_by_hour: Vec<RankedGroup>,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load `paths` within `range` and project the result onto the playback
/// schema.
pub fn load_playback_events(paths: &[PathBuf], range: DateRange) -> Result<Vec<PlaybackEvent>> {
    let load_start = Instant::now();
    let records = load_events(paths, range)?;
    let load_time = load_start.elapsed();

    let events = StreamAggregator::project(&records)?;

    info!(
        files = paths.len(),
        events = events.len(),
        load_ms = load_time.as_millis() as u64,
        "loaded streaming history"
    );

    Ok(events)
}

/// Build the full report for `events`, keeping `top` rows per ranking.
pub fn build_report(events: &[PlaybackEvent], top: Option<usize>) -> RecapReport {
    let first_stream_date = events.iter().map(|e| e.stream_date).min();
    let last_stream_date = events.iter().map(|e| e.stream_date).max();

    RecapReport {
        metadata: ReportMetadata {
            generated_at: Utc::now().to_rfc3339(),
            events: events.len(),
            first_stream_date,
            last_stream_date,
        },
        summary: StreamAggregator::summary_stats(events),
        top_tracks_by_plays: StreamAggregator::top_by(events, GroupKey::Track, Metric::Count, top),
        top_tracks_by_minutes: StreamAggregator::top_by(
            events,
            GroupKey::Track,
            Metric::TotalMinutes,
            top,
        ),
        top_artists_by_plays: StreamAggregator::top_by(
            events,
            GroupKey::Artist,
            Metric::Count,
            top,
        ),
        top_artists_by_minutes: StreamAggregator::top_by(
            events,
            GroupKey::Artist,
            Metric::TotalMinutes,
            top,
        ),
        top_platforms: StreamAggregator::top_by(events, GroupKey::Platform, Metric::Count, top),
        minutes_by_weekday: StreamAggregator::series(
            events,
            TimeKey::DayOfWeek,
            Metric::TotalMinutes,
        ),
        minutes_by_month: StreamAggregator::series(events, TimeKey::Month, Metric::TotalMinutes),
        minutes_by_hour: StreamAggregator::series(
            events,
            TimeKey::HourOfDay,
            Metric::TotalMinutes,
        ),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Plain-text rendering of a [`RecapReport`].

use std::fmt::Write as _;

use recap_core::formatting::{format_count, format_decimal, format_listening_time};
use recap_core::models::DateRange;
use recap_data::aggregator::{GroupValue, MetricValue, RankedGroup};
use recap_data::analysis::RecapReport;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a text cell may get before it is cut with an ellipsis.
const MAX_CELL_WIDTH: usize = 40;

/// Gap between columns.
const COLUMN_GAP: &str = "  ";

/// Render the whole report as aligned plain text.
pub fn render_text(report: &RecapReport, range: DateRange) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "Listening recap: {}", describe_range(range));
    match (
        report.metadata.first_stream_date,
        report.metadata.last_stream_date,
    ) {
        (Some(first), Some(last)) => {
            let _ = writeln!(
                out,
                "Data from {} to {} ({} streams)",
                first,
                last,
                format_count(report.metadata.events as u64)
            );
        }
        _ => {
            let _ = writeln!(out, "No streams in this period");
        }
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "Total minutes played:  {} ({})",
        format_decimal(summary.total_minutes, 1),
        format_listening_time(summary.total_minutes)
    );
    let _ = writeln!(
        out,
        "Total songs played:    {}",
        format_count(summary.total_streams)
    );
    let _ = writeln!(
        out,
        "Unique songs played:   {}",
        format_count(summary.unique_tracks as u64)
    );
    let _ = writeln!(
        out,
        "Unique artists played: {}",
        format_count(summary.unique_artists as u64)
    );

    let sections: [(&str, &[RankedGroup]); 4] = [
        ("Most played songs", report.top_tracks_by_plays.as_slice()),
        ("Longest played songs", report.top_tracks_by_minutes.as_slice()),
        ("Most played artists", report.top_artists_by_plays.as_slice()),
        ("Longest played artists", report.top_artists_by_minutes.as_slice()),
    ];
    for (title, rows) in sections {
        out.push('\n');
        out.push_str(&ranking_table(title, rows, summary.total_minutes));
    }

    out.push('\n');
    out.push_str(&ranking_table(
        "Platforms",
        &report.top_platforms,
        summary.total_minutes,
    ));

    for (title, rows) in [
        ("Minutes by day of week", &report.minutes_by_weekday),
        ("Minutes by month", &report.minutes_by_month),
        ("Minutes by hour (UTC)", &report.minutes_by_hour),
    ] {
        out.push('\n');
        out.push_str(&series_table(title, rows));
    }

    out
}

/// `"2025-01-01 to 2025-12-31"`, with open sides spelled out.
pub fn describe_range(range: DateRange) -> String {
    match (range.min_date, range.max_date) {
        (Some(min), Some(max)) => format!("{} to {}", min, max),
        (Some(min), None) => format!("from {}", min),
        (None, Some(max)) => format!("through {}", max),
        (None, None) => "all time".to_string(),
    }
}

/// Ranked table with a `#` column. Track keys get separate track and artist
/// columns; minute rankings get a share-of-total column.
fn ranking_table(title: &str, rows: &[RankedGroup], total_minutes: f64) -> String {
    let is_track = rows
        .first()
        .map(|r| matches!(r.key, GroupValue::Track { .. }))
        .unwrap_or(false);
    let is_minutes = rows
        .first()
        .map(|r| matches!(r.value, MetricValue::Minutes(_)))
        .unwrap_or(false);

    let mut headers = vec!["#"];
    if is_track {
        headers.extend(["Track", "Artist"]);
    } else {
        headers.push("Name");
    }
    if is_minutes {
        headers.extend(["Minutes", "Share"]);
    } else {
        headers.push("Plays");
    }

    let body: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![(i + 1).to_string()];
            match &row.key {
                GroupValue::Track { name, artist } => {
                    cells.push(name.clone());
                    cells.push(artist.clone());
                }
                other => cells.push(other.label()),
            }
            cells.push(format_value(row.value));
            if let MetricValue::Minutes(m) = row.value {
                cells.push(format!("{}%", format_decimal(share_of(m, total_minutes), 1)));
            }
            cells
        })
        .collect();

    let text_columns = if is_track { 3 } else { 2 };
    render_table(title, &headers, &body, text_columns)
}

/// Two-column table of a time series.
fn series_table(title: &str, rows: &[RankedGroup]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| vec![row.key.label(), format_value(row.value)])
        .collect();
    render_table(title, &["Period", "Minutes"], &body, 1)
}

fn format_value(value: MetricValue) -> String {
    match value {
        MetricValue::Count(n) => format_count(n),
        MetricValue::Minutes(m) => format_decimal(m, 1),
    }
}

/// `part` as a percentage of `total`; zero when nothing was played.
fn share_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Render `title`, a header row and `rows`.
///
/// The first `text_columns` columns are left-aligned, the rest right-aligned.
/// An empty body renders as `(none)`.
pub fn render_table(
    title: &str,
    headers: &[&str],
    rows: &[Vec<String>],
    text_columns: usize,
) -> String {
    let mut out = format!("{}\n", title);
    if rows.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate_to_width(c, MAX_CELL_WIDTH)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&header_cells).chain(cells.iter()) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &width))| pad(cell, width, i >= text_columns))
            .collect();
        let _ = writeln!(out, "  {}", line.join(COLUMN_GAP).trim_end());
    }

    out
}

/// Pad `s` to `width` display columns.
fn pad(s: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(s.width()));
    if right_align {
        format!("{}{}", fill, s)
    } else {
        format!("{}{}", s, fill)
    }
}

/// Cut `s` to at most `max` display columns, ending in `…` when cut.
fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

//! Export file discovery and loading.
//!
//! Reads the JSON arrays written by the streaming service's "extended
//! streaming history" export and converts them into [`LoadedRecord`]s.

use std::path::{Path, PathBuf};

use recap_core::data_processors::TimestampProcessor;
use recap_core::error::{RecapError, Result};
use recap_core::models::{DateRange, LoadedRecord, RawPlaybackRecord};
use regex::Regex;
use tracing::{debug, warn};

/// File names of music (as opposed to video) history files.
const AUDIO_FILE_PATTERN: &str = r"(?i)audio.*\.json$";

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all audio history files under `data_path`, sorted by path.
///
/// A file qualifies when its name matches the `...Audio...json` naming
/// convention and, if `year` is given, contains that year.
pub fn find_history_files(data_path: &Path, year: Option<i32>) -> Result<Vec<PathBuf>> {
    if !data_path.is_dir() {
        return Err(RecapError::DataPathNotFound(data_path.to_path_buf()));
    }

    let pattern = Regex::new(AUDIO_FILE_PATTERN).expect("regex is valid");
    let year_str = year.map(|y| y.to_string());

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            pattern.is_match(&name)
                && year_str
                    .as_deref()
                    .map(|y| name.contains(y))
                    .unwrap_or(true)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();

    if files.is_empty() {
        warn!("No audio history files found in {}", data_path.display());
    }

    Ok(files)
}

/// Load every record from `paths` whose stream date falls within `range`.
///
/// Files are read in lexicographic path order regardless of the order of
/// `paths`, and their records are concatenated in file order. Records without
/// a track name (podcast episodes, audiobooks, ads) are dropped.
///
/// Any unreadable file, malformed JSON or unparseable timestamp fails the
/// whole load.
pub fn load_events(paths: &[PathBuf], range: DateRange) -> Result<Vec<LoadedRecord>> {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort();

    let mut all_records: Vec<LoadedRecord> = Vec::new();
    for path in sorted {
        all_records.extend(load_single_file(path, range)?);
    }

    debug!(
        "Loaded {} records from {} files",
        all_records.len(),
        paths.len()
    );

    Ok(all_records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Parse one export file and apply the date and track-name filters.
fn load_single_file(path: &Path, range: DateRange) -> Result<Vec<LoadedRecord>> {
    let content = std::fs::read_to_string(path).map_err(|source| RecapError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let raw_records: Vec<RawPlaybackRecord> =
        serde_json::from_str(&content).map_err(|source| RecapError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let records_read = raw_records.len();
    let mut out_of_range = 0usize;
    let mut without_track = 0usize;
    let mut records: Vec<LoadedRecord> = Vec::with_capacity(records_read);

    for raw in raw_records {
        let timestamp =
            TimestampProcessor::parse(&raw.ts).ok_or_else(|| RecapError::TimestampParse {
                path: path.to_path_buf(),
                value: raw.ts.to_string(),
            })?;
        check_required_fields(&raw, path)?;
        let record = LoadedRecord::new(raw, timestamp);

        if !range.contains(record.stream_date) {
            out_of_range += 1;
            continue;
        }
        if record.raw.master_metadata_track_name.is_none() {
            without_track += 1;
            continue;
        }
        records.push(record);
    }

    debug!(
        "File {}: {} read, {} out of range, {} without track, {} kept",
        path.display(),
        records_read,
        out_of_range,
        without_track,
        records.len(),
    );

    Ok(records)
}

/// Every record names its platform; every track record also carries its URI.
///
/// Trackless records (podcasts, ads) legitimately have no track URI.
fn check_required_fields(raw: &RawPlaybackRecord, path: &Path) -> Result<()> {
    let missing = if raw.platform.is_none() {
        Some("platform")
    } else if raw.master_metadata_track_name.is_some() && raw.spotify_track_uri.is_none() {
        Some("spotify_track_uri")
    } else {
        None
    };

    match missing {
        Some(field) => Err(RecapError::MissingField {
            path: path.to_path_buf(),
            field,
        }),
        None => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

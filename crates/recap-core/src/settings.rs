use chrono::{Datelike, NaiveDate};
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{RecapError, Result};
use crate::models::DateRange;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Year-in-review statistics for a streaming history export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "listening-recap",
    about = "Year-in-review statistics for a streaming history export",
    version
)]
pub struct Settings {
    /// Directory holding the export's JSON files (auto-detected if not specified)
    #[arg(long, env = "RECAP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Calendar year to summarise (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// First stream date to include (YYYY-MM-DD), overrides the year start
    #[arg(long)]
    pub min_date: Option<NaiveDate>,

    /// Last stream date to include (YYYY-MM-DD), overrides the year end
    #[arg(long)]
    pub max_date: Option<NaiveDate>,

    /// Rows shown per top-N table (1-100)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub top: u32,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.listening-recap/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default location of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".listening-recap").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories if
    /// needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("could not clear {}: {}", config_path.display(), e);
            }
            return settings.apply_debug_flag();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI (or env) always wins over the persisted value.
        if !is_arg_explicitly_set(&matches, "data_dir") && settings.data_dir.is_none() {
            settings.data_dir = last.data_dir;
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = last.top {
                settings.top = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        let settings = settings.apply_debug_flag();

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::debug!("could not persist settings: {}", e);
        }

        settings
    }

    /// Effective date bounds for this run.
    ///
    /// `--min-date`/`--max-date` replace the matching side of the year
    /// range. With neither a year nor a bound given, `today`'s year is used.
    pub fn resolve_date_range(&self, today: NaiveDate) -> Result<DateRange> {
        let year_range = match (self.year, self.min_date, self.max_date) {
            (Some(year), _, _) => DateRange::for_year(year),
            (None, None, None) => DateRange::for_year(today.year()),
            (None, _, _) => DateRange::default(),
        };

        let range = DateRange::new(
            self.min_date.or(year_range.min_date),
            self.max_date.or(year_range.max_date),
        );

        if let (Some(min), Some(max)) = (range.min_date, range.max_date) {
            if min > max {
                return Err(RecapError::Config(format!(
                    "min date {} is after max date {}",
                    min, max
                )));
            }
        }

        Ok(range)
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data_dir: s.data_dir.clone(),
            top: Some(s.top),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.listening-recap/` exists so settings can be persisted.
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(home.join(".listening-recap"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a level name such as `WARNING` onto a tracing filter directive.
///
/// Unrecognised names pass through unchanged so `RUST_LOG`-style directives
/// still work.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" | "CRITICAL" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs go to stderr, and additionally to `log_file` without ANSI colours
/// when one is given.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Attempt to locate the unpacked export on the local system.
///
/// Checks, in order:
/// 1. `./streaming_history_files/`
/// 2. `~/Spotify Extended Streaming History/`
/// 3. `~/Downloads/my_spotify_data/Spotify Extended Streaming History/`
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let home = dirs::home_dir().unwrap_or_else(|| cwd.clone());
    discover_data_path_from(&cwd, &home)
}

/// [`discover_data_path`] with explicit working and home directories.
pub fn discover_data_path_from(cwd: &Path, home: &Path) -> Option<PathBuf> {
    let candidates = [
        cwd.join("streaming_history_files"),
        home.join("Spotify Extended Streaming History"),
        home.join("Downloads")
            .join("my_spotify_data")
            .join("Spotify Extended Streaming History"),
    ];
    candidates.into_iter().find(|p| p.is_dir())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

mod bootstrap;
mod report;

use anyhow::{Context, Result};
use recap_core::settings::Settings;
use recap_data::analysis::build_report;
use recap_data::reader::find_history_files;
use recap_runtime::data_manager::DataManager;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Listening recap v{} starting", env!("CARGO_PKG_VERSION"));

    let range = settings.resolve_date_range(chrono::Local::now().date_naive())?;

    let data_dir = settings
        .data_dir
        .clone()
        .or_else(bootstrap::discover_data_path)
        .context("no export directory found; pass --data-dir")?;

    // Narrow discovery by file name only when the whole range sits in one year.
    let paths = find_history_files(&data_dir, range.single_year())?;
    tracing::info!(
        "Using {} history files from {}",
        paths.len(),
        data_dir.display()
    );

    let mut manager = DataManager::new();
    let events = manager.get_events(&paths, range)?;
    let recap = build_report(events, Some(settings.top as usize));

    match settings.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&recap)?),
        _ => print!("{}", report::render_text(&recap, range)),
    }

    Ok(())
}

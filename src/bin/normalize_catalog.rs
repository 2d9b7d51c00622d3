//! Convert a legacy data export folder (dump.json, Auxiliary.json,
//! Augments.json) into the canonical catalog files.
//!
//! Usage: normalize_catalog [source_dir] [data_dir]
//! Defaults: source `data/legacy`, output `data` (relative to CARGO_MANIFEST_DIR
//! when run via cargo).

use std::path::PathBuf;

use blueroad::data::import::normalize_legacy_folder;
use blueroad::logging;

const DEFAULT_SOURCE_SUFFIX: &str = "data/legacy";
const DEFAULT_OUTPUT_SUFFIX: &str = "data";

fn repo_data_path(suffix: &str) -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        return PathBuf::from(manifest_dir).join(suffix);
    }
    PathBuf::from(suffix)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let mut args = std::env::args().skip(1);
    let source_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| repo_data_path(DEFAULT_SOURCE_SUFFIX));
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| repo_data_path(DEFAULT_OUTPUT_SUFFIX));

    if !source_dir.is_dir() {
        eprintln!("error: source directory not found: {}", source_dir.display());
        std::process::exit(1);
    }

    let reports = normalize_legacy_folder(&source_dir, &data_dir)?;
    if reports.is_empty() {
        eprintln!("no legacy files found in {}", source_dir.display());
        std::process::exit(1);
    }
    for report in &reports {
        println!(
            "{}: {} imported, {} skipped -> {}",
            report.kind,
            report.imported_records,
            report.skipped.len(),
            report.output_path
        );
    }
    Ok(())
}

//! Import raw catalog data (CSV spreadsheets or JSON dumps) into the canonical
//! catalog files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::equipment::{DEFAULT_AUGMENTS_FILE, DEFAULT_AUXILIARY_FILE};
use crate::data::loader::{write_pretty, CatalogError};
use crate::data::normalize::{
    normalize_augments, normalize_auxiliaries, normalize_ships, SkippedRecord,
};
use crate::data::ship::DEFAULT_SHIPS_FILE;

const LEGACY_SHIP_FILES: &[&str] = &["dump.json", "Ships.json", "ships.json", "ship_data.json"];
const LEGACY_AUXILIARY_FILES: &[&str] = &["Auxiliary.json", "auxiliary.json", "aux_data.json"];
const LEGACY_AUGMENT_FILES: &[&str] = &["Augments.json", "augments.json", "augment_data.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Ships,
    Auxiliary,
    Augments,
}

impl ImportKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ships" | "ship" => Some(Self::Ships),
            "auxiliary" | "auxiliaries" | "aux" => Some(Self::Auxiliary),
            "augments" | "augment" | "aug" => Some(Self::Augments),
            _ => None,
        }
    }

    /// Canonical file name inside the data directory.
    pub fn catalog_file(&self) -> &'static str {
        match self {
            Self::Ships => DEFAULT_SHIPS_FILE,
            Self::Auxiliary => DEFAULT_AUXILIARY_FILE,
            Self::Augments => DEFAULT_AUGMENTS_FILE,
        }
    }

    fn legacy_files(&self) -> &'static [&'static str] {
        match self {
            Self::Ships => LEGACY_SHIP_FILES,
            Self::Auxiliary => LEGACY_AUXILIARY_FILES,
            Self::Augments => LEGACY_AUGMENT_FILES,
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ships => "ships",
            Self::Auxiliary => "auxiliary",
            Self::Augments => "augments",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub kind: ImportKind,
    pub source_path: String,
    pub output_path: String,
    pub total_records: usize,
    pub imported_records: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Parse CSV with a header row into one JSON object per row. Empty cells are
/// left out so normalization falls back to defaults.
pub fn csv_records(raw: &str, path: &Path) -> Result<Vec<Value>, CatalogError> {
    let csv_err = |source| CatalogError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let object: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(Value::Object(object));
    }
    Ok(records)
}

/// Read an import source. A leading `{` or `[` means JSON, anything else CSV.
pub fn read_source(path: &Path) -> Result<Value, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        Ok(Value::Array(csv_records(&raw, path)?))
    }
}

fn count_records(document: &Value) -> usize {
    match document {
        Value::Array(items) => items.len(),
        _ => 0,
    }
}

/// Normalize `document` as `kind` and write the canonical file to `output`.
pub fn import_document(
    kind: ImportKind,
    document: Value,
    source_path: &str,
    output: &Path,
) -> Result<ImportReport, CatalogError> {
    let direct_count = count_records(&document);
    let (imported_records, skipped) = match kind {
        ImportKind::Ships => {
            let normalized = normalize_ships(document);
            write_pretty(output, &normalized.records)?;
            (normalized.records.len(), normalized.skipped)
        }
        ImportKind::Auxiliary => {
            let normalized = normalize_auxiliaries(document);
            write_pretty(output, &normalized.records)?;
            (normalized.records.len(), normalized.skipped)
        }
        ImportKind::Augments => {
            let normalized = normalize_augments(document);
            write_pretty(output, &normalized.records)?;
            (normalized.records.len(), normalized.skipped)
        }
    };
    let total_records = direct_count.max(imported_records + skipped.len());

    tracing::info!(
        %kind,
        source = source_path,
        output = %output.display(),
        imported = imported_records,
        skipped = skipped.len(),
        "import complete"
    );

    Ok(ImportReport {
        kind,
        source_path: source_path.to_string(),
        output_path: output.display().to_string(),
        total_records,
        imported_records,
        skipped,
    })
}

pub fn import_file(kind: ImportKind, input: &Path, output: &Path) -> Result<ImportReport, CatalogError> {
    let document = read_source(input)?;
    import_document(kind, document, &input.display().to_string(), output)
}

fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}

/// Convert a legacy export folder (`dump.json`, `Auxiliary.json`,
/// `Augments.json` and their spelling variants) into canonical catalog files
/// under `data_dir`. Kinds without a source file are skipped.
pub fn normalize_legacy_folder(source_dir: &Path, data_dir: &Path) -> Result<Vec<ImportReport>, CatalogError> {
    let mut reports = Vec::new();
    for kind in [ImportKind::Ships, ImportKind::Auxiliary, ImportKind::Augments] {
        let Some(input) = first_existing(source_dir, kind.legacy_files()) else {
            tracing::warn!(%kind, dir = %source_dir.display(), "no legacy source file found");
            continue;
        };
        reports.push(import_file(kind, &input, &data_dir.join(kind.catalog_file()))?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_become_objects_without_empty_cells() {
        let raw = "Name,HP,EVA,LCK,LVL\nMutsuki,1688,250,35,\n";
        let rows = csv_records(raw, Path::new("ships.csv")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], "Mutsuki");
        assert!(rows[0].get("LVL").is_none());
    }

    #[test]
    fn import_kind_parse_accepts_short_names() {
        assert_eq!(ImportKind::parse("aux"), Some(ImportKind::Auxiliary));
        assert_eq!(ImportKind::parse("Ships"), Some(ImportKind::Ships));
        assert_eq!(ImportKind::parse("skins"), None);
    }
}

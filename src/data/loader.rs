//! Load catalog files from disk and normalize them.
//! Uses <data_dir>/ships.json, auxiliary.json and augments.json.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::data::equipment::{Augment, Auxiliary};
use crate::data::normalize::{normalize_augments, normalize_auxiliaries, normalize_ships, Normalized};
use crate::data::ship::Ship;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse json '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to parse csv '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Normalize a string for lookup: lowercase, collapse spaces/underscores.
pub fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

pub fn read_document(path: &Path) -> Result<Value, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn report_skipped<T>(path: &Path, normalized: &Normalized<T>) {
    if !normalized.skipped.is_empty() {
        tracing::warn!(
            path = %path.display(),
            skipped = normalized.skipped.len(),
            "records skipped during normalization"
        );
    }
}

pub fn load_ships(path: &Path) -> Result<Vec<Ship>, CatalogError> {
    let normalized = normalize_ships(read_document(path)?);
    report_skipped(path, &normalized);
    Ok(normalized.records)
}

/// Missing equipment files are allowed: the catalog then holds only "None".
pub fn load_auxiliaries(path: &Path) -> Result<Vec<Auxiliary>, CatalogError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "auxiliary file missing");
        return Ok(Vec::new());
    }
    let normalized = normalize_auxiliaries(read_document(path)?);
    report_skipped(path, &normalized);
    Ok(normalized.records)
}

pub fn load_augments(path: &Path) -> Result<Vec<Augment>, CatalogError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "augment file missing");
        return Ok(Vec::new());
    }
    let normalized = normalize_augments(read_document(path)?);
    report_skipped(path, &normalized);
    Ok(normalized.records)
}

pub fn write_pretty<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| CatalogError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let payload = serde_json::to_string_pretty(value)?;
    fs::write(path, payload).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::normalize_lookup;

    #[test]
    fn lookup_key_collapses_case_and_separators() {
        assert_eq!(normalize_lookup("  Repair  Toolkit"), "repair_toolkit");
        assert_eq!(normalize_lookup("repair_toolkit"), "repair_toolkit");
        assert_eq!(normalize_lookup("Prinz Eugen"), normalize_lookup("prinz_eugen"));
    }
}

//! Trial records stored as JSON files in a local directory.

use std::path::{Path, PathBuf};

use trial_model::RawTrialRecord;

use crate::ctgov::{CtGovStudy, to_raw_record};
use crate::error::{IngestError, Result};
use crate::source::TrialSource;

/// Reads `<root>/<NCTID>.json`.
///
/// Each file holds either a raw trial record or a ClinicalTrials.gov v2
/// study document; the latter is recognised by its `protocolSection`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IngestError::DirectoryNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All JSON files in the directory, sorted by filename.
    pub fn list_json_files(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| IngestError::DirectoryRead {
            path: self.root.clone(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: self.root.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() && has_json_extension(&path) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Identifiers available in this directory, from the file stems.
    pub fn available_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .list_json_files()?
            .iter()
            .filter_map(|path| path.file_stem()?.to_str())
            .map(str::to_ascii_uppercase)
            .collect())
    }

    fn find_file(&self, nct_id: &str) -> Result<Option<PathBuf>> {
        let exact = self.root.join(format!("{nct_id}.json"));
        if exact.is_file() {
            return Ok(Some(exact));
        }
        Ok(self.list_json_files()?.into_iter().find(|path| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.eq_ignore_ascii_case(nct_id))
        }))
    }
}

impl TrialSource for DirectorySource {
    fn fetch(&self, nct_id: &str) -> Result<Option<RawTrialRecord>> {
        let nct_id = nct_id.trim();
        let Some(path) = self.find_file(nct_id)? else {
            tracing::debug!(nct_id, root = %self.root.display(), "no record file");
            return Ok(None);
        };

        let record = read_record(&path)?;
        if !record.nct_id.trim().eq_ignore_ascii_case(nct_id) {
            return Err(IngestError::IdMismatch {
                path,
                expected: nct_id.to_string(),
                found: record.nct_id,
            });
        }
        tracing::debug!(nct_id, path = %path.display(), "record loaded");
        Ok(Some(record))
    }
}

/// Parse one record file, accepting either supported document shape.
///
/// A file without an identifier takes it from its file stem.
pub fn read_record(path: &Path) -> Result<RawTrialRecord> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parse_error = |e| IngestError::Parse {
        path: path.to_path_buf(),
        source: e,
    };

    let value: serde_json::Value = serde_json::from_str(&text).map_err(parse_error)?;
    let mut record = if value.get("protocolSection").is_some() {
        let study: CtGovStudy = serde_json::from_value(value).map_err(parse_error)?;
        to_raw_record(&study)
    } else {
        serde_json::from_value(value).map_err(parse_error)?
    };

    if record.nct_id.trim().is_empty()
        && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
    {
        record.nct_id = stem.to_ascii_uppercase();
    }
    Ok(record)
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

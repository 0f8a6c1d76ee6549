//! Export writers for name/ID mappings.
//!
//! Records are sorted by name before rendering. Two renditions exist:
//! - CSV with a `Name,ID` header and a configurable delimiter
//! - a single-sheet XLSX workbook
//!
//! [`ExportSink`] stages the output in a hidden temp file next to the
//! destination and renames it into place on commit.

use anyhow::Context;
use idgen_protocol::{ExportFormat, IdGenConfig, IdentifierRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

mod delimited;
mod workbook;

/// Errors returned by export rendering and writing.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{message}")]
    Message { message: String },
    #[error("{message}")]
    Source {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type SinkResult<T> = std::result::Result<T, SinkError>;

impl SinkError {
    fn message(message: impl Into<String>) -> Self {
        SinkError::Message {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for SinkError {
    fn from(err: anyhow::Error) -> Self {
        SinkError::Source {
            message: format!("{:#}", err),
            source: err,
        }
    }
}

/// Knobs that change the rendered bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub csv_delimiter: char,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            csv_delimiter: idgen_protocol::defaults::DEFAULT_CSV_DELIMITER,
        }
    }
}

impl ExportOptions {
    pub fn from_config(config: &IdGenConfig) -> Self {
        Self {
            csv_delimiter: config.csv_delimiter,
        }
    }
}

/// Stable sort by name; duplicates keep their relative order.
pub fn prepare_records(records: &[IdentifierRecord]) -> Vec<IdentifierRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

/// Render records in the requested format. Sorting happens here.
pub fn render(
    records: &[IdentifierRecord],
    format: ExportFormat,
    options: &ExportOptions,
) -> SinkResult<Vec<u8>> {
    let sorted = prepare_records(records);
    let bytes = match format {
        ExportFormat::Csv => delimited::render_csv(&sorted, options.csv_delimiter)?,
        ExportFormat::Xlsx => workbook::render_xlsx(&sorted)?,
    };
    debug!(
        "Rendered {} records as {} ({} bytes)",
        sorted.len(),
        format,
        bytes.len()
    );
    Ok(bytes)
}

/// Result of [`validate_export`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportValidation {
    pub total_records: usize,
    pub empty_names: usize,
    pub empty_ids: usize,
}

impl ExportValidation {
    pub fn is_clean(&self) -> bool {
        self.empty_names == 0 && self.empty_ids == 0
    }
}

/// Reject an empty export; count blank cells otherwise.
pub fn validate_export(records: &[IdentifierRecord]) -> SinkResult<ExportValidation> {
    if records.is_empty() {
        return Err(SinkError::message("No data to export"));
    }
    Ok(ExportValidation {
        total_records: records.len(),
        empty_names: records.iter().filter(|r| r.name.trim().is_empty()).count(),
        empty_ids: records.iter().filter(|r| r.id.trim().is_empty()).count(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStatistics {
    pub total_records: usize,
    pub csv_bytes: usize,
    pub xlsx_bytes: usize,
}

/// Sizes of both renditions, for display before the user picks one.
pub fn export_statistics(
    records: &[IdentifierRecord],
    options: &ExportOptions,
) -> SinkResult<ExportStatistics> {
    Ok(ExportStatistics {
        total_records: records.len(),
        csv_bytes: render(records, ExportFormat::Csv, options)?.len(),
        xlsx_bytes: render(records, ExportFormat::Xlsx, options)?.len(),
    })
}

/// First `max_rows` of the sorted view.
pub fn preview(records: &[IdentifierRecord], max_rows: usize) -> Vec<IdentifierRecord> {
    let mut sorted = prepare_records(records);
    sorted.truncate(max_rows);
    sorted
}

/// Written file summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub records: usize,
    pub bytes: usize,
}

/// Staged writer for a single export file.
///
/// `stage` writes to `.{filename}.tmp` beside the destination; `commit`
/// renames it into place. Dropping an uncommitted sink removes the temp file.
#[derive(Debug)]
pub struct ExportSink {
    final_path: PathBuf,
    temp_path: Option<PathBuf>,
    committed: bool,
}

impl ExportSink {
    pub fn new(path: impl Into<PathBuf>) -> SinkResult<Self> {
        let final_path = path.into();
        let file_name = final_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SinkError::message(format!(
                    "Export path has no file name: {}",
                    final_path.display()
                ))
            })?
            .to_string();

        let parent = parent_dir(&final_path);
        std::fs::create_dir_all(&parent).with_context(|| {
            format!("Failed to create output directory: {}", parent.display())
        })?;

        let temp_path = parent.join(format!(".{}.tmp", file_name));
        Ok(Self {
            final_path,
            temp_path: Some(temp_path),
            committed: false,
        })
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    pub fn temp_path(&self) -> Option<&Path> {
        self.temp_path.as_deref()
    }

    pub fn stage(&mut self, bytes: &[u8]) -> SinkResult<()> {
        let temp_path = self
            .temp_path
            .as_ref()
            .ok_or_else(|| SinkError::message("Export sink already finished"))?;
        info!(
            "Staging export: {} (temp: {})",
            self.final_path.display(),
            temp_path.display()
        );
        std::fs::write(temp_path, bytes)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        Ok(())
    }

    pub fn commit(&mut self) -> SinkResult<()> {
        let temp_path = self
            .temp_path
            .as_ref()
            .ok_or_else(|| SinkError::message("Export sink already finished"))?;
        if !temp_path.exists() {
            return Err(SinkError::message(format!(
                "Nothing staged for {}",
                self.final_path.display()
            )));
        }
        std::fs::rename(temp_path, &self.final_path).with_context(|| {
            format!(
                "Failed to rename {} -> {}",
                temp_path.display(),
                self.final_path.display()
            )
        })?;
        self.temp_path = None;
        self.committed = true;
        info!("Committed export: {}", self.final_path.display());
        Ok(())
    }

    pub fn rollback(&mut self) {
        if let Some(temp_path) = self.temp_path.take() {
            if temp_path.exists() {
                let _ = std::fs::remove_file(&temp_path);
                warn!("Rolled back export temp file: {}", temp_path.display());
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

impl Drop for ExportSink {
    fn drop(&mut self) {
        if let Some(temp_path) = &self.temp_path {
            if temp_path.exists() {
                let _ = std::fs::remove_file(temp_path);
                warn!("Cleaned up orphaned temp file: {}", temp_path.display());
            }
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Validate, render and atomically write `records` to `path`.
pub fn write_export(
    records: &[IdentifierRecord],
    path: &Path,
    format: ExportFormat,
    options: &ExportOptions,
) -> SinkResult<ExportArtifact> {
    let validation = validate_export(records)?;
    if !validation.is_clean() {
        warn!(
            "Exporting with {} empty names and {} empty ids",
            validation.empty_names, validation.empty_ids
        );
    }

    let bytes = render(records, format, options)?;
    let mut sink = ExportSink::new(path)?;
    sink.stage(&bytes)?;
    sink.commit()?;

    Ok(ExportArtifact {
        path: path.to_path_buf(),
        format,
        records: records.len(),
        bytes: bytes.len(),
    })
}

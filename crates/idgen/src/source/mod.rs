//! Raw name extraction from uploaded files.
//!
//! Supported inputs are plain text, CSV and XLSX. Every reader returns raw
//! strings; normalization happens later in [`crate::names`]. Entries that
//! are obviously not names (digits or punctuation only) are dropped here,
//! and the batch is truncated to the configured maximum.

use idgen_protocol::IdGenConfig;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info, warn};

mod text;
mod xlsx;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NOT_A_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\W]+$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported file type '{extension}'. Supported types: .csv, .txt, .xlsx")]
    UnsupportedFormat { extension: String },

    #[error("File size ({size_mb:.1}MB) exceeds maximum allowed size ({max_mb}MB)")]
    TooLarge { size_mb: f64, max_mb: u64 },

    #[error("{kind} file is not valid UTF-8: {source}")]
    Encoding {
        kind: SourceKind,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Error parsing CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Error parsing Excel file: {0}")]
    Xlsx(String),

    #[error("Could not find 'Name', 'Subject', or 'Trial' column in Excel file")]
    MissingColumn,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Txt,
    Xlsx,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Csv => "csv",
            SourceKind::Txt => "txt",
            SourceKind::Xlsx => "xlsx",
        }
    }

    /// Label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Csv => "CSV",
            SourceKind::Txt => "TXT",
            SourceKind::Xlsx => "Excel",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(SourceKind::Csv),
            "txt" => Some(SourceKind::Txt),
            "xlsx" => Some(SourceKind::Xlsx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| SourceError::UnsupportedFormat {
            extension: format!(".{}", extension.to_lowercase()),
        })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Size and count caps applied to every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLimits {
    pub max_names: usize,
    pub max_file_size_bytes: u64,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self::from_config(&IdGenConfig::default())
    }
}

impl SourceLimits {
    pub fn from_config(config: &IdGenConfig) -> Self {
        Self {
            max_names: config.max_names_count,
            max_file_size_bytes: config.max_file_size_bytes(),
        }
    }
}

/// Names pulled from one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub kind: SourceKind,
    pub names: Vec<String>,
    pub message: String,
    /// Header of the column read, for tabular sources
    pub column: Option<String>,
    /// Entry count before truncation, when truncation happened
    pub truncated_from: Option<usize>,
}

/// Check existence, extension and size without reading the content.
pub fn validate_file(path: &Path, limits: &SourceLimits) -> Result<SourceKind> {
    if !path.is_file() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }
    let kind = SourceKind::from_path(path)?;

    let size = std::fs::metadata(path)
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > limits.max_file_size_bytes {
        return Err(SourceError::TooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            max_mb: limits.max_file_size_bytes / (1024 * 1024),
        });
    }
    Ok(kind)
}

/// Validate `path` and extract raw names from it.
pub fn extract(path: &Path, limits: &SourceLimits) -> Result<Extraction> {
    let kind = validate_file(path, limits)?;
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extraction = extract_bytes(kind, &bytes, limits)?;
    info!(
        "Extracted {} names from {} ({})",
        extraction.names.len(),
        path.display(),
        kind.as_str()
    );
    Ok(extraction)
}

/// Extract from in-memory content of a known kind.
pub fn extract_bytes(kind: SourceKind, bytes: &[u8], limits: &SourceLimits) -> Result<Extraction> {
    let (raw, column) = match kind {
        SourceKind::Txt => (text::split_txt(decode(kind, bytes)?), None),
        SourceKind::Csv => text::split_csv(decode(kind, bytes)?)?,
        SourceKind::Xlsx => {
            let (raw, column) = xlsx::read_name_column(bytes)?;
            (raw, Some(column))
        }
    };
    debug!("{} raw entries before cleaning", raw.len());

    let mut names = clean_entries(raw);
    let found = names.len();

    let (message, truncated_from) = if found > limits.max_names {
        names.truncate(limits.max_names);
        warn!("Truncated {} names to {}", found, limits.max_names);
        (
            format!(
                "File contains {} names. Showing first {}.",
                found, limits.max_names
            ),
            Some(found),
        )
    } else {
        let message = match (&column, kind) {
            (Some(column), SourceKind::Xlsx) => format!(
                "Successfully extracted {} names from {} file (column: {}).",
                found,
                kind.label(),
                column
            ),
            _ => format!(
                "Successfully extracted {} names from {} file.",
                found,
                kind.label()
            ),
        };
        (message, None)
    };

    Ok(Extraction {
        kind,
        names,
        message,
        column,
        truncated_from,
    })
}

fn decode(kind: SourceKind, bytes: &[u8]) -> Result<&str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|source| SourceError::Encoding { kind, source })
}

/// Trim, drop blanks and digit/punctuation-only entries, collapse whitespace.
pub fn clean_entries(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|entry| {
            let trimmed = entry.trim();
            if trimmed.is_empty() || NOT_A_NAME.is_match(trimmed) {
                return None;
            }
            Some(WHITESPACE_RUN.replace_all(trimmed, " ").into_owned())
        })
        .collect()
}

/// Non-empty, trimmed lines of `content`.
fn lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn limits(max_names: usize) -> SourceLimits {
        SourceLimits {
            max_names,
            ..SourceLimits::default()
        }
    }

    #[test]
    fn test_clean_entries() {
        let raw = vec![
            "  Ann   Lee ".to_string(),
            "".to_string(),
            "1234".to_string(),
            " -- ".to_string(),
            "Bob".to_string(),
            "12 Main".to_string(),
        ];
        assert_eq!(clean_entries(raw), vec!["Ann Lee", "Bob", "12 Main"]);
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a/b.CSV")).unwrap(), SourceKind::Csv);
        assert_eq!(SourceKind::from_path(Path::new("names.txt")).unwrap(), SourceKind::Txt);
        assert!(matches!(
            SourceKind::from_path(Path::new("names.pdf")),
            Err(SourceError::UnsupportedFormat { extension }) if extension == ".pdf"
        ));
        assert!(SourceKind::from_path(Path::new("names")).is_err());
    }

    #[test]
    fn test_validate_file() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing.txt");
        assert!(matches!(
            validate_file(&missing, &SourceLimits::default()),
            Err(SourceError::NotFound(_))
        ));

        let path = temp.path().join("names.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![b'a'; 2048]).unwrap();
        drop(file);

        let tight = SourceLimits {
            max_names: 10,
            max_file_size_bytes: 1024,
        };
        assert!(matches!(validate_file(&path, &tight), Err(SourceError::TooLarge { .. })));
        assert_eq!(validate_file(&path, &SourceLimits::default()).unwrap(), SourceKind::Txt);
    }

    #[test]
    fn test_truncation_message() {
        let content = "Ann\nBob\nCy\nDee\n";
        let out = extract_bytes(SourceKind::Txt, content.as_bytes(), &limits(2)).unwrap();
        assert_eq!(out.names, vec!["Ann", "Bob"]);
        assert_eq!(out.truncated_from, Some(4));
        assert_eq!(out.message, "File contains 4 names. Showing first 2.");
    }

    #[test]
    fn test_success_message() {
        let out = extract_bytes(SourceKind::Txt, b"Ann\nBob", &limits(10)).unwrap();
        assert_eq!(out.message, "Successfully extracted 2 names from TXT file.");
        assert_eq!(out.truncated_from, None);
    }

    #[test]
    fn test_bom_and_invalid_utf8() {
        let out = extract_bytes(SourceKind::Txt, b"\xEF\xBB\xBFAnn\nBob", &limits(10)).unwrap();
        assert_eq!(out.names, vec!["Ann", "Bob"]);

        let err = extract_bytes(SourceKind::Csv, b"Ann\n\xff\xfe", &limits(10)).unwrap_err();
        assert!(matches!(err, SourceError::Encoding { kind: SourceKind::Csv, .. }));
    }

    #[test]
    fn test_extract_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("names.txt");
        std::fs::write(&path, "Ann, Bob\nCy").unwrap();
        let out = extract(&path, &SourceLimits::default()).unwrap();
        assert_eq!(out.kind, SourceKind::Txt);
        assert_eq!(out.names, vec!["Ann", "Bob", "Cy"]);
    }
}

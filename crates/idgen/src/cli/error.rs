//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use idgen::source::SourceError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug, Serialize)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                format!(
                    "TRY: Look for similar files: ls {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| ".".to_string())
                ),
            ])
    }

    /// File type is not one we read names from
    pub fn unsupported_file_type(path: &Path, extension: &str) -> Self {
        let extension = if extension == "." { "(no extension)" } else { extension };
        Self::new(format!("Unsupported file type: {}", extension))
            .with_context(format!("Cannot read names from: {}", path.display()))
            .with_suggestions([
                "TRY: Supported types: csv, txt, xlsx".to_string(),
                "TRY: Save spreadsheets as .xlsx (not .xls or .ods)".to_string(),
            ])
    }

    pub fn file_too_large(path: &Path, size_mb: f64, max_mb: u64) -> Self {
        Self::new(format!(
            "File size ({:.1}MB) exceeds maximum allowed size ({}MB)",
            size_mb, max_mb
        ))
        .with_context(format!("Rejected before reading: {}", path.display()))
        .with_suggestions([
            "TRY: Raise max_file_size_mb in the config file (see: idgen config)".to_string(),
            "TRY: Split the file into smaller batches".to_string(),
        ])
    }

    /// File cannot be read (permission or encoding error)
    pub fn cannot_read_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check file permissions: ls -la {}", path.display()),
                "TRY: Ensure the file is not open in another program".to_string(),
                "TRY: Re-save text files as UTF-8".to_string(),
            ])
    }

    /// CSV parsing error
    pub fn csv_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("CSV parse error: {}", details))
            .with_context(format!("Failed to parse CSV file: {}", path.display()))
            .with_suggestions([
                "TRY: Verify the CSV file is well-formed".to_string(),
                "TRY: Put the names in a column headed Name, Subject or Trial".to_string(),
                format!("TRY: Inspect the raw file: head -n 5 {}", path.display()),
            ])
    }

    /// Workbook could not be read
    pub fn xlsx_error(path: &Path, details: &str) -> Self {
        Self::new(format!("Excel error: {}", details))
            .with_context(format!("Failed to read workbook: {}", path.display()))
            .with_suggestions([
                "TRY: Verify this is a valid .xlsx file".to_string(),
                "TRY: Re-save the workbook from your spreadsheet application".to_string(),
            ])
    }

    pub fn missing_name_column(path: &Path) -> Self {
        Self::new("Could not find 'Name', 'Subject', or 'Trial' column in Excel file")
            .with_context(format!("The first sheet of {} has no name column", path.display()))
            .with_suggestions([
                "TRY: Add a header row with a Name, Subject or Trial column".to_string(),
                "TRY: Move the names to the first worksheet".to_string(),
            ])
    }

    /// Nothing survived normalization
    pub fn no_valid_names(path: &Path, invalid: usize) -> Self {
        Self::new("No valid names to process")
            .with_context(format!(
                "{} entries were read from {} and all were rejected",
                invalid,
                path.display()
            ))
            .with_suggestions([
                format!("TRY: Review the rejected entries: idgen analyze {}", path.display()),
                "TRY: Names need at least 2 characters and one letter".to_string(),
            ])
    }

    pub fn invalid_config(path: Option<&Path>, details: &str) -> Self {
        let location = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "default location".to_string());
        Self::new(format!("Invalid configuration: {}", details))
            .with_context(format!("While loading config from {}", location))
            .with_suggestions([
                "TRY: Show the resolved configuration: idgen config".to_string(),
                "TRY: Write a fresh default file: idgen config --init".to_string(),
            ])
    }

    /// Map an extraction failure onto the matching constructor.
    pub fn from_source_error(path: &Path, err: &SourceError) -> Self {
        match err {
            SourceError::NotFound(_) => Self::file_not_found(path),
            SourceError::UnsupportedFormat { extension } => {
                Self::unsupported_file_type(path, extension)
            }
            SourceError::TooLarge { size_mb, max_mb } => {
                Self::file_too_large(path, *size_mb, *max_mb)
            }
            SourceError::Encoding { .. } | SourceError::Io { .. } => {
                Self::cannot_read_file(path, &err.to_string())
            }
            SourceError::Csv(e) => Self::csv_parse_error(path, &e.to_string()),
            SourceError::Xlsx(details) => Self::xlsx_error(path, details),
            SourceError::MissingColumn => Self::missing_name_column(path),
        }
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Print a failed command as a JSON object on stdout.
pub fn print_json_error(err: &anyhow::Error) {
    let body = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({ "error": helpful }),
        None => serde_json::json!({
            "error": {
                "message": err.to_string(),
                "context": err.chain().nth(1).map(|c| c.to_string()),
                "suggestions": [],
            }
        }),
    };
    match serde_json::to_string_pretty(&body) {
        Ok(text) => println!("{}", text),
        Err(_) => eprintln!("{:?}", err),
    }
}

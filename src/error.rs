//! Errors raised while loading the dashboard inputs

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Anything that stops a render pass before the page can be built.
///
/// Every variant is fatal: there is no partial-dataset fallback.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be opened or read
    Io { path: PathBuf, source: std::io::Error },
    /// The CSV reader rejected a row (bad quoting, wrong field count, missing field)
    Csv { path: PathBuf, source: csv::Error },
    /// A required column is not in the header row
    MissingColumn { path: PathBuf, column: String },
    /// A numeric column holds something that is not a number
    InvalidNumber { path: PathBuf, line: u64, column: String, value: String },
    /// The same (asesor, categoria) pair appears twice, so the pivot is undefined
    DuplicateCell { path: PathBuf, asesor: String, categoria: String },
    /// The JSON config file is unreadable or malformed
    Config { path: PathBuf, message: String },
}

impl LoadError {
    /// Path of the input that caused the failure
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Csv { path, .. }
            | LoadError::MissingColumn { path, .. }
            | LoadError::InvalidNumber { path, .. }
            | LoadError::DuplicateCell { path, .. }
            | LoadError::Config { path, .. } => path,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            LoadError::Csv { path, source } => {
                write!(f, "malformed CSV in {}: {}", path.display(), source)
            }
            LoadError::MissingColumn { path, column } => {
                write!(f, "{} has no '{}' column", path.display(), column)
            }
            LoadError::InvalidNumber { path, line, column, value } => write!(
                f,
                "{} line {}: '{}' is not a number (column '{}')",
                path.display(),
                line,
                value,
                column
            ),
            LoadError::DuplicateCell { path, asesor, categoria } => write!(
                f,
                "{} lists ({}, {}) more than once",
                path.display(),
                asesor,
                categoria
            ),
            LoadError::Config { path, message } => {
                write!(f, "bad config {}: {}", path.display(), message)
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

//! The error type for recoverable failures: configuration, I/O, and report output.
//!
//! Broken simulation invariants (adding a subject to the spatial index twice, removing one from a
//! cell it was never added to) are programming errors and panic instead of producing a
//! [`ContagionError`].
use std::fmt::{self, Display};
use std::io;

/// Provides `ContagionError` and maps other errors to
/// convert to a `ContagionError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ContagionError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    InvalidParameter(String),
    ReportError(String),
    ContagionError(String),
}

impl From<io::Error> for ContagionError {
    fn from(error: io::Error) -> Self {
        ContagionError::IoError(error)
    }
}

impl From<serde_json::Error> for ContagionError {
    fn from(error: serde_json::Error) -> Self {
        ContagionError::JsonError(error)
    }
}

impl From<csv::Error> for ContagionError {
    fn from(error: csv::Error) -> Self {
        ContagionError::CsvError(error)
    }
}

impl From<String> for ContagionError {
    fn from(error: String) -> Self {
        ContagionError::ContagionError(error)
    }
}

impl From<&str> for ContagionError {
    fn from(error: &str) -> Self {
        ContagionError::ContagionError(error.to_string())
    }
}

impl std::error::Error for ContagionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContagionError::IoError(error) => Some(error),
            ContagionError::JsonError(error) => Some(error),
            ContagionError::CsvError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for ContagionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContagionError::InvalidParameter(message) => {
                write!(f, "Error: invalid parameter: {message}")
            }
            ContagionError::ReportError(message) => write!(f, "Error: report: {message}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}

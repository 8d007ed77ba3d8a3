//! Error types shared by the collectors, table helpers and exporters

use crate::transport::TransportError;
use std::path::PathBuf;

/// Crate-wide error type.
#[derive(Debug)]
pub enum CensusError {
    /// The GraphQL endpoint could not be reached or answered with an error
    Transport(TransportError),
    /// A query template could not be filled
    Query(String),
    /// A table is missing a column the operation depends on
    MissingColumn(String),
    /// No holdings file matched the marker under the given directory
    HoldingsNotFound { dir: PathBuf, marker: String },
    /// Filesystem error
    Io(String),
    /// Delimited file could not be read or written
    Csv(String),
    /// JSON serialization failed
    Json(String),
}

impl std::fmt::Display for CensusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CensusError::Transport(err) => write!(f, "Transport error: {}", err),
            CensusError::Query(msg) => write!(f, "Query error: {}", msg),
            CensusError::MissingColumn(column) => write!(f, "Missing column: {}", column),
            CensusError::HoldingsNotFound { dir, marker } => write!(
                f,
                "No holdings file containing '{}' found under {}",
                marker,
                dir.display()
            ),
            CensusError::Io(msg) => write!(f, "I/O error: {}", msg),
            CensusError::Csv(msg) => write!(f, "CSV error: {}", msg),
            CensusError::Json(msg) => write!(f, "JSON error: {}", msg),
        }
    }
}

impl std::error::Error for CensusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CensusError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for CensusError {
    fn from(err: TransportError) -> Self {
        CensusError::Transport(err)
    }
}

impl From<std::io::Error> for CensusError {
    fn from(err: std::io::Error) -> Self {
        CensusError::Io(err.to_string())
    }
}

impl From<csv::Error> for CensusError {
    fn from(err: csv::Error) -> Self {
        CensusError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for CensusError {
    fn from(err: serde_json::Error) -> Self {
        CensusError::Json(err.to_string())
    }
}

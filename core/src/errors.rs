//! Error types for Vinculo core operations

use crate::types::{CaseId, SourceFormat};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Vinculo core operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Ingestion error: {0}")]
    Ingest(#[from] FileFailure),

    #[error("Edge sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of ingestion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every attempted encoding failed
    Decode,
    /// File unreadable, missing or structurally unparseable
    Io,
    /// An expected column is absent
    Schema,
    /// A single row carries an unusable value
    Data,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Decode => write!(f, "decode"),
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Schema => write!(f, "schema"),
            ErrorKind::Data => write!(f, "data"),
        }
    }
}

/// Errors raised while loading, adapting or extracting one source file
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Could not decode input with any of: {}", .tried.join(", "))]
    Decode { tried: Vec<&'static str> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing expected column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Row at line {line}: {reason}")]
    Data { line: u64, reason: String },
}

impl IngestError {
    /// Build a schema error for the given missing columns
    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IngestError::Schema {
            missing: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a row-level data error
    pub fn data(line: u64, reason: impl Into<String>) -> Self {
        IngestError::Data {
            line,
            reason: reason.into(),
        }
    }

    /// Taxonomy bucket of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Decode { .. } => ErrorKind::Decode,
            IngestError::Io(_) | IngestError::Csv(_) => ErrorKind::Io,
            IngestError::Schema { .. } => ErrorKind::Schema,
            IngestError::Data { .. } => ErrorKind::Data,
        }
    }

    /// Whether this error aborts the whole file
    pub fn is_file_level(&self) -> bool {
        self.kind() != ErrorKind::Data
    }
}

/// File-level failure report handed back to the caller
#[derive(Error, Debug)]
#[error("{format} ingestion of {} for case {case_id} failed ({}): {error}", .path.display(), .error.kind())]
pub struct FileFailure {
    pub path: PathBuf,
    pub case_id: CaseId,
    pub format: SourceFormat,
    #[source]
    pub error: IngestError,
}

impl FileFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Errors related to edge sink operations
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink capacity exceeded: {0}")]
    CapacityExceeded(String),
}

/// Result type alias for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type alias for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(IngestError::Decode { tried: vec!["UTF-8"] }.kind(), ErrorKind::Decode);
        assert_eq!(IngestError::missing_columns(["Terminal"]).kind(), ErrorKind::Schema);
        assert_eq!(IngestError::data(4, "bad").kind(), ErrorKind::Data);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(IngestError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_only_data_errors_are_row_level() {
        assert!(!IngestError::data(2, "x").is_file_level());
        assert!(IngestError::missing_columns(["a"]).is_file_level());
    }

    #[test]
    fn test_file_failure_message_names_file_and_case() {
        let failure = FileFailure {
            path: PathBuf::from("/tmp/extrato.csv"),
            case_id: CaseId::new(12),
            format: SourceFormat::TransactionExtract,
            error: IngestError::missing_columns(["CPF_CNPJ_OD"]),
        };

        let message = failure.to_string();
        assert!(message.contains("/tmp/extrato.csv"));
        assert!(message.contains("case 12"));
        assert!(message.contains("schema"));
        assert!(message.contains("CPF_CNPJ_OD"));
    }
}

use connectors::{
    file::csv::error::FileError,
    sql::error::{ConnectorError, DbError},
};
use model::execution::failure::{FailureDetail, FailureKind};
use thiserror::Error;

/// Failure while pulling records from a source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Malformed record at line {line}: {reason} (content: '{content}')")]
    Malformed {
        line: u64,
        content: String,
        reason: String,
    },

    #[error("File error: {0}")]
    File(FileError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Source error: {0}")]
    Other(String),
}

impl From<FileError> for SourceError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::MalformedRecord {
                line,
                content,
                reason,
            } => SourceError::Malformed {
                line,
                content,
                reason,
            },
            other => SourceError::File(other),
        }
    }
}

/// Failure while writing a chunk. The chunk was not persisted.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Chunk rejected: {0}")]
    Rejected(String),

    /// The destination reported a condition expected to clear on its own,
    /// such as a lock timeout. Nothing from the attempt was persisted.
    #[error("Destination temporarily unavailable: {0}")]
    Transient(String),

    #[error("Sink already closed")]
    Closed,

    #[error("Retry attempts exhausted after {attempts} tries: {last}")]
    RetriesExhausted { attempts: usize, last: Box<SinkError> },
}

/// Key range discovery failed; the step cannot start.
#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("Source unreachable: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Failed to read key bounds: {0}")]
    Database(#[from] DbError),

    #[error("Partition count must be at least 1")]
    InvalidCount,

    #[error("Key range discovery failed: {0}")]
    Other(String),
}

impl SourceError {
    /// Detail recorded in a failed partition result.
    pub fn failure(&self) -> FailureDetail {
        match self {
            SourceError::Malformed {
                line,
                content,
                reason,
            } => FailureDetail::new(
                FailureKind::MalformedRecord,
                format!("{reason} (content: '{content}')"),
            )
            .at_line(*line),
            other => FailureDetail::new(FailureKind::Read, other.to_string()),
        }
    }
}

impl SinkError {
    pub fn failure(&self) -> FailureDetail {
        FailureDetail::new(FailureKind::Write, self.to_string())
    }
}

impl PartitionError {
    pub fn failure(&self) -> FailureDetail {
        FailureDetail::new(FailureKind::PartitionComputation, self.to_string())
    }
}

use crate::transform::error::TransformError;
use engine_core::error::{SinkError, SourceError};
use model::execution::failure::{FailureDetail, FailureKind};
use thiserror::Error;

/// A flush or close on the chunk writer failed. The buffered records
/// were discarded and none of the failed chunk is durable.
#[derive(Error, Debug)]
pub enum ChunkWriteError {
    #[error("Failed to write chunk {seq} ({rows} rows, keys {first_key:?}..{last_key:?}): {source}")]
    Chunk {
        seq: u64,
        rows: usize,
        first_key: Option<i64>,
        last_key: Option<i64>,
        #[source]
        source: SinkError,
    },

    #[error("Failed to close destination: {0}")]
    Close(#[source] SinkError),
}

impl ChunkWriteError {
    pub fn failure(&self) -> FailureDetail {
        let detail = FailureDetail::new(FailureKind::Write, self.to_string());
        match self {
            ChunkWriteError::Chunk { first_key, .. } => detail.for_record(*first_key),
            ChunkWriteError::Close(_) => detail,
        }
    }
}

/// Anything that ends a partition's loop early.
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Transform failed for record {record_id:?}: {source}")]
    Transform {
        record_id: Option<i64>,
        #[source]
        source: TransformError,
    },

    #[error(transparent)]
    Write(#[from] ChunkWriteError),
}

impl ExecutorError {
    pub fn failure(&self) -> FailureDetail {
        match self {
            ExecutorError::Source(err) => err.failure(),
            ExecutorError::Transform { record_id, source } => source.failure(*record_id),
            ExecutorError::Write(err) => err.failure(),
        }
    }
}

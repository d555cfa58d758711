use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a partition-terminating error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Source data did not have the expected shape.
    MalformedRecord,
    /// Source could not be opened or read.
    Read,
    /// A transform's required field was missing.
    Transform,
    /// The destination rejected a chunk.
    Write,
    /// Key range discovery failed before any worker started.
    PartitionComputation,
    /// Worker task panicked or was aborted.
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::MalformedRecord => "MalformedRecordError",
            FailureKind::Read => "ReadError",
            FailureKind::Transform => "TransformError",
            FailureKind::Write => "WriteError",
            FailureKind::PartitionComputation => "PartitionComputationError",
            FailureKind::Internal => "InternalError",
        };
        f.write_str(name)
    }
}

/// Error captured into a result instead of crossing a task boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub message: String,
    pub partition: Option<usize>,
    /// 1-based source line, when the source is a file.
    pub line: Option<u64>,
    pub record_id: Option<i64>,
}

impl FailureDetail {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        FailureDetail {
            kind,
            message: message.into(),
            partition: None,
            line: None,
            record_id: None,
        }
    }

    pub fn in_partition(mut self, partition: usize) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn at_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    pub fn for_record(mut self, id: Option<i64>) -> Self {
        self.record_id = id;
        self
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(partition) = self.partition {
            write!(f, " in partition {partition}")?;
        }
        if let Some(line) = self.line {
            write!(f, " at line {line}")?;
        }
        if let Some(id) = self.record_id {
            write!(f, " (record id {id})")?;
        }
        write!(f, ": {}", self.message)
    }
}

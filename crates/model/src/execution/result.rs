use crate::execution::{failure::FailureDetail, metrics::MetricsSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Completed => f.write_str("COMPLETED"),
            Status::Failed => f.write_str("FAILED"),
        }
    }
}

/// Terminal outcome of one partition's read-transform-write loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub partition_index: usize,
    pub read_count: u64,
    pub write_count: u64,
    pub status: Status,
    pub error: Option<FailureDetail>,
}

impl StepResult {
    pub fn completed(partition_index: usize, read_count: u64, write_count: u64) -> Self {
        StepResult {
            partition_index,
            read_count,
            write_count,
            status: Status::Completed,
            error: None,
        }
    }

    pub fn failed(
        partition_index: usize,
        read_count: u64,
        write_count: u64,
        error: FailureDetail,
    ) -> Self {
        StepResult {
            partition_index,
            read_count,
            write_count,
            status: Status::Failed,
            error: Some(error.in_partition(partition_index)),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// Aggregate of one step across all of its partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub status: Status,
    pub partitions: Vec<StepResult>,
    /// Step-level error raised before any partition started.
    pub error: Option<FailureDetail>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StepReport {
    /// Builds a report from partition results. An empty result set is a
    /// completed step with zero rows.
    pub fn from_partitions(
        name: impl Into<String>,
        partitions: Vec<StepResult>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let status = if partitions.iter().all(StepResult::is_completed) {
            Status::Completed
        } else {
            Status::Failed
        };
        StepReport {
            name: name.into(),
            status,
            partitions,
            error: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// A step that failed before any partition ran.
    pub fn aborted(name: impl Into<String>, error: FailureDetail, started_at: DateTime<Utc>) -> Self {
        StepReport {
            name: name.into(),
            status: Status::Failed,
            partitions: Vec::new(),
            error: Some(error),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn rows_read(&self) -> u64 {
        self.partitions.iter().map(|p| p.read_count).sum()
    }

    pub fn rows_written(&self) -> u64 {
        self.partitions.iter().map(|p| p.write_count).sum()
    }

    /// Every error of this step, step-level first, then by partition.
    pub fn errors(&self) -> Vec<&FailureDetail> {
        self.error
            .iter()
            .chain(self.partitions.iter().filter_map(|p| p.error.as_ref()))
            .collect()
    }
}

/// Final outcome of a job, handed to the completion callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub run_id: String,
    pub job_name: String,
    pub status: Status,
    pub steps: Vec<StepReport>,
    pub skipped_steps: Vec<String>,
    pub metrics: MetricsSnapshot,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn rows_read(&self) -> u64 {
        self.steps.iter().map(StepReport::rows_read).sum()
    }

    pub fn rows_written(&self) -> u64 {
        self.steps.iter().map(StepReport::rows_written).sum()
    }

    /// The first step that failed, if any.
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| !s.is_completed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::failure::{FailureDetail, FailureKind};

    #[test]
    fn step_fails_when_any_partition_fails() {
        let parts = vec![
            StepResult::completed(0, 25, 25),
            StepResult::failed(1, 3, 0, FailureDetail::new(FailureKind::Write, "duplicate key")),
            StepResult::completed(2, 25, 25),
        ];
        let report = StepReport::from_partitions("copy", parts, Utc::now());

        assert_eq!(report.status, Status::Failed);
        assert_eq!(report.rows_read(), 53);
        assert_eq!(report.rows_written(), 50);
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].partition, Some(1));
    }

    #[test]
    fn empty_step_is_completed() {
        let report = StepReport::from_partitions("copy", Vec::new(), Utc::now());
        assert!(report.is_completed());
        assert_eq!(report.rows_written(), 0);
    }

    #[test]
    fn serialized_form_uses_snake_case() {
        let result = StepResult::failed(
            2,
            7,
            5,
            FailureDetail::new(FailureKind::MalformedRecord, "bad id").at_line(10),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["kind"], "malformed_record");
        assert_eq!(json["error"]["line"], 10);
        assert_eq!(json["error"]["partition"], 2);
    }
}

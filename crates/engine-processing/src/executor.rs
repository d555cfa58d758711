use crate::{error::ExecutorError, transform::pipeline::TransformPipeline, writer::ChunkWriter};
use async_trait::async_trait;
use engine_core::{connectors::source::RecordSource, metrics::Metrics};
use model::{
    execution::{failure::FailureDetail, result::StepResult},
    pagination::partition::Partition,
};
use std::{fmt, sync::Arc};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutorState::Idle => "idle",
            ExecutorState::Running => "running",
            ExecutorState::Completed => "completed",
            ExecutorState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs one partition end to end: read, transform, buffer, flush.
///
/// Owns its source and writer exclusively. Any error stops the loop and is
/// captured in the returned [`StepResult`]; nothing propagates to the caller.
pub struct StepExecutor {
    partition: Partition,
    source: Box<dyn RecordSource>,
    transform: Arc<TransformPipeline>,
    writer: ChunkWriter,
    metrics: Metrics,
    state: ExecutorState,
    read: u64,
}

impl StepExecutor {
    pub fn new(
        partition: Partition,
        source: Box<dyn RecordSource>,
        transform: Arc<TransformPipeline>,
        writer: ChunkWriter,
        metrics: Metrics,
    ) -> Self {
        Self {
            partition,
            source,
            transform,
            writer,
            metrics,
            state: ExecutorState::Idle,
            read: 0,
        }
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub async fn run(mut self) -> StepResult {
        self.state = ExecutorState::Running;
        info!("Partition {} started", self.partition);

        let outcome = match self.pump().await {
            Ok(()) => self.writer.close().await.map_err(ExecutorError::from),
            Err(e) => Err(e),
        };

        let index = self.partition.index;
        match outcome {
            Ok(written) => {
                self.state = ExecutorState::Completed;
                info!(
                    partition = index,
                    read = self.read,
                    written,
                    "Partition {index} completed"
                );
                StepResult::completed(index, self.read, written)
            }
            Err(err) => {
                self.state = ExecutorState::Failed;
                let detail = err.failure();
                error!(partition = index, "Partition {index} failed: {detail}");
                let written = self.writer.abandon().await;
                StepResult::failed(index, self.read, written, detail)
            }
        }
    }

    async fn pump(&mut self) -> Result<(), ExecutorError> {
        while let Some(record) = self.source.next().await? {
            self.read += 1;
            self.metrics.increment_read(1);

            let transformed =
                self.transform
                    .apply(&record)
                    .map_err(|source| ExecutorError::Transform {
                        record_id: record.id,
                        source,
                    })?;
            self.writer.add(transformed).await?;
        }
        debug!(
            partition = self.partition.index,
            read = self.read,
            "Source exhausted"
        );
        Ok(())
    }
}

/// Builds a ready-to-run executor for one partition. Opening the source or
/// sink may fail; that failure belongs to the partition, not the step.
#[async_trait]
pub trait ExecutorFactory: Send + Sync {
    async fn create(&self, partition: Partition) -> Result<StepExecutor, FailureDetail>;
}

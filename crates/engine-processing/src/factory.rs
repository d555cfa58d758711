use crate::{
    executor::{ExecutorFactory, StepExecutor},
    transform::pipeline::TransformPipeline,
    writer::ChunkWriter,
};
use async_trait::async_trait;
use engine_core::{
    connectors::{sink::SinkFactory, source::SourceFactory},
    metrics::Metrics,
};
use model::{execution::failure::FailureDetail, pagination::partition::Partition};
use std::sync::Arc;
use tracing::debug;

/// Wires a source, a transform pipeline and a sink into an executor for
/// each partition of a step.
pub struct PipelineExecutorFactory {
    source: Arc<dyn SourceFactory>,
    sink: Arc<dyn SinkFactory>,
    transform: Arc<TransformPipeline>,
    chunk_size: usize,
    metrics: Metrics,
}

impl PipelineExecutorFactory {
    pub fn new(
        source: Arc<dyn SourceFactory>,
        sink: Arc<dyn SinkFactory>,
        transform: TransformPipeline,
        chunk_size: usize,
        metrics: Metrics,
    ) -> Self {
        Self {
            source,
            sink,
            transform: Arc::new(transform),
            chunk_size,
            metrics,
        }
    }
}

#[async_trait]
impl ExecutorFactory for PipelineExecutorFactory {
    async fn create(&self, partition: Partition) -> Result<StepExecutor, FailureDetail> {
        debug!(
            "Opening {} source {} for partition {}",
            self.source.format(),
            self.source.describe(),
            partition
        );
        let source = self
            .source
            .open(&partition)
            .await
            .map_err(|e| e.failure())?;
        let sink = self.sink.open(&partition).await.map_err(|e| e.failure())?;

        let writer = ChunkWriter::new(
            sink,
            partition.index,
            self.chunk_size,
            self.metrics.clone(),
        );
        Ok(StepExecutor::new(
            partition,
            source,
            Arc::clone(&self.transform),
            writer,
            self.metrics.clone(),
        ))
    }
}

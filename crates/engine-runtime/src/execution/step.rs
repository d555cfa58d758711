use crate::execution::scheduler::PartitionScheduler;
use chrono::Utc;
use engine_core::{error::PartitionError, metrics::Metrics, partitioner::RangePartitioner};
use engine_processing::executor::ExecutorFactory;
use model::{execution::result::StepReport, pagination::partition::Partition};
use std::sync::Arc;
use tracing::{error, info};

/// How a step's source is divided between workers.
#[derive(Clone)]
pub enum Partitioning {
    /// The whole source is one partition.
    Single,
    /// Contiguous key ranges discovered from the source table.
    KeyRange {
        partitioner: RangePartitioner,
        table: String,
        column: String,
        count: usize,
    },
}

/// A named read-transform-write stage of a job.
pub struct Step {
    name: String,
    partitioning: Partitioning,
    factory: Arc<dyn ExecutorFactory>,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        partitioning: Partitioning,
        factory: Arc<dyn ExecutorFactory>,
    ) -> Self {
        Self {
            name: name.into(),
            partitioning,
            factory,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn partitions(&self) -> Result<Vec<Partition>, PartitionError> {
        match &self.partitioning {
            Partitioning::Single => Ok(vec![Partition::unbounded()]),
            Partitioning::KeyRange {
                partitioner,
                table,
                column,
                count,
            } => partitioner.partition(table, column, *count).await,
        }
    }

    pub async fn run(&self, scheduler: &PartitionScheduler, metrics: &Metrics) -> StepReport {
        let started_at = Utc::now();
        info!(step = %self.name, "Starting step");

        let partitions = match self.partitions().await {
            Ok(partitions) => partitions,
            Err(e) => {
                let detail = e.failure();
                error!(step = %self.name, "Step aborted: {detail}");
                metrics.increment_failures(1);
                return StepReport::aborted(&self.name, detail, started_at);
            }
        };

        info!(
            step = %self.name,
            partitions = partitions.len(),
            workers = scheduler.pool_size(),
            "Dispatching partitions"
        );
        let results = scheduler.run(partitions, Arc::clone(&self.factory)).await;

        let failed = results.iter().filter(|r| !r.is_completed()).count();
        metrics.increment_failures(failed as u64);

        let report = StepReport::from_partitions(&self.name, results, started_at);
        info!(
            step = %self.name,
            status = %report.status,
            read = report.rows_read(),
            written = report.rows_written(),
            "Step finished"
        );
        report
    }
}

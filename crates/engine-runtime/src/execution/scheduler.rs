use engine_processing::executor::ExecutorFactory;
use model::{
    execution::{
        failure::{FailureDetail, FailureKind},
        result::StepResult,
    },
    pagination::partition::Partition,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// Runs one executor per partition with at most `pool_size` in flight.
///
/// Every partition yields exactly one [`StepResult`], in partition order.
/// A panicking worker is reported as an internal failure for its own
/// partition and does not disturb its siblings. Its counts are reported as
/// zero, and the failure message says that earlier chunks may be persisted.
#[derive(Debug, Clone, Copy)]
pub struct PartitionScheduler {
    pool_size: usize,
}

impl PartitionScheduler {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size: pool_size.max(1),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub async fn run(
        &self,
        partitions: Vec<Partition>,
        factory: Arc<dyn ExecutorFactory>,
    ) -> Vec<StepResult> {
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut handles = Vec::with_capacity(partitions.len());

        for partition in partitions {
            let semaphore = Arc::clone(&semaphore);
            let factory = Arc::clone(&factory);
            let index = partition.index;

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return StepResult::failed(
                        index,
                        0,
                        0,
                        FailureDetail::new(FailureKind::Internal, "Worker pool closed"),
                    );
                };
                debug!(partition = index, "Worker acquired");

                match factory.create(partition).await {
                    Ok(executor) => executor.run().await,
                    Err(detail) => {
                        error!(partition = index, "Failed to start partition: {detail}");
                        StepResult::failed(index, 0, 0, detail)
                    }
                }
            });
            handles.push((index, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (index, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(partition = index, "Worker task failed: {e}");
                    // the worker's counters died with it; committed chunks did not
                    StepResult::failed(
                        index,
                        0,
                        0,
                        FailureDetail::new(
                            FailureKind::Internal,
                            format!(
                                "Worker task failed: {e}; row counts for this partition are \
                                 unknown and chunks committed before the failure remain \
                                 in the destination"
                            ),
                        ),
                    )
                }
            };
            results.push(result);
        }
        results
    }
}

use crate::execution::{scheduler::PartitionScheduler, step::Step};
use chrono::Utc;
use engine_core::metrics::Metrics;
use model::execution::result::{JobResult, Status};
use tracing::{info, warn};
use uuid::Uuid;

pub type CompletionCallback = Box<dyn FnOnce(&JobResult) + Send>;

/// Runs a job's steps in declaration order. A failed step ends the job;
/// steps after it are recorded as skipped and never started.
pub struct JobOrchestrator {
    name: String,
    steps: Vec<Step>,
    scheduler: PartitionScheduler,
    metrics: Metrics,
    on_complete: Option<CompletionCallback>,
}

impl JobOrchestrator {
    pub fn new(name: impl Into<String>, scheduler: PartitionScheduler, metrics: Metrics) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            scheduler,
            metrics,
            on_complete: None,
        }
    }

    pub fn add_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Registers a callback invoked exactly once with the final result.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&JobResult) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name() == name)
    }

    pub async fn run(mut self) -> JobResult {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(job = %self.name, %run_id, steps = self.steps.len(), "Job started");

        let mut reports = Vec::with_capacity(self.steps.len());
        let mut skipped_steps = Vec::new();
        let mut status = Status::Completed;

        for (idx, step) in self.steps.iter().enumerate() {
            if status == Status::Failed {
                warn!(step = step.name(), "Skipping step after earlier failure");
                skipped_steps.push(step.name().to_string());
                continue;
            }

            info!(
                "Processing step {}/{}: {}",
                idx + 1,
                self.steps.len(),
                step.name()
            );
            let report = step.run(&self.scheduler, &self.metrics).await;
            status = report.status;
            reports.push(report);
        }

        let result = JobResult {
            run_id,
            job_name: self.name.clone(),
            status,
            steps: reports,
            skipped_steps,
            metrics: self.metrics.snapshot(),
            started_at,
            finished_at: Utc::now(),
        };

        let elapsed = result.finished_at - result.started_at;
        info!(
            job = %self.name,
            status = %result.status,
            read = result.rows_read(),
            written = result.rows_written(),
            "Job finished in {:.2}s",
            elapsed.num_milliseconds() as f64 / 1000.0
        );

        if let Some(callback) = self.on_complete.take() {
            callback(&result);
        }
        result
    }
}

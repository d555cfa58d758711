use crate::error::CliError;
use model::execution::result::JobResult;
use serde::Serialize;
use std::fmt::Write;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub async fn write_report(result: &JobResult, path: &str) -> Result<(), CliError> {
    let report_json = to_json(result)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", to_json(value)?);
    Ok(())
}

/// Human-readable outcome of a job: one block per step, one line per
/// partition, then errors and skipped steps.
pub fn render_summary(result: &JobResult) -> String {
    let mut out = String::new();
    let elapsed = result.finished_at - result.started_at;

    let _ = writeln!(out, "Job '{}' {} (run {})", result.job_name, result.status, result.run_id);
    let _ = writeln!(out, "-----------------------------");
    let _ = writeln!(out, "{:<16} {}", "Rows read", result.rows_read());
    let _ = writeln!(out, "{:<16} {}", "Rows written", result.rows_written());
    let _ = writeln!(out, "{:<16} {}", "Chunks", result.metrics.chunks_flushed);
    let _ = writeln!(out, "{:<16} {}", "Retries", result.metrics.retry_count);
    let _ = writeln!(
        out,
        "{:<16} {:.2}s",
        "Elapsed",
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    for step in &result.steps {
        let _ = writeln!(out);
        let _ = writeln!(out, "Step '{}': {}", step.name, step.status);
        for partition in &step.partitions {
            let _ = writeln!(
                out,
                "  partition {:<4} {:<10} read {:<10} written {}",
                partition.partition_index,
                partition.status,
                partition.read_count,
                partition.write_count
            );
        }
        for error in step.errors() {
            let _ = writeln!(out, "  error: {error}");
        }
    }

    if !result.skipped_steps.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Skipped: {}", result.skipped_steps.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use model::execution::{
        failure::{FailureDetail, FailureKind},
        metrics::MetricsSnapshot,
        result::{Status, StepReport, StepResult},
    };

    #[test]
    fn summary_lists_partitions_errors_and_skips() {
        let now = Utc::now();
        let step = StepReport::from_partitions(
            "copy",
            vec![
                StepResult::completed(0, 25, 25),
                StepResult::failed(
                    1,
                    10,
                    0,
                    FailureDetail::new(FailureKind::Write, "duplicate key").for_record(Some(30)),
                ),
            ],
            now,
        );
        let result = JobResult {
            run_id: "r-1".into(),
            job_name: "nightly".into(),
            status: Status::Failed,
            steps: vec![step],
            skipped_steps: vec!["archive".into()],
            metrics: MetricsSnapshot::default(),
            started_at: now,
            finished_at: now,
        };

        let summary = render_summary(&result);
        assert!(summary.contains("Job 'nightly' FAILED"));
        assert!(summary.contains("Rows read        35"));
        assert!(summary.contains("Step 'copy': FAILED"));
        assert!(summary.contains("WriteError in partition 1"));
        assert!(summary.contains("Skipped: archive"));
    }
}

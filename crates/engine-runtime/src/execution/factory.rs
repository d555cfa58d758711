use crate::{
    error::MigrationError,
    execution::{
        orchestrator::JobOrchestrator,
        scheduler::PartitionScheduler,
        step::{Partitioning, Step},
    },
};
use connectors::file::csv::source::CsvOptions;
use engine_config::settings::{JobConfig, SourceConfig, StepConfig};
use engine_core::{
    connectors::{
        probe::PgKeyRangeProbe,
        sink::{PgSinkFactory, RetryingSinkFactory, SinkFactory},
        source::{CsvSourceFactory, PgTableSourceFactory, SourceFactory},
    },
    metrics::Metrics,
    partitioner::RangePartitioner,
    retry::RetryPolicy,
};
use engine_processing::{factory::PipelineExecutorFactory, transform::pipeline::TransformPipeline};
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// Assembles a runnable job from a validated configuration.
pub fn build_job(config: &JobConfig, metrics: Metrics) -> Result<JobOrchestrator, MigrationError> {
    let scheduler = PartitionScheduler::new(config.worker_pool_size);
    let mut job = JobOrchestrator::new(&config.name, scheduler, metrics.clone());
    for step in &config.steps {
        job = job.add_step(build_step(config, step, &metrics)?);
    }
    Ok(job)
}

pub fn build_step(
    config: &JobConfig,
    step: &StepConfig,
    metrics: &Metrics,
) -> Result<Step, MigrationError> {
    let (source, partitioning) = build_source(config, step)?;
    let sink = build_sink(config, step, metrics)?;
    let transform = TransformPipeline::from_kinds(&step.transforms);

    debug!(
        step = %step.name,
        source = %source.describe(),
        target = %sink.describe(),
        transforms = ?transform.names(),
        "Built step"
    );

    let factory = PipelineExecutorFactory::new(
        source,
        sink,
        transform,
        config.chunk_size,
        metrics.clone(),
    );
    Ok(Step::new(&step.name, partitioning, Arc::new(factory)))
}

fn build_source(
    config: &JobConfig,
    step: &StepConfig,
) -> Result<(Arc<dyn SourceFactory>, Partitioning), MigrationError> {
    match &step.source {
        SourceConfig::Csv {
            path,
            delimiter,
            has_header,
        } => {
            let delimiter =
                u8::try_from(*delimiter).map_err(|_| MigrationError::InvalidDelimiter {
                    step: step.name.clone(),
                    delimiter: *delimiter,
                })?;
            let options = CsvOptions {
                delimiter,
                has_header: *has_header,
            };
            Ok((
                Arc::new(CsvSourceFactory::new(path, options)),
                Partitioning::Single,
            ))
        }
        SourceConfig::Table {
            connection,
            table,
            key_column,
        } => {
            let url = connection_url(config, step, connection)?;
            let source =
                PgTableSourceFactory::new(url, table, key_column, config.fetch_size);
            let partitioner = RangePartitioner::new(Arc::new(PgKeyRangeProbe::new(url)));
            Ok((
                Arc::new(source),
                Partitioning::KeyRange {
                    partitioner,
                    table: table.clone(),
                    column: key_column.clone(),
                    count: config.partition_count,
                },
            ))
        }
    }
}

fn build_sink(
    config: &JobConfig,
    step: &StepConfig,
    metrics: &Metrics,
) -> Result<Arc<dyn SinkFactory>, MigrationError> {
    let url = connection_url(config, step, &step.target.connection)?;
    let sink: Box<dyn SinkFactory> = Box::new(PgSinkFactory::new(url, &step.target.table));

    Ok(match &config.write_retry {
        Some(retry) => {
            let policy = RetryPolicy::new(
                retry.max_attempts,
                Duration::from_millis(retry.base_delay_ms),
                Duration::from_millis(retry.max_delay_ms),
            );
            Arc::new(RetryingSinkFactory::new(sink, policy, metrics.clone()))
        }
        None => Arc::from(sink),
    })
}

fn connection_url<'a>(
    config: &'a JobConfig,
    step: &StepConfig,
    name: &str,
) -> Result<&'a str, MigrationError> {
    config
        .connection_url(name)
        .ok_or_else(|| MigrationError::UnknownConnection {
            step: step.name.clone(),
            connection: name.to_string(),
        })
}

use crate::memory::MemoryTable;
use engine_config::settings::TransformKind;
use engine_core::{
    connectors::{sink::SinkFactory, source::SourceFactory},
    metrics::Metrics,
    partitioner::RangePartitioner,
};
use engine_processing::{factory::PipelineExecutorFactory, transform::pipeline::TransformPipeline};
use engine_runtime::execution::step::{Partitioning, Step};
use model::records::record::Record;
use std::{fs, path::PathBuf, sync::Arc};
use tempfile::TempDir;

/// `count` sequential client rows starting at id 1.
pub fn client_rows(count: i64) -> Vec<Record> {
    (1..=count)
        .map(|id| {
            Record::new(
                id,
                format!("first{id}"),
                format!("last{id}"),
                format!("user{id}@example.com"),
                format!("555-{id:04}"),
            )
        })
        .collect()
}

/// Writes `lines` to `clients.csv` inside `dir` and returns its path.
pub fn write_csv(dir: &TempDir, lines: &[&str]) -> PathBuf {
    let path = dir.path().join("clients.csv");
    fs::write(&path, lines.join("\n")).expect("write csv");
    path
}

pub fn pipeline_factory(
    source: Arc<dyn SourceFactory>,
    sink: Arc<dyn SinkFactory>,
    transforms: &[TransformKind],
    chunk_size: usize,
    metrics: &Metrics,
) -> Arc<PipelineExecutorFactory> {
    Arc::new(PipelineExecutorFactory::new(
        source,
        sink,
        TransformPipeline::from_kinds(transforms),
        chunk_size,
        metrics.clone(),
    ))
}

/// Table-to-table step partitioned by key range over `source`.
pub fn table_step(
    name: &str,
    source: &MemoryTable,
    target: &MemoryTable,
    transforms: &[TransformKind],
    chunk_size: usize,
    partitions: usize,
    metrics: &Metrics,
) -> Step {
    let partitioning = Partitioning::KeyRange {
        partitioner: RangePartitioner::new(Arc::new(source.clone())),
        table: "client".to_string(),
        column: "id".to_string(),
        count: partitions,
    };
    Step::new(
        name,
        partitioning,
        pipeline_factory(
            Arc::new(source.clone()),
            Arc::new(target.clone()),
            transforms,
            chunk_size,
            metrics,
        ),
    )
}

use async_trait::async_trait;
use engine_core::{
    connectors::{
        probe::KeyRangeProbe,
        sink::{ChunkSink, SinkFactory},
        source::{DataFormat, RecordSource, SourceFactory},
    },
    error::{PartitionError, SinkError, SourceError},
};
use model::{
    pagination::partition::Partition,
    records::{chunk::Chunk, record::Record},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

#[derive(Default)]
struct TableState {
    rows: BTreeMap<i64, Record>,
    flushes: Vec<(usize, usize)>,
    fail_read_at: BTreeSet<i64>,
    fail_write_at: BTreeSet<i64>,
    probe_down: bool,
}

/// A keyed in-memory table standing in for both ends of a step.
///
/// Writes behave like a primary-keyed table inside a transaction: a chunk
/// containing a duplicate or an injected failure key is rejected whole.
#[derive(Clone, Default)]
pub struct MemoryTable {
    name: String,
    state: Arc<Mutex<TableState>>,
}

impl MemoryTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::default(),
        }
    }

    pub fn with_rows(name: &str, rows: impl IntoIterator<Item = Record>) -> Self {
        let table = Self::new(name);
        {
            let mut state = table.state();
            for row in rows {
                if let Some(id) = row.id {
                    state.rows.insert(id, row);
                }
            }
        }
        table
    }

    fn state(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().expect("table lock poisoned")
    }

    /// Reading the record with this key fails.
    pub fn fail_read_at(&self, id: i64) {
        self.state().fail_read_at.insert(id);
    }

    /// Any chunk containing this key is rejected.
    pub fn fail_write_at(&self, id: i64) {
        self.state().fail_write_at.insert(id);
    }

    pub fn set_unreachable(&self) {
        self.state().probe_down = true;
    }

    pub fn rows(&self) -> Vec<Record> {
        self.state().rows.values().cloned().collect()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.state().rows.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.state().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sizes of successful flushes, in commit order.
    pub fn flush_sizes(&self) -> Vec<usize> {
        self.state().flushes.iter().map(|(_, rows)| *rows).collect()
    }

    /// Sizes of successful flushes made by one partition.
    pub fn flush_sizes_for(&self, partition: usize) -> Vec<usize> {
        self.state()
            .flushes
            .iter()
            .filter(|(p, _)| *p == partition)
            .map(|(_, rows)| *rows)
            .collect()
    }
}

#[async_trait]
impl KeyRangeProbe for MemoryTable {
    async fn key_bounds(
        &self,
        _table: &str,
        _column: &str,
    ) -> Result<Option<(i64, i64)>, PartitionError> {
        let state = self.state();
        if state.probe_down {
            return Err(PartitionError::Other(format!("{} is unreachable", self.name)));
        }
        let min = state.rows.keys().next().copied();
        let max = state.rows.keys().next_back().copied();
        Ok(min.zip(max))
    }
}

pub struct MemoryReader {
    rows: std::vec::IntoIter<Record>,
    fail_at: BTreeSet<i64>,
}

#[async_trait]
impl RecordSource for MemoryReader {
    async fn next(&mut self) -> Result<Option<Record>, SourceError> {
        tokio::task::yield_now().await;
        match self.rows.next() {
            Some(row) if row.id.is_some_and(|id| self.fail_at.contains(&id)) => Err(
                SourceError::Other(format!("read failed at id {}", row.id.unwrap_or_default())),
            ),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl SourceFactory for MemoryTable {
    async fn open(&self, partition: &Partition) -> Result<Box<dyn RecordSource>, SourceError> {
        let state = self.state();
        let rows: Vec<Record> = state
            .rows
            .range(partition.min_key..=partition.max_key)
            .map(|(_, row)| row.clone())
            .collect();
        Ok(Box::new(MemoryReader {
            rows: rows.into_iter(),
            fail_at: state.fail_read_at.clone(),
        }))
    }

    fn format(&self) -> DataFormat {
        DataFormat::Postgres
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

pub struct MemoryWriter {
    table: MemoryTable,
    closed: bool,
}

#[async_trait]
impl ChunkSink for MemoryWriter {
    async fn write_chunk(&mut self, chunk: &Chunk) -> Result<u64, SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        tokio::task::yield_now().await;

        let mut state = self.table.state();
        for record in &chunk.records {
            let Some(id) = record.id else {
                return Err(SinkError::Rejected("null value in column \"id\"".into()));
            };
            if state.fail_write_at.contains(&id) {
                return Err(SinkError::Rejected(format!("injected failure at id {id}")));
            }
            if state.rows.contains_key(&id) {
                return Err(SinkError::Rejected(format!("duplicate key id={id}")));
            }
        }
        for record in &chunk.records {
            if let Some(id) = record.id {
                state.rows.insert(id, record.clone());
            }
        }
        state.flushes.push((chunk.partition, chunk.len()));
        Ok(chunk.len() as u64)
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.closed = true;
        Ok(())
    }
}

#[async_trait]
impl SinkFactory for MemoryTable {
    async fn open(&self, _partition: &Partition) -> Result<Box<dyn ChunkSink>, SinkError> {
        Ok(Box::new(MemoryWriter {
            table: self.clone(),
            closed: false,
        }))
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

use crate::records::record::Record;

/// A bounded, ordered group of transformed records written in one
/// transaction. Only exists between a writer's buffer and its sink.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Partition that produced the chunk.
    pub partition: usize,
    /// Zero-based flush sequence number within the partition.
    pub seq: u64,
    pub records: Vec<Record>,
}

impl Chunk {
    pub fn new(partition: usize, seq: u64, records: Vec<Record>) -> Self {
        Chunk {
            partition,
            seq,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.records.iter().map(Record::size_bytes).sum()
    }

    /// Keys of the first and last record, for log context.
    pub fn key_span(&self) -> Option<(Option<i64>, Option<i64>)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.id, last.id))
    }
}

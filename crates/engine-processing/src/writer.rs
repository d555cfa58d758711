use crate::error::ChunkWriteError;
use engine_core::{connectors::sink::ChunkSink, metrics::Metrics};
use model::records::{chunk::Chunk, record::Record};
use std::mem;
use tracing::{debug, info, warn};

/// Buffers transformed records for one partition and hands them to the
/// sink in chunks of at most `chunk_size`.
///
/// Every flush is one sink transaction. When a flush fails, the buffer is
/// dropped and later calls see an empty buffer, so a partition never
/// re-sends a chunk the sink already refused.
pub struct ChunkWriter {
    sink: Box<dyn ChunkSink>,
    partition: usize,
    chunk_size: usize,
    buffer: Vec<Record>,
    written: u64,
    flushes: u64,
    closed: bool,
    metrics: Metrics,
}

impl ChunkWriter {
    pub fn new(
        sink: Box<dyn ChunkSink>,
        partition: usize,
        chunk_size: usize,
        metrics: Metrics,
    ) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            sink,
            partition,
            chunk_size,
            buffer: Vec::with_capacity(chunk_size.min(65_536)),
            written: 0,
            flushes: 0,
            closed: false,
            metrics,
        }
    }

    /// Appends a record, flushing when the buffer reaches the chunk size.
    pub async fn add(&mut self, record: Record) -> Result<(), ChunkWriteError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.chunk_size {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), ChunkWriteError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let chunk = Chunk::new(self.partition, self.flushes, mem::take(&mut self.buffer));
        let rows = chunk.len();
        let (first_key, last_key) = chunk.key_span().unwrap_or((None, None));

        match self.sink.write_chunk(&chunk).await {
            Ok(count) => {
                self.written += count;
                self.flushes += 1;
                self.metrics.increment_written(count);
                self.metrics.increment_chunks(1);
                self.metrics.increment_bytes(chunk.size_bytes() as u64);
                info!(
                    partition = self.partition,
                    seq = chunk.seq,
                    rows,
                    "Chunk written ({:?}..{:?})",
                    first_key,
                    last_key
                );
                Ok(())
            }
            Err(source) => Err(ChunkWriteError::Chunk {
                seq: chunk.seq,
                rows,
                first_key,
                last_key,
                source,
            }),
        }
    }

    /// Flushes the remainder and releases the sink.
    pub async fn close(&mut self) -> Result<u64, ChunkWriteError> {
        self.flush().await?;
        self.closed = true;
        self.sink.close().await.map_err(ChunkWriteError::Close)?;
        debug!(
            partition = self.partition,
            chunks = self.flushes,
            "Writer closed"
        );
        Ok(self.written)
    }

    /// Drops anything still buffered and releases the sink.
    pub async fn abandon(mut self) -> u64 {
        let dropped = self.buffer.len();
        self.buffer.clear();
        if dropped > 0 {
            debug!(partition = self.partition, dropped, "Discarding buffered rows");
        }
        if !self.closed
            && let Err(e) = self.sink.close().await
        {
            warn!(partition = self.partition, "Failed to close destination: {e}");
        }
        self.written
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

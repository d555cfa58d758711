use crate::{
    error::SinkError,
    metrics::Metrics,
    retry::{RetryDisposition, RetryPolicy, classify_sink_error},
};
use async_trait::async_trait;
use connectors::sql::postgres::{utils::connect_client, writer::PgChunkWriter};
use model::{pagination::partition::Partition, records::chunk::Chunk};
use tokio::time::sleep;
use tracing::warn;

/// Destination that persists a chunk atomically: after an `Err` from
/// `write_chunk`, none of the chunk's records are durable.
#[async_trait]
pub trait ChunkSink: Send {
    /// Writes the whole chunk in one transaction and returns the number
    /// of records written.
    async fn write_chunk(&mut self, chunk: &Chunk) -> Result<u64, SinkError>;

    /// Releases the destination resource.
    async fn close(&mut self) -> Result<(), SinkError>;
}

/// Opens a destination for one partition's writer.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    async fn open(&self, partition: &Partition) -> Result<Box<dyn ChunkSink>, SinkError>;

    fn describe(&self) -> String;
}

#[async_trait]
impl ChunkSink for PgChunkWriter {
    async fn write_chunk(&mut self, chunk: &Chunk) -> Result<u64, SinkError> {
        Ok(PgChunkWriter::write_chunk(self, &chunk.records).await?)
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        PgChunkWriter::close(self);
        Ok(())
    }
}

pub struct PgSinkFactory {
    url: String,
    table: String,
}

impl PgSinkFactory {
    pub fn new(url: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            table: table.into(),
        }
    }
}

#[async_trait]
impl SinkFactory for PgSinkFactory {
    async fn open(&self, _partition: &Partition) -> Result<Box<dyn ChunkSink>, SinkError> {
        let client = connect_client(&self.url).await?;
        let writer = PgChunkWriter::new(client, &self.table)?;
        Ok(Box::new(writer))
    }

    fn describe(&self) -> String {
        format!("table {}", self.table)
    }
}

/// Re-runs a failed chunk write while the error is transient. Safe because
/// a failed attempt left nothing behind.
pub struct RetryingSink {
    inner: Box<dyn ChunkSink>,
    policy: RetryPolicy,
    metrics: Metrics,
}

impl RetryingSink {
    pub fn new(inner: Box<dyn ChunkSink>, policy: RetryPolicy, metrics: Metrics) -> Self {
        Self {
            inner,
            policy,
            metrics,
        }
    }
}

#[async_trait]
impl ChunkSink for RetryingSink {
    async fn write_chunk(&mut self, chunk: &Chunk) -> Result<u64, SinkError> {
        let mut attempt = 0;
        loop {
            let err = match self.inner.write_chunk(chunk).await {
                Ok(written) => return Ok(written),
                Err(err) => err,
            };

            if classify_sink_error(&err) == RetryDisposition::Stop {
                return Err(err);
            }
            let Some(delay) = self.policy.next_delay(attempt) else {
                return Err(SinkError::RetriesExhausted {
                    attempts: attempt + 1,
                    last: Box::new(err),
                });
            };

            warn!(
                partition = chunk.partition,
                chunk = chunk.seq,
                attempt = attempt + 1,
                delay_ms = delay.as_millis(),
                error = %err,
                "Chunk write failed, retrying"
            );
            self.metrics.increment_retries(1);
            sleep(delay).await;
            attempt += 1;
        }
    }

    async fn close(&mut self) -> Result<(), SinkError> {
        self.inner.close().await
    }
}

/// Wraps every sink a factory opens in a [`RetryingSink`].
pub struct RetryingSinkFactory {
    inner: Box<dyn SinkFactory>,
    policy: RetryPolicy,
    metrics: Metrics,
}

impl RetryingSinkFactory {
    pub fn new(inner: Box<dyn SinkFactory>, policy: RetryPolicy, metrics: Metrics) -> Self {
        Self {
            inner,
            policy,
            metrics,
        }
    }
}

#[async_trait]
impl SinkFactory for RetryingSinkFactory {
    async fn open(&self, partition: &Partition) -> Result<Box<dyn ChunkSink>, SinkError> {
        let sink = self.inner.open(partition).await?;
        Ok(Box::new(RetryingSink::new(
            sink,
            self.policy.clone(),
            self.metrics.clone(),
        )))
    }

    fn describe(&self) -> String {
        format!(
            "{} (up to {} attempts per chunk)",
            self.inner.describe(),
            self.policy.max_attempts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::sql::error::DbError;
    use model::records::record::Record;
    use std::time::Duration;

    /// Fails with the given errors in order, then succeeds.
    struct FlakySink {
        failures: Vec<SinkError>,
        attempts: usize,
    }

    #[async_trait]
    impl ChunkSink for FlakySink {
        async fn write_chunk(&mut self, chunk: &Chunk) -> Result<u64, SinkError> {
            self.attempts += 1;
            if self.failures.is_empty() {
                Ok(chunk.len() as u64)
            } else {
                Err(self.failures.remove(0))
            }
        }

        async fn close(&mut self) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn chunk() -> Chunk {
        Chunk::new(0, 0, vec![Record::new(1, "ann", "lee", "a@x", "555")])
    }

    fn fast_policy(attempts: usize) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn fatal_errors_are_returned_immediately() {
        let flaky = FlakySink {
            failures: vec![SinkError::Database(DbError::Write("constraint".into()))],
            attempts: 0,
        };
        let metrics = Metrics::new();
        let mut sink = RetryingSink::new(Box::new(flaky), fast_policy(3), metrics.clone());

        let result = sink.write_chunk(&chunk()).await;

        assert!(matches!(result, Err(SinkError::Database(DbError::Write(_)))));
        assert_eq!(metrics.snapshot().retry_count, 0);
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let flaky = FlakySink {
            failures: Vec::new(),
            attempts: 0,
        };
        let mut sink = RetryingSink::new(Box::new(flaky), fast_policy(3), Metrics::new());
        assert_eq!(sink.write_chunk(&chunk()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn transient_errors_are_retried_until_success() {
        let flaky = FlakySink {
            failures: vec![
                SinkError::Transient("lock timeout".into()),
                SinkError::Transient("lock timeout".into()),
            ],
            attempts: 0,
        };
        let metrics = Metrics::new();
        let mut sink = RetryingSink::new(Box::new(flaky), fast_policy(3), metrics.clone());

        assert_eq!(sink.write_chunk(&chunk()).await.unwrap(), 1);
        assert_eq!(metrics.snapshot().retry_count, 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let flaky = FlakySink {
            failures: (0..5)
                .map(|_| SinkError::Transient("too many connections".into()))
                .collect(),
            attempts: 0,
        };
        let metrics = Metrics::new();
        let mut sink = RetryingSink::new(Box::new(flaky), fast_policy(3), metrics.clone());

        match sink.write_chunk(&chunk()).await {
            Err(SinkError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, SinkError::Transient(_)));
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }
        assert_eq!(metrics.snapshot().retry_count, 2);
    }
}

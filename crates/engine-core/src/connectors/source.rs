use crate::error::SourceError;
use async_trait::async_trait;
use connectors::{
    file::csv::source::{CsvOptions, CsvRecordReader},
    sql::postgres::{reader::PgPageReader, utils::connect_client},
};
use model::{pagination::partition::Partition, records::record::Record};
use std::{fmt::Display, path::PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Postgres,
}

impl Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Csv => write!(f, "CSV"),
            DataFormat::Postgres => write!(f, "Postgres"),
        }
    }
}

/// A lazy, finite, single-pass sequence of records.
#[async_trait]
pub trait RecordSource: Send {
    /// Next record, or `Ok(None)` once the sequence is exhausted.
    async fn next(&mut self) -> Result<Option<Record>, SourceError>;
}

/// Opens a fresh source scoped to one partition.
#[async_trait]
pub trait SourceFactory: Send + Sync {
    async fn open(&self, partition: &Partition) -> Result<Box<dyn RecordSource>, SourceError>;

    fn format(&self) -> DataFormat;

    /// Human-readable location, for logs and reports.
    fn describe(&self) -> String;
}

#[async_trait]
impl<R> RecordSource for CsvRecordReader<R>
where
    R: std::io::Read + Send,
{
    async fn next(&mut self) -> Result<Option<Record>, SourceError> {
        Ok(self.read_next()?)
    }
}

#[async_trait]
impl RecordSource for PgPageReader {
    async fn next(&mut self) -> Result<Option<Record>, SourceError> {
        Ok(self.read_next().await?)
    }
}

/// Delimited file source. The whole file is one partition.
pub struct CsvSourceFactory {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSourceFactory {
    pub fn new(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

#[async_trait]
impl SourceFactory for CsvSourceFactory {
    async fn open(&self, _partition: &Partition) -> Result<Box<dyn RecordSource>, SourceError> {
        let reader = CsvRecordReader::open(&self.path, &self.options)?;
        Ok(Box::new(reader))
    }

    fn format(&self) -> DataFormat {
        DataFormat::Csv
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Table source read in key order, restricted to each partition's range.
pub struct PgTableSourceFactory {
    url: String,
    table: String,
    key_column: String,
    fetch_size: usize,
}

impl PgTableSourceFactory {
    pub fn new(
        url: impl Into<String>,
        table: impl Into<String>,
        key_column: impl Into<String>,
        fetch_size: usize,
    ) -> Self {
        Self {
            url: url.into(),
            table: table.into(),
            key_column: key_column.into(),
            fetch_size,
        }
    }
}

#[async_trait]
impl SourceFactory for PgTableSourceFactory {
    async fn open(&self, partition: &Partition) -> Result<Box<dyn RecordSource>, SourceError> {
        info!(
            table = %self.table,
            partition = partition.index,
            min = partition.min_key,
            max = partition.max_key,
            "Reading {} to {}",
            partition.min_key,
            partition.max_key
        );
        let client = connect_client(&self.url).await?;
        let reader = PgPageReader::new(
            client,
            &self.table,
            &self.key_column,
            partition,
            self.fetch_size,
        )
        .await?;
        Ok(Box::new(reader))
    }

    fn format(&self) -> DataFormat {
        DataFormat::Postgres
    }

    fn describe(&self) -> String {
        format!("table {}", self.table)
    }
}

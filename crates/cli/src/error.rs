use connectors::sql::error::ConnectorError;
use engine_config::error::ConfigError;
use engine_core::error::PartitionError;
use engine_runtime::error::MigrationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to write output file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid job configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build the job: {0}")]
    Runner(#[from] MigrationError),

    #[error("Failed to compute partitions: {0}")]
    Partition(#[from] PartitionError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Connection failed: {0}")]
    Connector(#[from] ConnectorError),

    /// PostgreSQL driver error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

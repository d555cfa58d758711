use crate::error::PartitionError;
use async_trait::async_trait;
use connectors::sql::postgres::{bounds::fetch_key_bounds, utils::connect_client};

/// Reports the observed key domain of a table.
#[async_trait]
pub trait KeyRangeProbe: Send + Sync {
    /// `(MIN(column), MAX(column))`, or `None` for an empty table.
    async fn key_bounds(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Option<(i64, i64)>, PartitionError>;
}

/// Opens a short-lived connection per probe.
pub struct PgKeyRangeProbe {
    url: String,
}

impl PgKeyRangeProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl KeyRangeProbe for PgKeyRangeProbe {
    async fn key_bounds(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Option<(i64, i64)>, PartitionError> {
        let client = connect_client(&self.url).await?;
        Ok(fetch_key_bounds(&client, table, column).await?)
    }
}

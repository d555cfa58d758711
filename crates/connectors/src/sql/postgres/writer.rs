use crate::sql::{
    error::DbError,
    postgres::query::{MAX_ROWS_PER_INSERT, QueryGenerator},
};
use model::records::record::Record;
use tokio_postgres::{Client, types::ToSql};
use tracing::debug;

/// Inserts whole chunks into one table, one transaction per chunk.
pub struct PgChunkWriter {
    client: Option<Client>,
    table: String,
}

impl PgChunkWriter {
    pub fn new(client: Client, table: &str) -> Result<Self, DbError> {
        // validate once up front so write errors are about data, not names
        QueryGenerator::new(table, "id")?;
        Ok(PgChunkWriter {
            client: Some(client),
            table: table.to_string(),
        })
    }

    /// Writes all `records` or none of them. Statements are split to stay
    /// under the bind-parameter limit but share a single transaction; any
    /// error drops the transaction, which rolls it back.
    pub async fn write_chunk(&mut self, records: &[Record]) -> Result<u64, DbError> {
        if records.is_empty() {
            return Ok(0);
        }
        let client = self.client.as_mut().ok_or(DbError::Closed)?;
        let generator = QueryGenerator::new(&self.table, "id")?;

        let tx = client.transaction().await?;
        for part in records.chunks(MAX_ROWS_PER_INSERT) {
            let sql = generator.insert_rows(part.len());
            let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(part.len() * 5);
            for record in part {
                params.push(&record.id);
                params.push(&record.first_name);
                params.push(&record.last_name);
                params.push(&record.email);
                params.push(&record.phone);
            }
            tx.execute(sql.as_str(), &params).await?;
        }
        tx.commit().await?;

        debug!(table = %self.table, rows = records.len(), "Committed chunk");
        Ok(records.len() as u64)
    }

    /// Releases the connection. Further writes fail with `DbError::Closed`.
    pub fn close(&mut self) {
        self.client.take();
    }
}

use crate::sql::{error::DbError, postgres::query::QueryGenerator};
use model::{pagination::partition::Partition, records::record::Record};
use std::collections::VecDeque;
use tokio_postgres::{Client, Row, Statement};
use tracing::debug;

/// Keyset-paginated reader over one partition's key range.
///
/// Pages are fetched in ascending key order, `fetch_size` rows at a time;
/// each page starts just past the last key of the previous one. Only one
/// page is held in memory.
pub struct PgPageReader {
    client: Client,
    statement: Statement,
    next_key: Option<i64>,
    max_key: i64,
    fetch_size: i64,
    page: VecDeque<Record>,
    pages_fetched: u64,
}

impl PgPageReader {
    pub async fn new(
        client: Client,
        table: &str,
        key_column: &str,
        partition: &Partition,
        fetch_size: usize,
    ) -> Result<Self, DbError> {
        let sql = QueryGenerator::new(table, key_column)?.select_page();
        let statement = client.prepare(&sql).await?;

        Ok(PgPageReader {
            client,
            statement,
            next_key: Some(partition.min_key),
            max_key: partition.max_key,
            fetch_size: fetch_size.max(1) as i64,
            page: VecDeque::new(),
            pages_fetched: 0,
        })
    }

    pub async fn read_next(&mut self) -> Result<Option<Record>, DbError> {
        if self.page.is_empty() {
            self.fetch_page().await?;
        }
        Ok(self.page.pop_front())
    }

    async fn fetch_page(&mut self) -> Result<(), DbError> {
        let Some(from) = self.next_key else {
            return Ok(());
        };

        let rows = self
            .client
            .query(&self.statement, &[&from, &self.max_key, &self.fetch_size])
            .await?;
        self.pages_fetched += 1;

        debug!(
            from,
            to = self.max_key,
            rows = rows.len(),
            page = self.pages_fetched,
            "Fetched page"
        );

        let mut last_key = None;
        for row in &rows {
            let (key, record) = Self::decode(row)?;
            last_key = Some(key);
            self.page.push_back(record);
        }

        // A short page means the range is drained.
        self.next_key = match last_key {
            Some(key) if (rows.len() as i64) == self.fetch_size && key < self.max_key => {
                Some(key + 1)
            }
            _ => None,
        };
        Ok(())
    }

    fn decode(row: &Row) -> Result<(i64, Record), DbError> {
        let key: i64 = row.try_get(0)?;
        let record = Record {
            id: row.try_get(1)?,
            first_name: row.try_get(2)?,
            last_name: row.try_get(3)?,
            email: row.try_get(4)?,
            phone: row.try_get(5)?,
        };
        Ok((key, record))
    }
}

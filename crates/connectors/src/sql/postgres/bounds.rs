use crate::sql::{error::DbError, postgres::query::QueryGenerator};
use tokio_postgres::Client;
use tracing::debug;

/// Reads `MIN(key)` and `MAX(key)`. `None` when the table is empty.
pub async fn fetch_key_bounds(
    client: &Client,
    table: &str,
    key_column: &str,
) -> Result<Option<(i64, i64)>, DbError> {
    let sql = QueryGenerator::new(table, key_column)?.key_bounds();
    let row = client.query_one(&sql, &[]).await?;
    let min: Option<i64> = row.try_get(0)?;
    let max: Option<i64> = row.try_get(1)?;
    debug!(table, key_column, ?min, ?max, "Fetched key bounds");

    Ok(min.zip(max))
}

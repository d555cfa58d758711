use crate::error::CliError;
use async_trait::async_trait;
use connectors::sql::postgres::utils::{connect_client, redact_url};
use tracing::{error, info};

/// Round-trip check against a configured endpoint.
#[async_trait]
pub trait ConnectionPinger {
    async fn ping(&self) -> Result<(), CliError>;
}

/// Connects with the same TLS rules the engine uses and runs `SELECT 1`.
pub struct PostgresConnectionPinger {
    pub url: String,
}

#[async_trait]
impl ConnectionPinger for PostgresConnectionPinger {
    async fn ping(&self) -> Result<(), CliError> {
        let target = redact_url(&self.url);
        info!("Pinging Postgres at '{target}'");

        let client = connect_client(&self.url).await.map_err(|e| {
            error!("Postgres connection to '{target}' failed: {e}");
            CliError::Connector(e)
        })?;

        let row = client.query_one("SELECT 1", &[]).await.map_err(|e| {
            error!("Postgres ping query on '{target}' failed: {e}");
            CliError::Postgres(e)
        })?;

        let val: i32 = row.get(0);
        if val != 1 {
            let msg = format!("Postgres ping to '{target}' returned unexpected result: {val}");
            error!("{msg}");
            return Err(CliError::Unexpected(msg));
        }

        info!("Postgres ping to '{target}' succeeded");
        Ok(())
    }
}

#![allow(dead_code)]

use connectors::sql::postgres::utils::connect_client;
use std::env;
use tokio_postgres::Client;

pub mod memory;
pub mod utils;

/// Connection string for the live database tests. They are `#[ignore]`d and
/// only run when this variable points at a disposable database.
const TEST_PG_URL_VAR: &str = "COPYBASE_TEST_PG_URL";

fn test_pg_url() -> String {
    env::var(TEST_PG_URL_VAR)
        .unwrap_or_else(|_| panic!("{TEST_PG_URL_VAR} must be set for database tests"))
}

async fn pg_client() -> Client {
    connect_client(&test_pg_url()).await.expect("connect postgres")
}

/// Drop & recreate the given client-shaped tables so each test starts empty.
async fn reset_client_tables(tables: &[&str]) {
    let client = pg_client().await;
    for table in tables {
        client
            .batch_execute(&format!(
                r#"
                DROP TABLE IF EXISTS {table};
                CREATE TABLE {table} (
                    id BIGINT PRIMARY KEY,
                    firstName TEXT,
                    lastName TEXT,
                    email TEXT,
                    phone TEXT
                );
            "#
            ))
            .await
            .expect("reset client table");
    }
}

use crate::sql::{error::DbError, ident::checked_identifier};

/// Postgres caps a statement at 65535 bind parameters; five per row.
pub const MAX_ROWS_PER_INSERT: usize = 13_000;

const RECORD_COLUMNS: &str = "id, firstName, lastName, email, phone";

/// Builds the statements used to read, bound and write the client table.
pub struct QueryGenerator<'a> {
    table: &'a str,
    key_column: &'a str,
}

impl<'a> QueryGenerator<'a> {
    pub fn new(table: &'a str, key_column: &'a str) -> Result<Self, DbError> {
        Ok(Self {
            table: checked_identifier(table)?,
            key_column: checked_identifier(key_column)?,
        })
    }

    pub fn key_bounds(&self) -> String {
        format!(
            "SELECT MIN({key})::bigint, MAX({key})::bigint FROM {table}",
            key = self.key_column,
            table = self.table
        )
    }

    /// One keyset page: `$1` lower key (inclusive), `$2` upper key
    /// (inclusive), `$3` page size. The key is selected first.
    pub fn select_page(&self) -> String {
        format!(
            "SELECT {key}::bigint, id::bigint, firstName::text, lastName::text, email::text, phone::text \
             FROM {table} \
             WHERE {key} >= $1::bigint AND {key} <= $2::bigint \
             ORDER BY {key} ASC \
             LIMIT $3::bigint",
            key = self.key_column,
            table = self.table
        )
    }

    /// Multi-row insert for `rows` records with sequential placeholders.
    pub fn insert_rows(&self, rows: usize) -> String {
        let mut sql = format!("INSERT INTO {} ({RECORD_COLUMNS}) VALUES ", self.table);
        for row in 0..rows {
            if row > 0 {
                sql.push_str(", ");
            }
            let base = row * 5;
            sql.push_str(&format!(
                "(${}::bigint, ${}::text, ${}::text, ${}::text, ${}::text)",
                base + 1,
                base + 2,
                base + 3,
                base + 4,
                base + 5
            ));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_is_range_scoped_and_ordered() {
        let generator = QueryGenerator::new("client", "id").unwrap();
        let sql = generator.select_page();
        assert!(sql.contains("WHERE id >= $1::bigint AND id <= $2::bigint"));
        assert!(sql.contains("ORDER BY id ASC"));
        assert!(sql.ends_with("LIMIT $3::bigint"));
    }

    #[test]
    fn insert_numbers_placeholders_per_row() {
        let generator = QueryGenerator::new("public.client", "id").unwrap();
        let sql = generator.insert_rows(2);
        assert_eq!(
            sql,
            "INSERT INTO public.client (id, firstName, lastName, email, phone) VALUES \
             ($1::bigint, $2::text, $3::text, $4::text, $5::text), \
             ($6::bigint, $7::text, $8::text, $9::text, $10::text)"
        );
    }

    #[test]
    fn rejects_unsafe_names() {
        assert!(QueryGenerator::new("client; drop table x", "id").is_err());
        assert!(QueryGenerator::new("client", "id)").is_err());
    }

    #[test]
    fn bounds_query() {
        let generator = QueryGenerator::new("client", "id").unwrap();
        assert_eq!(
            generator.key_bounds(),
            "SELECT MIN(id)::bigint, MAX(id)::bigint FROM client"
        );
    }
}

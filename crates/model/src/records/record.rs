use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names in the order they appear in files and insert statements.
pub const COLUMNS: [&str; 5] = ["id", "firstName", "lastName", "email", "phone"];

/// A single client row moving through a step.
///
/// `id` is the identity and the key used for range partitioning. String
/// fields are optional: a database column may be NULL, while an empty
/// CSV cell is read as `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Record {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Record {
            id: Some(id),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            email: Some(email.into()),
            phone: Some(phone.into()),
        }
    }

    /// Returns a copy of this record with the name and email fields passed
    /// through `f`. `phone` is carried over as-is; absent fields stay absent.
    pub fn map_names<F>(&self, f: F) -> Record
    where
        F: Fn(&str) -> String,
    {
        Record {
            id: self.id,
            first_name: self.first_name.as_deref().map(&f),
            last_name: self.last_name.as_deref().map(&f),
            email: self.email.as_deref().map(&f),
            phone: self.phone.clone(),
        }
    }

    /// Approximate in-memory size, used for throughput logging.
    pub fn size_bytes(&self) -> usize {
        let text = |s: &Option<String>| s.as_ref().map_or(0, |s| s.len());
        std::mem::size_of::<i64>()
            + text(&self.first_name)
            + text(&self.last_name)
            + text(&self.email)
            + text(&self.phone)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |s: &Option<String>| s.clone().unwrap_or_else(|| "null".to_string());
        let id = self
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "null".to_string());
        write!(
            f,
            "Record(id={id}, firstName={}, lastName={}, email={}, phone={})",
            text(&self.first_name),
            text(&self.last_name),
            text(&self.email),
            text(&self.phone)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_names_keeps_id_phone_and_absent_fields() {
        let record = Record {
            id: Some(7),
            first_name: Some("ann".into()),
            last_name: None,
            email: Some("a@x".into()),
            phone: Some("555 ext 12".into()),
        };

        let mapped = record.map_names(|s| s.to_uppercase());

        assert_eq!(mapped.id, Some(7));
        assert_eq!(mapped.first_name.as_deref(), Some("ANN"));
        assert_eq!(mapped.last_name, None);
        assert_eq!(mapped.email.as_deref(), Some("A@X"));
        assert_eq!(mapped.phone.as_deref(), Some("555 ext 12"));
        // source value untouched
        assert_eq!(record.first_name.as_deref(), Some("ann"));
    }

    #[test]
    fn display_marks_nulls() {
        let record = Record {
            id: None,
            ..Record::default()
        };
        assert!(record.to_string().starts_with("Record(id=null"));
    }
}

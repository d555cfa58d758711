use model::execution::failure::{FailureDetail, FailureKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A field the strategy cannot work without was absent.
    #[error("Required field '{field}' is missing")]
    MissingField { field: &'static str },
}

impl TransformError {
    pub fn failure(&self, record_id: Option<i64>) -> FailureDetail {
        FailureDetail::new(FailureKind::Transform, self.to_string()).for_record(record_id)
    }
}

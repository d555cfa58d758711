use crate::transform::{
    case::{Identity, LowerCase, UpperCase, require_key},
    error::TransformError,
};
use engine_config::settings::TransformKind;
use model::records::record::Record;
use std::sync::Arc;

/// A pure per-record mapping. Implementations hold no mutable state and
/// may be shared across workers.
pub trait Transform: Send + Sync {
    fn apply(&self, record: &Record) -> Result<Record, TransformError>;

    fn name(&self) -> &'static str;
}

/// Ordered composition of transforms. An empty pipeline passes records
/// through unchanged, still enforcing the key requirement.
#[derive(Clone)]
pub struct TransformPipeline {
    transforms: Vec<Arc<dyn Transform>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Resolves configured strategy names once, at step build time.
    pub fn from_kinds(kinds: &[TransformKind]) -> Self {
        kinds.iter().fold(Self::new(), |pipeline, kind| match kind {
            TransformKind::UpperCase => pipeline.add_transform(UpperCase),
            TransformKind::LowerCase => pipeline.add_transform(LowerCase),
            TransformKind::Identity => pipeline.add_transform(Identity),
        })
    }

    pub fn add_transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        require_key(record)?;
        self.transforms
            .iter()
            .try_fold(record.clone(), |acc, transform| transform.apply(&acc))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> Record {
        Record::new(1, "Ann", "Lee", "A@x", "555")
    }

    #[test]
    fn empty_pipeline_is_pass_through() {
        let pipeline = TransformPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(&ann()).unwrap(), ann());
    }

    #[test]
    fn transforms_run_in_order() {
        let upper_then_lower = TransformPipeline::from_kinds(&[
            TransformKind::UpperCase,
            TransformKind::LowerCase,
        ]);
        let out = upper_then_lower.apply(&ann()).unwrap();
        assert_eq!(out.first_name.as_deref(), Some("ann"));
        assert_eq!(upper_then_lower.names(), vec!["upper_case", "lower_case"]);

        let lower_then_upper = TransformPipeline::from_kinds(&[
            TransformKind::LowerCase,
            TransformKind::UpperCase,
        ]);
        let out = lower_then_upper.apply(&ann()).unwrap();
        assert_eq!(out.first_name.as_deref(), Some("ANN"));
    }

    #[test]
    fn missing_key_fails_even_without_transforms() {
        let record = Record {
            id: None,
            ..ann()
        };
        let err = TransformPipeline::new().apply(&record).unwrap_err();
        assert_eq!(err, TransformError::MissingField { field: "id" });
    }
}

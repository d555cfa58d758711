use crate::transform::{error::TransformError, pipeline::Transform};
use model::records::record::Record;
use tracing::trace;

/// `id` joins the written row to everything downstream, so no strategy
/// may emit a record without it.
pub(crate) fn require_key(record: &Record) -> Result<i64, TransformError> {
    record
        .id
        .ok_or(TransformError::MissingField { field: "id" })
}

/// Upper-cases the name and email fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperCase;

/// Lower-cases the name and email fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerCase;

#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for UpperCase {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        require_key(record)?;
        trace!("Converting ({record})");
        Ok(record.map_names(str::to_uppercase))
    }

    fn name(&self) -> &'static str {
        "upper_case"
    }
}

impl Transform for LowerCase {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        require_key(record)?;
        trace!("Converting ({record})");
        Ok(record.map_names(str::to_lowercase))
    }

    fn name(&self) -> &'static str {
        "lower_case"
    }
}

impl Transform for Identity {
    fn apply(&self, record: &Record) -> Result<Record, TransformError> {
        require_key(record)?;
        Ok(record.clone())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Record> {
        vec![
            Record::new(1, "ann", "lee", "a@x", "555"),
            Record::new(2, "Bo", "KIM", "b@X.org", "+1 (556) ext"),
            Record::new(3, "", "", "", ""),
            Record::new(4, "straße", "Øre", "ǅ@x", "557"),
            Record {
                id: Some(5),
                first_name: None,
                last_name: Some("doe".into()),
                email: None,
                phone: None,
            },
        ]
    }

    #[test]
    fn upper_case_changes_strings_only() {
        let out = UpperCase
            .apply(&Record::new(1, "ann", "lee", "a@x", "555 ext 12"))
            .unwrap();
        assert_eq!(out, Record::new(1, "ANN", "LEE", "A@X", "555 ext 12"));
    }

    #[test]
    fn lower_case_leaves_phone_alone() {
        let out = LowerCase
            .apply(&Record::new(2, "Bo", "KIM", "B@X.org", "+1 556 EXT 9"))
            .unwrap();
        assert_eq!(out, Record::new(2, "bo", "kim", "b@x.org", "+1 556 EXT 9"));
    }

    #[test]
    fn upper_case_is_idempotent() {
        for record in samples() {
            let once = UpperCase.apply(&record).unwrap();
            let twice = UpperCase.apply(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {record}");
        }
    }

    #[test]
    fn lower_case_is_idempotent() {
        for record in samples() {
            let once = LowerCase.apply(&record).unwrap();
            assert_eq!(once, LowerCase.apply(&once).unwrap());
        }
    }

    #[test]
    fn absent_fields_stay_absent() {
        let record = &samples()[4];
        let out = UpperCase.apply(record).unwrap();
        assert_eq!(out.first_name, None);
        assert_eq!(out.last_name.as_deref(), Some("DOE"));
    }

    #[test]
    fn input_is_not_mutated() {
        let record = Record::new(1, "ann", "lee", "a@x", "555");
        let _ = UpperCase.apply(&record).unwrap();
        assert_eq!(record.first_name.as_deref(), Some("ann"));
    }

    #[test]
    fn every_strategy_requires_id() {
        let record = Record {
            id: None,
            first_name: Some("ann".into()),
            ..Record::default()
        };
        let strategies: [&dyn Transform; 3] = [&UpperCase, &LowerCase, &Identity];
        for strategy in strategies {
            assert_eq!(
                strategy.apply(&record),
                Err(TransformError::MissingField { field: "id" }),
                "{} accepted a record without id",
                strategy.name()
            );
        }
    }
}

use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

fn default_delimiter() -> char {
    ','
}

fn default_key_column() -> String {
    "id".to_string()
}

/// One read-transform-write stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    pub name: String,
    pub source: SourceConfig,
    /// Applied in order; empty means pass-through.
    #[serde(default)]
    pub transforms: Vec<TransformKind>,
    pub target: TargetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum SourceConfig {
    /// Delimited file, always a single partition.
    Csv {
        path: PathBuf,
        #[serde(default = "default_delimiter")]
        delimiter: char,
        #[serde(default)]
        has_header: bool,
    },
    /// Table split into key ranges.
    Table {
        connection: String,
        table: String,
        #[serde(default = "default_key_column")]
        key_column: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub connection: String,
    pub table: String,
}

/// Per-record transform strategies, resolved once when the step is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    UpperCase,
    LowerCase,
    Identity,
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::UpperCase => f.write_str("upper_case"),
            TransformKind::LowerCase => f.write_str("lower_case"),
            TransformKind::Identity => f.write_str("identity"),
        }
    }
}

impl SourceConfig {
    pub fn is_partitioned(&self) -> bool {
        matches!(self, SourceConfig::Table { .. })
    }

    pub fn connection(&self) -> Option<&str> {
        match self {
            SourceConfig::Csv { .. } => None,
            SourceConfig::Table { connection, .. } => Some(connection),
        }
    }
}

use engine_config::error::ConfigError;
use thiserror::Error;

/// Errors raised while assembling a job. Once a job is running, failures
/// are reported through results instead.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A step refers to a connection that is not defined.
    #[error("Step '{step}' references unknown connection '{connection}'")]
    UnknownConnection { step: String, connection: String },

    /// CSV delimiters must fit in a single byte.
    #[error("Step '{step}' has a delimiter that is not a single byte: {delimiter:?}")]
    InvalidDelimiter { step: String, delimiter: char },

    #[error("Unknown step '{0}'")]
    UnknownStep(String),
}

use thiserror::Error;

/// Errors raised while loading or validating a job configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid env file '{path}' at line {line}: {reason}")]
    EnvFile {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Unresolved variable in configuration: ${{{0}}}")]
    UnresolvedVariable(String),

    #[error("Configuration is invalid:\n  - {}", .0.join("\n  - "))]
    ValidationFailed(Vec<String>),
}

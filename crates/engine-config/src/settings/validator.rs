use crate::{
    error::ConfigError,
    settings::{JobConfig, SourceConfig, StepConfig},
};
use connectors::sql::ident::is_valid_identifier;
use std::collections::HashSet;
use tracing::warn;

/// Checks a job configuration, collecting every problem before failing.
pub struct ConfigValidator<'a> {
    config: &'a JobConfig,
    errors: Vec<String>,
}

impl<'a> ConfigValidator<'a> {
    pub fn new(config: &'a JobConfig) -> Self {
        Self {
            config,
            errors: Vec::new(),
        }
    }

    pub fn validate(mut self) -> Result<(), ConfigError> {
        self.validate_sizes();
        self.validate_retry();
        self.validate_steps();

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationFailed(self.errors))
        }
    }

    fn validate_sizes(&mut self) {
        let c = self.config;
        for (field, value) in [
            ("chunk_size", c.chunk_size),
            ("partition_count", c.partition_count),
            ("worker_pool_size", c.worker_pool_size),
            ("fetch_size", c.fetch_size),
        ] {
            if value == 0 {
                self.errors.push(format!("{field} must be at least 1"));
            }
        }

        if c.chunk_size > 100_000 {
            warn!(
                "Chunk size {} is very large, may cause memory issues",
                c.chunk_size
            );
        }
        if c.partition_count > 0 && c.partition_count < c.worker_pool_size {
            warn!(
                partition_count = c.partition_count,
                worker_pool_size = c.worker_pool_size,
                "Fewer partitions than workers, some workers will stay idle"
            );
        }
    }

    fn validate_retry(&mut self) {
        if let Some(retry) = &self.config.write_retry
            && retry.max_attempts == 0
        {
            self.errors
                .push("write_retry.max_attempts must be at least 1".to_string());
        }
    }

    fn validate_steps(&mut self) {
        let config = self.config;
        if config.steps.is_empty() {
            self.errors.push("at least one step is required".to_string());
        }

        let mut seen = HashSet::new();
        for step in &config.steps {
            if step.name.trim().is_empty() {
                self.errors.push("step name must not be empty".to_string());
            } else if !seen.insert(step.name.as_str()) {
                self.errors
                    .push(format!("duplicate step name '{}'", step.name));
            }
            self.validate_step(step);
        }
    }

    fn validate_step(&mut self, step: &StepConfig) {
        match &step.source {
            SourceConfig::Csv {
                path, delimiter, ..
            } => {
                if path.as_os_str().is_empty() {
                    self.errors
                        .push(format!("step '{}': source path is empty", step.name));
                }
                if !delimiter.is_ascii() || *delimiter == '\n' || *delimiter == '\r' {
                    self.errors.push(format!(
                        "step '{}': delimiter {delimiter:?} must be a single ASCII character other than a line break",
                        step.name
                    ));
                }
            }
            SourceConfig::Table {
                connection,
                table,
                key_column,
            } => {
                self.check_connection(step, connection);
                self.check_identifier(step, "source table", table);
                self.check_identifier(step, "key column", key_column);
            }
        }

        self.check_connection(step, &step.target.connection);
        self.check_identifier(step, "target table", &step.target.table);
    }

    fn check_connection(&mut self, step: &StepConfig, name: &str) {
        if !self.config.connections.contains_key(name) {
            self.errors.push(format!(
                "step '{}': unknown connection '{name}'",
                step.name
            ));
        }
    }

    fn check_identifier(&mut self, step: &StepConfig, what: &str, name: &str) {
        if !is_valid_identifier(name) {
            self.errors.push(format!(
                "step '{}': {what} '{name}' is not a plain SQL identifier",
                step.name
            ));
        }
    }
}

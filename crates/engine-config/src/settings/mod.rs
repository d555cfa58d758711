use crate::{env::EnvVars, error::ConfigError};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use tracing::info;

pub mod step;
pub mod validator;

pub use step::{SourceConfig, StepConfig, TargetConfig, TransformKind};

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_WORKER_POOL_SIZE: usize = 4;
pub const DEFAULT_PARTITION_COUNT: usize = 4;
pub const DEFAULT_FETCH_SIZE: usize = 1_000;

fn default_job_name() -> String {
    "copy_job".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_worker_pool_size() -> usize {
    DEFAULT_WORKER_POOL_SIZE
}

fn default_partition_count() -> usize {
    DEFAULT_PARTITION_COUNT
}

fn default_fetch_size() -> usize {
    DEFAULT_FETCH_SIZE
}

/// A whole job: shared tuning knobs, named connections and ordered steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default = "default_job_name")]
    pub name: String,

    /// Records per write transaction.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Upper bound on key ranges per table step.
    #[serde(default = "default_partition_count")]
    pub partition_count: usize,

    /// Partitions executed concurrently.
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Rows per page when reading a table.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,

    #[serde(default)]
    pub write_retry: Option<RetryConfig>,

    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,

    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: usize,
    #[serde(default = "RetryConfig::default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "RetryConfig::default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl RetryConfig {
    fn default_base_delay_ms() -> u64 {
        250
    }

    fn default_max_delay_ms() -> u64 {
        5_000
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub chunk_size: Option<usize>,
    pub partition_count: Option<usize>,
    pub worker_pool_size: Option<usize>,
}

impl JobConfig {
    /// Parses JSON text. Placeholders must already be resolved.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a job file, substitutes `${NAME}` placeholders and parses it.
    pub fn load(path: impl AsRef<Path>, env: &EnvVars) -> Result<Self, ConfigError> {
        let text = Self::read_file(path)?;
        Self::from_json(&env.interpolate(&text)?)
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<String, ConfigError> {
        let path = path.as_ref();
        std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(chunk_size) = overrides.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(count) = overrides.partition_count {
            self.partition_count = count;
        }
        if let Some(size) = overrides.worker_pool_size {
            self.worker_pool_size = size;
        }
    }

    /// Runs every check and logs the effective settings on success.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validator::ConfigValidator::new(self).validate()?;
        info!(
            job = %self.name,
            chunk_size = self.chunk_size,
            partition_count = self.partition_count,
            worker_pool_size = self.worker_pool_size,
            fetch_size = self.fetch_size,
            steps = self.steps.len(),
            "Configuration validated"
        );
        Ok(())
    }

    pub fn connection_url(&self, name: &str) -> Option<&str> {
        self.connections.get(name).map(|c| c.url.as_str())
    }

    pub fn step(&self, name: &str) -> Option<&StepConfig> {
        self.steps.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "connections": { "db": { "url": "postgres://u:p@localhost/db" } },
        "steps": [{
            "name": "import",
            "source": { "kind": "csv", "path": "clients.csv" },
            "transforms": ["upper_case"],
            "target": { "connection": "db", "table": "client" }
        }]
    }"#;

    #[test]
    fn defaults_are_filled_in() {
        let config = JobConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.chunk_size, 10_000);
        assert_eq!(config.worker_pool_size, 4);
        assert_eq!(config.partition_count, 4);
        assert_eq!(config.fetch_size, 1_000);
        assert!(config.write_retry.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn overrides_win() {
        let mut config = JobConfig::from_json(MINIMAL).unwrap();
        config.apply_overrides(&Overrides {
            chunk_size: Some(2),
            partition_count: None,
            worker_pool_size: Some(8),
        });
        assert_eq!(config.chunk_size, 2);
        assert_eq!(config.partition_count, 4);
        assert_eq!(config.worker_pool_size, 8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = MINIMAL.replacen("\"connections\"", "\"chunksize\": 5, \"connections\"", 1);
        assert!(matches!(JobConfig::from_json(&text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            JobConfig::read_file("/no/such/job.json"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn load_interpolates_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, MINIMAL.replace("postgres://u:p@localhost/db", "${DB_URL}")).unwrap();

        let mut env = EnvVars::empty();
        env.set("DB_URL", "host=db user=copy");
        let config = JobConfig::load(&path, &env).unwrap();
        assert_eq!(config.connection_url("db"), Some("host=db user=copy"));

        assert!(matches!(
            JobConfig::load(&path, &EnvVars::empty()),
            Err(ConfigError::UnresolvedVariable(name)) if name == "DB_URL"
        ));
    }
}

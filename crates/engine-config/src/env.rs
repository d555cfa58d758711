use crate::error::ConfigError;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

/// Variables available to `${NAME}` placeholders: the process environment,
/// overlaid by any `.env` files loaded afterwards.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Loads `KEY=VALUE` lines from a `.env` file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let loaded = self
            .parse_env_content(&content)
            .map_err(|(line, reason)| ConfigError::EnvFile {
                path: path.display().to_string(),
                line,
                reason,
            })?;
        debug!(path = %path.display(), loaded, "Loaded env file");
        Ok(())
    }

    fn parse_env_content(&mut self, content: &str) -> Result<usize, (usize, String)> {
        let mut loaded = 0;
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err((idx + 1, "expected KEY=VALUE".to_string()));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err((idx + 1, "empty key".to_string()));
            }
            self.vars.insert(key.to_string(), unquote(value.trim()).to_string());
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Replaces every `${NAME}` in `text`. A placeholder without a value,
    /// or one that is never closed, is an error.
    pub fn interpolate(&self, text: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                return Err(ConfigError::UnresolvedVariable(after.to_string()));
            };
            let name = &after[..end];
            let value = self
                .get(name)
                .ok_or_else(|| ConfigError::UnresolvedVariable(name.to_string()))?;
            out.push_str(value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

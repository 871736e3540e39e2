//! Process configuration.
//!
//! Settings come from an optional TOML file (`jobly.toml` by default), with
//! `${VAR}` references expanded from the environment, and are then overridden
//! by environment variables:
//!
//! | variable                   | setting                     |
//! |----------------------------|-----------------------------|
//! | `JOBLY_ENV`                | `env`                       |
//! | `DATABASE_URL`             | `database.url`              |
//! | `JOBLY_DB_MAX_CONNECTIONS` | `database.max_connections`  |
//! | `JOBLY_LOG`                | `log.filter`                |
//!
//! ```toml
//! env = "development"
//!
//! [database]
//! url = "postgres://${PGUSER}@localhost/jobly"
//! max_connections = 8
//!
//! [log]
//! filter = "jobly=debug"
//! log_sql = true
//! ```

use crate::error::{JobError, JobResult};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "jobly.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(s: &str) -> JobResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(JobError::Config(format!("unknown environment: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Full connection URL; derived from `env` when unset.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    16
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing-subscriber` env-filter directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log every statement through `LoggedClient`.
    #[serde(default)]
    pub log_sql: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            log_sql: false,
        }
    }
}

impl Settings {
    /// Load settings from `path` (or `jobly.toml` if it exists), `.env` and the
    /// process environment.
    pub fn load(path: Option<&Path>) -> JobResult<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let file = match path {
            Some(p) => Some(p),
            None if default_path.exists() => Some(default_path),
            None => None,
        };

        let mut settings = match file {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    JobError::Config(format!("failed to read config file {}: {e}", p.display()))
                })?;
                Self::from_toml_str(&raw, |k| std::env::var(k).ok()).map_err(|e| {
                    JobError::Config(format!("failed to parse config file {}: {e}", p.display()))
                })?
            }
            None => Self::default(),
        };

        settings.apply_env(|k| std::env::var(k).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse TOML, expanding `${VAR}` references through `lookup`.
    pub fn from_toml_str(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> JobResult<Self> {
        let mut settings: Settings =
            toml::from_str(raw).map_err(|e| JobError::Config(e.to_string()))?;
        if let Some(url) = settings.database.url.as_mut() {
            *url = expand_env_vars(url, &lookup)?;
        }
        settings.log.filter = expand_env_vars(&settings.log.filter, &lookup)?;
        Ok(settings)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> JobResult<()> {
        if let Some(env) = lookup("JOBLY_ENV") {
            self.env = Environment::parse(&env)?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(max) = lookup("JOBLY_DB_MAX_CONNECTIONS") {
            self.database.max_connections = max.trim().parse().map_err(|_| {
                JobError::Config(format!("JOBLY_DB_MAX_CONNECTIONS is not a number: {max}"))
            })?;
        }
        if let Some(filter) = lookup("JOBLY_LOG") {
            self.log.filter = filter;
        }
        Ok(())
    }

    fn validate(&self) -> JobResult<()> {
        if self.database.max_connections == 0 {
            return Err(JobError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if matches!(&self.database.url, Some(url) if url.trim().is_empty()) {
            return Err(JobError::Config("database.url must not be empty".to_string()));
        }
        Ok(())
    }

    /// The configured URL, or the local socket database for this environment.
    pub fn database_url(&self) -> String {
        match &self.database.url {
            Some(url) => url.clone(),
            None if self.env == Environment::Test => "postgresql:///jobly_test".to_string(),
            None => "postgresql:///jobly".to_string(),
        }
    }
}

fn expand_env_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> JobResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(JobError::Config(format!(
                    "unterminated env var reference: ${{{key}}}"
                )));
            }
            if key.is_empty() {
                return Err(JobError::Config("invalid env var reference: ${}".to_string()));
            }

            let v = lookup(&key).ok_or_else(|| {
                JobError::Config(format!("missing env var for config expansion: {key}"))
            })?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

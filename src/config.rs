use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::clickhouse_query_generator::HogQLSettings;
use crate::events_query::date_parse::parse_date_bound;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    MissingEnvVar(String),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Limits and defaults applied when assembling and running events queries
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
#[validate(schema(function = "validate_limits"))]
pub struct QueryConfig {
    /// Rows returned when the request sets no limit
    #[validate(range(min = 1, message = "Default limit must be at least 1"))]
    pub default_limit: i64,

    /// Hard cap on the requested limit (the lookahead row comes on top)
    #[validate(range(
        min = 1,
        max = 1_000_000,
        message = "Maximum limit must be between 1 and 1000000"
    ))]
    pub maximum_limit: i64,

    /// Lower time bound used when the request sets none
    #[validate(custom(function = "validate_date_bound"))]
    pub default_after: String,

    /// How far past "now" the default upper bound reaches, to tolerate clock skew
    #[validate(range(
        min = 0,
        max = 3600,
        message = "Before skew must be between 0 and 3600 seconds"
    ))]
    pub before_skew_seconds: i64,

    /// ClickHouse max_execution_time setting, in seconds
    #[validate(range(
        min = 1,
        max = 600,
        message = "Max execution time must be between 1 and 600 seconds"
    ))]
    pub max_execution_time: u32,

    /// ClickHouse readonly setting (1 or 2)
    #[validate(range(min = 1, max = 2, message = "Readonly must be 1 or 2"))]
    pub readonly: u32,

    /// Timezone used when the team does not set one
    #[validate(custom(function = "validate_timezone"))]
    pub timezone: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            maximum_limit: 100_000,
            default_after: "-24h".to_string(),
            before_skew_seconds: 5,
            max_execution_time: 60,
            readonly: 1,
            timezone: "UTC".to_string(),
        }
    }
}

impl QueryConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            default_limit: parse_env_var("HOGQL_DEFAULT_LIMIT", "100")?,
            maximum_limit: parse_env_var("HOGQL_MAXIMUM_LIMIT", "100000")?,
            default_after: env::var("HOGQL_DEFAULT_AFTER").unwrap_or_else(|_| "-24h".to_string()),
            before_skew_seconds: parse_env_var("HOGQL_BEFORE_SKEW_SECONDS", "5")?,
            max_execution_time: parse_env_var("HOGQL_MAX_EXECUTION_TIME", "60")?,
            readonly: parse_env_var("HOGQL_READONLY", "1")?,
            timezone: env::var("HOGQL_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply command line overrides on top of this configuration
    pub fn merge_cli(mut self, cli: CliConfig) -> Result<Self, ConfigError> {
        if let Some(default_limit) = cli.default_limit {
            self.default_limit = default_limit;
        }
        if let Some(max_execution_time) = cli.max_execution_time {
            self.max_execution_time = max_execution_time;
        }
        if let Some(timezone) = cli.timezone {
            self.timezone = timezone;
        }

        self.validate()?;
        Ok(self)
    }

    /// Settings appended to every printed ClickHouse query
    pub fn settings(&self) -> HogQLSettings {
        HogQLSettings {
            readonly: self.readonly,
            max_execution_time: self.max_execution_time,
        }
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub default_limit: Option<i64>,
    pub max_execution_time: Option<u32>,
    pub timezone: Option<String>,
}

fn validate_limits(config: &QueryConfig) -> Result<(), ValidationError> {
    if config.default_limit > config.maximum_limit {
        let mut error = ValidationError::new("default_limit_above_maximum");
        error.message = Some("Default limit cannot exceed the maximum limit".into());
        return Err(error);
    }
    Ok(())
}

fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    timezone
        .parse::<chrono_tz::Tz>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_timezone"))
}

fn validate_date_bound(value: &str) -> Result<(), ValidationError> {
    parse_date_bound(value, Utc::now())
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_date_bound"))
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

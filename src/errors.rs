use thiserror::Error;

use crate::clickhouse_query_generator::ClickhouseQueryGeneratorError;
use crate::config::ConfigError;

/// Public error type for compiling and running HogQL queries.
#[derive(Debug, Error)]
pub enum HogQLError {
    /// The input expression could not be parsed.
    #[error("Syntax error: {0}")]
    Syntax(String),
    /// The expression parsed but refers to something that is not allowed.
    #[error("{0}")]
    Validation(String),
    /// The query executor failed; the source error is passed through untouched.
    #[error(transparent)]
    Execution(Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HogQLError {
    pub fn validation(message: impl Into<String>) -> Self {
        HogQLError::Validation(message.into())
    }

    pub fn execution(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        HogQLError::Execution(Box::new(source))
    }
}

impl From<ClickhouseQueryGeneratorError> for HogQLError {
    fn from(err: ClickhouseQueryGeneratorError) -> Self {
        HogQLError::Validation(err.to_string())
    }
}

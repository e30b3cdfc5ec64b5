use std::env;

use clickhouse::Client;

use crate::config::ConfigError;

fn read_env_var(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Build a client from `CLICKHOUSE_URL`, `CLICKHOUSE_USER`, `CLICKHOUSE_PASSWORD`
/// and `CLICKHOUSE_DATABASE`. A `.env` file is honoured if present.
pub fn try_get_client() -> Result<Client, ConfigError> {
    dotenvy::dotenv().ok();

    let url = read_env_var("CLICKHOUSE_URL")?;
    let user = read_env_var("CLICKHOUSE_USER")?;
    let password = read_env_var("CLICKHOUSE_PASSWORD")?;
    let database = read_env_var("CLICKHOUSE_DATABASE")?;

    log::info!("connecting to ClickHouse at {}", url);
    Ok(Client::default()
        .with_url(url)
        .with_user(user)
        .with_password(password)
        .with_database(database))
}

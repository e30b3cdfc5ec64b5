//! Running printed HogQL against ClickHouse.

use std::sync::Arc;

use async_trait::async_trait;
use clickhouse::Client;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;

use crate::clickhouse_query_generator::{
    print_select, DefaultPropertyResolver, HogQLSettings, PrintContext, PropertyResolver,
};
use crate::errors::HogQLError;
use crate::events_query::{HogQLQueryResult, QueryExecutor, TeamContext, Workload};
use crate::hogql_parser::ast::SelectQuery;

pub mod clickhouse_client;

pub use clickhouse_client::try_get_client;

const OUTPUT_FORMAT: &str = "JSONCompactEachRowWithNamesAndTypes";

/// [`QueryExecutor`] backed by a ClickHouse HTTP client.
#[derive(Clone)]
pub struct ClickHouseExecutor {
    client: Client,
    property_resolver: Arc<dyn PropertyResolver>,
    settings: HogQLSettings,
}

impl ClickHouseExecutor {
    pub fn new(client: Client, settings: HogQLSettings) -> Self {
        ClickHouseExecutor {
            client,
            property_resolver: Arc::new(DefaultPropertyResolver::new()),
            settings,
        }
    }

    /// Connect using the `CLICKHOUSE_*` environment variables.
    pub fn from_env(settings: HogQLSettings) -> Result<Self, HogQLError> {
        Ok(Self::new(try_get_client()?, settings))
    }

    pub fn with_property_resolver(mut self, property_resolver: Arc<dyn PropertyResolver>) -> Self {
        self.property_resolver = property_resolver;
        self
    }

    pub fn render(&self, query: &SelectQuery, team: &TeamContext) -> Result<String, HogQLError> {
        let ctx = PrintContext::new(team.team_id, self.property_resolver.as_ref())
            .with_timezone(team.timezone.as_str())
            .with_settings(self.settings);
        Ok(print_select(query, &ctx)?)
    }
}

#[async_trait]
impl QueryExecutor for ClickHouseExecutor {
    async fn execute(
        &self,
        query: &SelectQuery,
        team: &TeamContext,
        workload: Workload,
        query_type: &str,
    ) -> Result<HogQLQueryResult, HogQLError> {
        let sql = self.render(query, team)?;
        log::info!(
            "running {} for team {} on the {:?} workload",
            query_type,
            team.team_id,
            workload
        );
        log::debug!("Executing SQL:\n{}", sql);

        // `?` is the client's bind marker; literals must reach the server untouched
        let mut lines = self
            .client
            .query(&sql.replace('?', "??"))
            .fetch_bytes(OUTPUT_FORMAT)
            .map_err(|e| {
                log::error!("ClickHouse query failed. SQL was:\n{}\nError: {}", sql, e);
                HogQLError::execution(e)
            })?
            .lines();

        let mut rows = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(HogQLError::execution)? {
            rows.push(line);
        }
        parse_compact_rows(&rows)
    }
}

/// Decode `JSONCompactEachRowWithNamesAndTypes` output: a names line, a types line,
/// then one JSON array per row.
pub fn parse_compact_rows<S: AsRef<str>>(lines: &[S]) -> Result<HogQLQueryResult, HogQLError> {
    let mut decoded = lines.iter().map(|line| {
        serde_json::from_str::<Vec<Value>>(line.as_ref()).map_err(HogQLError::execution)
    });
    let (names, types) = match (decoded.next(), decoded.next()) {
        (Some(names), Some(types)) => (names?, types?),
        _ => {
            return Err(HogQLError::validation(
                "ClickHouse response is missing its names and types header",
            ))
        }
    };

    let types = names
        .into_iter()
        .zip(types)
        .map(|(name, ty)| (value_to_string(name), value_to_string(ty)))
        .collect();
    let results = decoded.collect::<Result<Vec<_>, _>>()?;
    Ok(HogQLQueryResult { results, types })
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

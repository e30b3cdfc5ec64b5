//! Seams to the systems the events query depends on but does not own.

use async_trait::async_trait;
use serde_json::Value;

use super::models::{Action, Element, Person, TeamContext, Workload};
use crate::errors::HogQLError;
use crate::hogql_parser::ast::SelectQuery;

/// Rows plus `(column name, ClickHouse type)` pairs returned by an executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HogQLQueryResult {
    pub results: Vec<Vec<Value>>,
    pub types: Vec<(String, String)>,
}

/// Runs a HogQL SELECT against the database.
///
/// Implementations print the query themselves so tenant guards and settings are
/// always applied by the same code path. Database failures are returned as
/// [`HogQLError::Execution`] and are not retried.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(
        &self,
        query: &SelectQuery,
        team: &TeamContext,
        workload: Workload,
        query_type: &str,
    ) -> Result<HogQLQueryResult, HogQLError>;
}

#[async_trait]
pub trait PersonLookup: Send + Sync {
    /// Persons owning any of `distinct_ids`, in no particular order.
    async fn get_persons_by_distinct_ids(
        &self,
        team_id: i64,
        distinct_ids: &[String],
    ) -> Result<Vec<Person>, HogQLError>;

    /// Look a person up by numeric primary key or by UUID.
    async fn get_person(&self, team_id: i64, pk_or_uuid: &str)
        -> Result<Option<Person>, HogQLError>;
}

#[async_trait]
pub trait ActionLookup: Send + Sync {
    async fn get_action(&self, id: i64, team_id: i64) -> Result<Option<Action>, HogQLError>;
}

pub trait ElementChainDecoder: Send + Sync {
    fn decode_chain(&self, elements_chain: &str) -> Vec<Element>;
}

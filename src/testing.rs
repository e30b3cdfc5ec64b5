//! In-memory collaborators for running events queries without Postgres or ClickHouse.
//!
//! The CLI uses these in sql-only mode, with actions loaded from a YAML file.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::HogQLError;
use crate::events_query::models::{Action, Person};
use crate::events_query::{
    ActionLookup, HogQLQueryResult, PersonLookup, QueryExecutor, TeamContext, Workload,
};
use crate::hogql_parser::ast::SelectQuery;

#[derive(Debug, Default)]
pub struct InMemoryPersons {
    persons: HashMap<i64, Vec<Person>>,
}

impl InMemoryPersons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_person(mut self, team_id: i64, person: Person) -> Self {
        self.persons.entry(team_id).or_default().push(person);
        self
    }

    fn team(&self, team_id: i64) -> &[Person] {
        self.persons.get(&team_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[async_trait]
impl PersonLookup for InMemoryPersons {
    async fn get_persons_by_distinct_ids(
        &self,
        team_id: i64,
        distinct_ids: &[String],
    ) -> Result<Vec<Person>, HogQLError> {
        Ok(self
            .team(team_id)
            .iter()
            .filter(|person| person.distinct_ids.iter().any(|id| distinct_ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn get_person(
        &self,
        team_id: i64,
        pk_or_uuid: &str,
    ) -> Result<Option<Person>, HogQLError> {
        Ok(self
            .team(team_id)
            .iter()
            .find(|person| {
                person.id.to_string() == pk_or_uuid || person.uuid.to_string() == pk_or_uuid
            })
            .cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryActions {
    actions: Vec<Action>,
}

impl InMemoryActions {
    pub fn new(actions: Vec<Action>) -> Self {
        InMemoryActions { actions }
    }

    /// Load a YAML list of actions.
    pub fn from_yaml(content: &str) -> Result<Self, HogQLError> {
        let actions: Vec<Action> = serde_yaml::from_str(content)
            .map_err(|e| HogQLError::validation(format!("Invalid actions file: {}", e)))?;
        Ok(Self::new(actions))
    }
}

#[async_trait]
impl ActionLookup for InMemoryActions {
    async fn get_action(&self, id: i64, team_id: i64) -> Result<Option<Action>, HogQLError> {
        Ok(self
            .actions
            .iter()
            .find(|action| action.id == id && action.team_id == team_id)
            .cloned())
    }
}

/// A query an executor was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub query: SelectQuery,
    pub team_id: i64,
    pub workload: Workload,
    pub query_type: String,
}

/// Returns a canned result and remembers every query it receives.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    result: HogQLQueryResult,
    recorded: Mutex<Vec<RecordedQuery>>,
}

impl RecordingExecutor {
    pub fn new(result: HogQLQueryResult) -> Self {
        RecordingExecutor {
            result,
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<RecordedQuery> {
        match self.recorded.lock() {
            Ok(recorded) => recorded.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(
        &self,
        query: &SelectQuery,
        team: &TeamContext,
        workload: Workload,
        query_type: &str,
    ) -> Result<HogQLQueryResult, HogQLError> {
        let entry = RecordedQuery {
            query: query.clone(),
            team_id: team.team_id,
            workload,
            query_type: query_type.to_string(),
        };
        match self.recorded.lock() {
            Ok(mut recorded) => recorded.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
        Ok(self.result.clone())
    }
}

//! Lookahead pagination against a mocked executor

use std::sync::Arc;

use async_trait::async_trait;
use hogql::config::QueryConfig;
use hogql::events_query::{HogQLQueryResult, QueryExecutor, Workload};
use hogql::hogql_parser::ast::{ConstantValue, Expr, SelectQuery};
use hogql::testing::{InMemoryActions, InMemoryPersons};
use hogql::{EventsQuery, EventsQueryRunner, HogQLError, TeamContext};
use mockall::mock;
use serde_json::json;

mock! {
    pub Executor {}

    #[async_trait]
    impl QueryExecutor for Executor {
        async fn execute(
            &self,
            query: &SelectQuery,
            team: &TeamContext,
            workload: Workload,
            query_type: &str,
        ) -> Result<HogQLQueryResult, HogQLError>;
    }
}

fn runner() -> EventsQueryRunner {
    EventsQueryRunner::new(
        QueryConfig::default(),
        Arc::new(InMemoryPersons::new()),
        Arc::new(InMemoryActions::default()),
    )
}

fn rows(count: usize) -> HogQLQueryResult {
    HogQLQueryResult {
        results: (0..count).map(|i| vec![json!(format!("event_{}", i))]).collect(),
        types: vec![("event".to_string(), "String".to_string())],
    }
}

fn expect_limit(executor: &mut MockExecutor, limit: i64, result: HogQLQueryResult) {
    executor
        .expect_execute()
        .withf(move |query, team, workload, query_type| {
            query.limit.as_deref() == Some(&Expr::Constant(ConstantValue::Integer(limit)))
                && team.team_id == 1
                && *workload == Workload::Offline
                && query_type == "EventsQuery"
        })
        .times(1)
        .returning(move |_, _, _, _| Ok(result.clone()));
}

fn event_query(limit: Option<i64>) -> EventsQuery {
    EventsQuery {
        select: vec!["event".to_string()],
        limit,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_page_sets_has_more() {
    let mut executor = MockExecutor::new();
    expect_limit(&mut executor, 11, rows(11));

    let response = runner()
        .run(&executor, &event_query(Some(10)), &TeamContext::new(1))
        .await
        .unwrap();
    assert!(response.has_more);
    assert_eq!(response.results.len(), 10);
    assert_eq!(response.results[9], vec![json!("event_9")]);
    assert_eq!(response.types, vec!["String"]);
}

#[tokio::test]
async fn test_short_page_has_no_more() {
    let mut executor = MockExecutor::new();
    expect_limit(&mut executor, 11, rows(10));

    let response = runner()
        .run(&executor, &event_query(Some(10)), &TeamContext::new(1))
        .await
        .unwrap();
    assert!(!response.has_more);
    assert_eq!(response.results.len(), 10);
}

#[tokio::test]
async fn test_default_and_capped_limits() {
    let mut executor = MockExecutor::new();
    expect_limit(&mut executor, 101, rows(0));
    let response = runner()
        .run(&executor, &event_query(None), &TeamContext::new(1))
        .await
        .unwrap();
    assert!(response.results.is_empty());
    assert!(!response.has_more);

    let mut executor = MockExecutor::new();
    expect_limit(&mut executor, 100_001, rows(3));
    let response = runner()
        .run(&executor, &event_query(Some(5_000_000)), &TeamContext::new(1))
        .await
        .unwrap();
    assert_eq!(response.results.len(), 3);
}

#[tokio::test]
async fn test_executor_errors_pass_through() {
    let mut executor = MockExecutor::new();
    executor.expect_execute().times(1).returning(|_, _, _, _| {
        Err(HogQLError::execution(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "query timed out",
        )))
    });

    let err = runner()
        .run(&executor, &event_query(None), &TeamContext::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, HogQLError::Execution(_)));
    assert_eq!(err.to_string(), "query timed out");
}

//! Filters that aggregate are moved to HAVING; WHERE never aggregates

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use hogql::clickhouse_query_generator::{contains_aggregation, DefaultPropertyResolver};
use hogql::config::QueryConfig;
use hogql::events_query::models::PropertyFilter;
use hogql::hogql_parser::ast::Expr;
use hogql::testing::{InMemoryActions, InMemoryPersons};
use hogql::{EventsQuery, EventsQueryRunner, TeamContext};

fn runner() -> EventsQueryRunner {
    EventsQueryRunner::new(
        QueryConfig::default(),
        Arc::new(InMemoryPersons::new()),
        Arc::new(InMemoryActions::default()),
    )
}

fn conjuncts(expr: &Option<Box<Expr>>) -> Vec<Expr> {
    match expr.as_deref() {
        Some(Expr::And(exprs)) => exprs.clone(),
        Some(other) => vec![other.clone()],
        None => vec![],
    }
}

#[tokio::test]
async fn test_aggregating_filters_go_to_having() {
    let query = EventsQuery {
        select: vec!["event".to_string(), "count()".to_string()],
        where_exprs: Some(vec![
            "count() > 10".to_string(),
            "event != '$feature_flag_called'".to_string(),
        ]),
        fixed_properties: Some(vec![PropertyFilter::hogql("avg(properties.price) < 5")]),
        ..Default::default()
    };
    let now = Utc.with_ymd_and_hms(2023, 3, 15, 13, 45, 30).unwrap();
    let team = TeamContext::new(3);
    let runner = runner();
    let assembled = runner.build_at(&query, &team, now).await.unwrap();

    let where_list = conjuncts(&assembled.select.where_expr);
    let having_list = conjuncts(&assembled.select.having);
    // the user filter plus both time bounds
    assert_eq!(where_list.len(), 3);
    assert_eq!(having_list.len(), 2);
    assert!(where_list.iter().all(|e| !contains_aggregation(e)));
    assert!(having_list.iter().all(contains_aggregation));
    assert_eq!(assembled.select.group_by, Some(vec![Expr::field(&["event"])]));

    let sql = runner
        .to_clickhouse_sql(&assembled, &team, &DefaultPropertyResolver::new())
        .unwrap();
    assert!(sql.contains(
        "GROUP BY event HAVING and((count() > 10), \
         (avg(replaceRegexpAll(JSONExtractRaw(properties, 'price'), '^\"|\"$', '')) < 5)) \
         ORDER BY count() DESC"
    ), "unexpected SQL:\n{}", sql);
    assert!(sql.contains("WHERE and(equals(team_id, 3), and((event != '$feature_flag_called'), "));
}

#[tokio::test]
async fn test_without_aggregating_filters_having_is_empty() {
    let query = EventsQuery {
        select: vec!["count()".to_string()],
        where_exprs: Some(vec!["event = 'signed_up'".to_string()]),
        ..Default::default()
    };
    let assembled = runner()
        .build(&query, &TeamContext::new(1))
        .await
        .unwrap();
    assert_eq!(assembled.select.having, None);
    assert_eq!(conjuncts(&assembled.select.where_expr).len(), 3);
}

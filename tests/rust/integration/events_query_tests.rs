//! End-to-end scenarios for the events query

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use hogql::clickhouse_query_generator::DefaultPropertyResolver;
use hogql::events_query::models::{
    Action, ActionStep, Person, PropertyFilter, PropertyOperator, Workload,
};
use hogql::events_query::{EventsQueryRunner, HogQLQueryResult};
use hogql::config::QueryConfig;
use hogql::hogql_parser::ast::{Expr, OrderDirection, OrderExpr};
use hogql::testing::{InMemoryActions, InMemoryPersons, RecordingExecutor};
use hogql::{EventsQuery, HogQLError, TeamContext};
use serde_json::json;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, 15, 13, 45, 30).unwrap()
}

fn runner() -> EventsQueryRunner {
    let persons = InMemoryPersons::new().with_person(
        1,
        Person {
            id: 7,
            uuid: Uuid::nil(),
            created_at: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            properties: Some(json!({"email": "ada@example.com"})),
            distinct_ids: vec!["ada-laptop".to_string(), "ada-phone".to_string()],
        },
    );
    let actions = InMemoryActions::new(vec![
        Action {
            id: 1,
            team_id: 1,
            name: Some("Signed up".to_string()),
            steps: vec![ActionStep {
                event: Some("signed_up".to_string()),
                ..Default::default()
            }],
        },
        Action {
            id: 2,
            team_id: 1,
            name: Some("Empty".to_string()),
            steps: vec![],
        },
    ]);
    EventsQueryRunner::new(QueryConfig::default(), Arc::new(persons), Arc::new(actions))
}

fn select(columns: &[&str]) -> EventsQuery {
    EventsQuery {
        select: columns.iter().map(|c| c.to_string()).collect(),
        ..Default::default()
    }
}

async fn sql_for(query: &EventsQuery) -> String {
    let runner = runner();
    let team = TeamContext::new(1);
    let assembled = runner.build_at(query, &team, now()).await.unwrap();
    runner
        .to_clickhouse_sql(&assembled, &team, &DefaultPropertyResolver::new())
        .unwrap()
}

const DEFAULT_BOUNDS: &str = "(timestamp < toDateTime('2023-03-15 13:45:35', 'UTC')), \
                              (timestamp > toDateTime('2023-03-14 13:00:00', 'UTC'))";

#[tokio::test]
async fn test_plain_columns_order_by_timestamp() {
    let query = select(&["event", "timestamp"]);
    let assembled = runner()
        .build_at(&query, &TeamContext::new(1), now())
        .await
        .unwrap();
    assert_eq!(assembled.select.group_by, None);
    assert_eq!(assembled.select.having, None);
    assert_eq!(
        assembled.select.order_by,
        Some(vec![OrderExpr::new(Expr::field(&["timestamp"]), OrderDirection::Desc)])
    );

    assert_eq!(
        sql_for(&query).await,
        format!(
            "SELECT event, timestamp FROM events WHERE and(equals(team_id, 1), and({})) \
             ORDER BY timestamp DESC LIMIT 101 OFFSET 0 SETTINGS readonly=1, max_execution_time=60",
            DEFAULT_BOUNDS
        )
    );
}

#[tokio::test]
async fn test_pure_aggregation() {
    let query = select(&["count()"]);
    let assembled = runner()
        .build_at(&query, &TeamContext::new(1), now())
        .await
        .unwrap();
    assert_eq!(assembled.select.group_by, Some(vec![]));
    assert_eq!(assembled.select.having, None);
    assert_eq!(
        assembled.select.order_by,
        Some(vec![OrderExpr::new(Expr::call("count", vec![]), OrderDirection::Desc)])
    );

    assert_eq!(
        sql_for(&query).await,
        format!(
            "SELECT count() FROM events WHERE and(equals(team_id, 1), and({})) \
             ORDER BY count() DESC LIMIT 101 OFFSET 0 SETTINGS readonly=1, max_execution_time=60",
            DEFAULT_BOUNDS
        )
    );
}

#[tokio::test]
async fn test_grouping_and_order_fallbacks() {
    let team = TeamContext::new(1);
    let runner = runner();

    let grouped = runner
        .build_at(&select(&["event", "sum(properties.revenue)"]), &team, now())
        .await
        .unwrap();
    assert_eq!(grouped.select.group_by, Some(vec![Expr::field(&["event"])]));
    let order = &grouped.select.order_by.unwrap()[0];
    assert_eq!(order.order, OrderDirection::Desc);
    assert_eq!(
        order.expr,
        Expr::call("sum", vec![Expr::field(&["properties", "revenue"])])
    );

    let first_column = runner
        .build_at(&select(&["distinct_id", "event"]), &team, now())
        .await
        .unwrap();
    assert_eq!(
        first_column.select.order_by,
        Some(vec![OrderExpr::new(Expr::field(&["distinct_id"]), OrderDirection::Asc)])
    );

    let explicit = EventsQuery {
        order_by: Some(vec!["event".to_string(), "timestamp DESC".to_string()]),
        ..select(&["event", "timestamp"])
    };
    let explicit = runner.build_at(&explicit, &team, now()).await.unwrap();
    assert_eq!(
        explicit.select.order_by,
        Some(vec![
            OrderExpr::new(Expr::field(&["event"]), OrderDirection::Asc),
            OrderExpr::new(Expr::field(&["timestamp"]), OrderDirection::Desc),
        ])
    );
}

#[tokio::test]
async fn test_filters_in_fixed_order() {
    let query = EventsQuery {
        where_exprs: Some(vec!["distinct_id != 'bot'".to_string()]),
        properties: Some(vec![PropertyFilter::event(
            "$browser",
            json!("Chrome"),
            PropertyOperator::Exact,
        )]),
        fixed_properties: Some(vec![PropertyFilter::hogql("event != 'x'")]),
        event: Some("$pageview".to_string()),
        action_id: Some(1),
        person_id: Some("7".to_string()),
        before: Some("2023-03-01".to_string()),
        after: Some("-7d".to_string()),
        ..select(&["event"])
    };
    let sql = sql_for(&query).await;
    let expected_where = "WHERE and(equals(team_id, 1), and(\
        (distinct_id != 'bot'), \
        (replaceRegexpAll(JSONExtractRaw(properties, '$browser'), '^\"|\"$', '') = 'Chrome'), \
        (event != 'x'), \
        (event = '$pageview'), \
        (event = 'signed_up'), \
        (distinct_id IN ['ada-laptop', 'ada-phone']), \
        (timestamp < toDateTime('2023-03-01 00:00:00', 'UTC')), \
        (timestamp > toDateTime('2023-03-08 00:00:00', 'UTC'))))";
    assert!(sql.contains(expected_where), "unexpected SQL:\n{}", sql);
    assert!(sql.contains("ORDER BY event ASC"));
}

#[tokio::test]
async fn test_unknown_person_matches_nothing() {
    let query = EventsQuery {
        person_id: Some("999".to_string()),
        ..select(&["event"])
    };
    assert!(sql_for(&query).await.contains("(distinct_id IN [])"));
}

#[tokio::test]
async fn test_action_errors() {
    let team = TeamContext::new(1);
    let missing = EventsQuery {
        action_id: Some(99),
        ..select(&["event"])
    };
    let err = runner().build_at(&missing, &team, now()).await.unwrap_err();
    assert_eq!(err.to_string(), "Action does not exist");

    let empty = EventsQuery {
        action_id: Some(2),
        ..select(&["event"])
    };
    let err = runner().build_at(&empty, &team, now()).await.unwrap_err();
    assert_eq!(err.to_string(), "Action does not have any match groups");

    // actions are looked up per team
    let other_team = runner()
        .build_at(&select(&["event"]), &TeamContext::new(2), now())
        .await;
    assert!(other_team.is_ok());
    let err = runner()
        .build_at(
            &EventsQuery {
                action_id: Some(1),
                ..select(&["event"])
            },
            &TeamContext::new(2),
            now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HogQLError::Validation(_)));
}

#[tokio::test]
async fn test_rejections() {
    let team = TeamContext::new(1);
    let runner = runner();

    // unknown functions and bad arity surface when the statement is printed
    let assembled = runner
        .build_at(&select(&["hack(event)"]), &team, now())
        .await
        .unwrap();
    let err = runner
        .to_clickhouse_sql(&assembled, &team, &DefaultPropertyResolver::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "Unsupported function call 'hack(...)'");

    let assembled = runner
        .build_at(&select(&["pow(1, 2, 3)"]), &team, now())
        .await
        .unwrap();
    let err = runner
        .to_clickhouse_sql(&assembled, &team, &DefaultPropertyResolver::new())
        .unwrap_err();
    assert_eq!(err.to_string(), "Function 'pow' expects exactly 2 argument(s), found 3");

    let executor = RecordingExecutor::default();
    let err = runner
        .run(&executor, &select(&["event +"]), &team)
        .await
        .unwrap_err();
    assert!(matches!(err, HogQLError::Syntax(_)));

    let err = runner
        .run(
            &executor,
            &EventsQuery {
                after: Some("whenever".to_string()),
                ..select(&["event"])
            },
            &team,
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("whenever"));

    let err = runner
        .run(
            &executor,
            &EventsQuery {
                limit: Some(-1),
                ..select(&["event"])
            },
            &team,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HogQLError::Validation(_)));
    assert!(executor.recorded().is_empty());
}

#[tokio::test]
async fn test_star_and_person_columns_are_expanded() {
    let executor = RecordingExecutor::new(HogQLQueryResult {
        results: vec![
            vec![
                json!([
                    "0186f4a0-0000-0000-0000-000000000001",
                    "$autocapture",
                    "{\"$browser\": \"Firefox\"}",
                    "2023-03-15 10:00:00",
                    1,
                    "ada-phone",
                    "button.primary:text=\"Buy\"",
                    "2023-03-15 10:00:01"
                ]),
                json!("ada-phone"),
            ],
            vec![
                json!([
                    "0186f4a0-0000-0000-0000-000000000002",
                    "$pageview",
                    "{}",
                    "2023-03-15 09:00:00",
                    1,
                    "stranger",
                    "",
                    "2023-03-15 09:00:01"
                ]),
                json!("stranger"),
            ],
        ],
        types: vec![
            ("tuple(...)".to_string(), "Tuple(...)".to_string()),
            ("distinct_id".to_string(), "String".to_string()),
        ],
    });
    let query = select(&["*", "person"]);
    let response = runner()
        .run(&executor, &query, &TeamContext::new(1))
        .await
        .unwrap();

    assert_eq!(response.columns, vec!["*", "person"]);
    assert_eq!(response.types, vec!["Tuple(...)", "String"]);
    assert!(!response.has_more);

    let event = response.results[0][0].as_object().unwrap();
    let keys: Vec<&str> = event.keys().map(String::as_str).take(8).collect();
    assert_eq!(
        keys,
        vec![
            "uuid",
            "event",
            "properties",
            "timestamp",
            "team_id",
            "distinct_id",
            "elements_chain",
            "created_at"
        ]
    );
    assert_eq!(event["properties"], json!({"$browser": "Firefox"}));
    assert_eq!(event["elements"][0]["tag_name"], json!("button"));
    assert_eq!(event["elements"][0]["text"], json!("Buy"));
    assert!(response.results[1][0].get("elements").is_none());

    assert_eq!(
        response.results[0][1],
        json!({
            "uuid": "00000000-0000-0000-0000-000000000000",
            "created_at": "2022-01-01T00:00:00Z",
            "properties": {"email": "ada@example.com"},
            "distinct_id": "ada-phone",
        })
    );
    assert_eq!(response.results[1][1], json!({"distinct_id": "stranger"}));

    let recorded = executor.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].workload, Workload::Offline);
    assert_eq!(recorded[0].query_type, "EventsQuery");
    // the SQL projection asks for distinct_id where the caller asked for person
    assert_eq!(recorded[0].query.select[1], Expr::field(&["distinct_id"]));
}

#[tokio::test]
async fn test_empty_select_means_star() {
    let assembled = runner()
        .build_at(&EventsQuery::default(), &TeamContext::new(1), now())
        .await
        .unwrap();
    assert_eq!(assembled.columns, vec!["*"]);
    assert_eq!(
        assembled.select.select,
        vec![Expr::call(
            "tuple",
            [
                "uuid",
                "event",
                "properties",
                "timestamp",
                "team_id",
                "distinct_id",
                "elements_chain",
                "created_at"
            ]
            .iter()
            .map(|f| Expr::field(&[*f]))
            .collect()
        )]
    );
}

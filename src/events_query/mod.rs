//! The events table query: request in, one SELECT over `events` out, rows reshaped.
//!
//! Assembly runs in fixed stages: pagination, projection, classification, filters,
//! ordering. Execution then hands the statement to a [`QueryExecutor`] and
//! post-processes the rows (star expansion, person lookup, lookahead trimming).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::clickhouse_query_generator::{
    contains_aggregation, print_select, PrintContext, PropertyResolver,
};
use crate::config::QueryConfig;
use crate::errors::HogQLError;
use crate::hogql_parser::ast::{
    ConstantValue, Expr, JoinExpr, OrderDirection, OrderExpr, SelectQuery,
};
use crate::hogql_parser::{
    parse_expr, parse_expr_with_placeholders, parse_order_expr, parse_select_column,
};

pub mod collaborators;
pub mod date_parse;
pub mod elements;
pub mod models;
pub mod post_process;
pub mod property;

pub use collaborators::{
    ActionLookup, ElementChainDecoder, HogQLQueryResult, PersonLookup, QueryExecutor,
};
pub use models::{EventsQuery, EventsQueryResponse, TeamContext, Workload};

use date_parse::parse_date_bound;
use elements::DefaultElementChainDecoder;
use post_process::{attach_persons, collect_distinct_ids, expand_star_column, trim_lookahead};
use property::{action_to_expr, property_to_expr};

/// Event columns packed into a tuple when `*` is selected, in tuple order.
pub const SELECT_STAR_FROM_EVENTS_FIELDS: &[&str] = &[
    "uuid",
    "event",
    "properties",
    "timestamp",
    "team_id",
    "distinct_id",
    "elements_chain",
    "created_at",
];

const QUERY_TYPE: &str = "EventsQuery";

/// The statement built for a request, plus what is needed to shape its results.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledEventsQuery {
    pub select: SelectQuery,
    /// Columns as requested, before `*` and `person` were rewritten.
    pub columns: Vec<String>,
    /// Limit sent to the database, including the lookahead row.
    pub limit: i64,
}

/// Builds and runs events queries for one configuration and set of lookups.
#[derive(Clone)]
pub struct EventsQueryRunner {
    config: QueryConfig,
    persons: Arc<dyn PersonLookup>,
    actions: Arc<dyn ActionLookup>,
    elements: Arc<dyn ElementChainDecoder>,
}

impl EventsQueryRunner {
    pub fn new(
        config: QueryConfig,
        persons: Arc<dyn PersonLookup>,
        actions: Arc<dyn ActionLookup>,
    ) -> Self {
        EventsQueryRunner {
            config,
            persons,
            actions,
            elements: Arc::new(DefaultElementChainDecoder),
        }
    }

    pub fn with_element_decoder(mut self, elements: Arc<dyn ElementChainDecoder>) -> Self {
        self.elements = elements;
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Assemble the SELECT for `query` with "now" taken from the clock.
    pub async fn build(
        &self,
        query: &EventsQuery,
        team: &TeamContext,
    ) -> Result<AssembledEventsQuery, HogQLError> {
        self.build_at(query, team, Utc::now()).await
    }

    /// Assemble the SELECT for `query`, resolving default and relative dates against `now`.
    pub async fn build_at(
        &self,
        query: &EventsQuery,
        team: &TeamContext,
        now: DateTime<Utc>,
    ) -> Result<AssembledEventsQuery, HogQLError> {
        // pagination: one extra row tells us whether another page exists
        let requested_limit = query.limit.unwrap_or(self.config.default_limit);
        if requested_limit < 0 {
            return Err(HogQLError::validation(format!(
                "Limit must not be negative, found {}",
                requested_limit
            )));
        }
        let limit = requested_limit.min(self.config.maximum_limit) + 1;
        let offset = query.offset.unwrap_or(0);
        if offset < 0 {
            return Err(HogQLError::validation(format!(
                "Offset must not be negative, found {}",
                offset
            )));
        }

        // projection
        let columns: Vec<String> = if query.select.is_empty() {
            vec!["*".to_string()]
        } else {
            query.select.clone()
        };
        let select_input: Vec<String> = columns
            .iter()
            .map(|column| match column.as_str() {
                "*" => format!("tuple({})", SELECT_STAR_FROM_EVENTS_FIELDS.join(", ")),
                "person" => "distinct_id".to_string(),
                _ => column.clone(),
            })
            .collect();
        let select = select_input
            .iter()
            .map(|column| parse_select_column(column))
            .collect::<Result<Vec<_>, _>>()?;

        // classification
        let (aggregations, group_by): (Vec<Expr>, Vec<Expr>) =
            select.iter().cloned().partition(contains_aggregation);
        let has_any_aggregation = !aggregations.is_empty();
        log::debug!(
            "{} projection(s), {} aggregation(s)",
            select.len(),
            aggregations.len()
        );

        // filters
        let mut where_exprs = Vec::new();
        for expr in query.where_exprs.iter().flatten() {
            where_exprs.push(parse_expr(expr)?);
        }
        for filter in query.properties.iter().flatten() {
            where_exprs.push(property_to_expr(filter)?);
        }
        for filter in query.fixed_properties.iter().flatten() {
            where_exprs.push(property_to_expr(filter)?);
        }
        if let Some(event) = &query.event {
            where_exprs.push(bind("event = {event}", "event", Expr::constant(event.as_str()))?);
        }
        if let Some(action_id) = query.action_id {
            let action = self
                .actions
                .get_action(action_id, team.team_id)
                .await?
                .ok_or_else(|| HogQLError::validation("Action does not exist"))?;
            where_exprs.push(action_to_expr(&action)?);
        }
        if let Some(person_id) = &query.person_id {
            let distinct_ids = match self.persons.get_person(team.team_id, person_id).await? {
                Some(person) => person.distinct_ids,
                None => {
                    log::warn!("person {} not found for team {}", person_id, team.team_id);
                    Vec::new()
                }
            };
            where_exprs.push(bind(
                "distinct_id in {list}",
                "list",
                Expr::Constant(ConstantValue::from(distinct_ids)),
            )?);
        }

        // future-dated events stay hidden unless asked for
        let before = match &query.before {
            Some(before) => parse_date_bound(before, now)?,
            None => now + TimeDelta::seconds(self.config.before_skew_seconds),
        };
        where_exprs.push(bind("timestamp < {timestamp}", "timestamp", Expr::constant(before))?);

        let after = query.after.as_deref().unwrap_or(&self.config.default_after);
        let after = parse_date_bound(after, now)?;
        where_exprs.push(bind("timestamp > {timestamp}", "timestamp", Expr::constant(after))?);

        let (having_list, where_list): (Vec<Expr>, Vec<Expr>) =
            where_exprs.into_iter().partition(contains_aggregation);
        let where_expr = (!where_list.is_empty()).then(|| Box::new(Expr::And(where_list)));
        let having = (!having_list.is_empty()).then(|| Box::new(Expr::And(having_list)));

        // ordering
        let order_by = match &query.order_by {
            Some(order_by) => order_by
                .iter()
                .map(|column| parse_order_expr(column))
                .collect::<Result<Vec<_>, _>>()?,
            None if select_input.iter().any(|c| c == "count()") => vec![OrderExpr::new(
                Expr::call("count", vec![]),
                OrderDirection::Desc,
            )],
            None if has_any_aggregation => {
                vec![OrderExpr::new(aggregations[0].clone(), OrderDirection::Desc)]
            }
            None if select_input.iter().any(|c| c == "timestamp") => vec![OrderExpr::new(
                Expr::field(&["timestamp"]),
                OrderDirection::Desc,
            )],
            None => select
                .first()
                .map(|first| OrderExpr::new(first.clone(), OrderDirection::Asc))
                .into_iter()
                .collect(),
        };

        let select = SelectQuery {
            select,
            select_from: Some(JoinExpr {
                table: Box::new(Expr::field(&["events"])),
            }),
            where_expr,
            group_by: has_any_aggregation.then_some(group_by),
            having,
            order_by: Some(order_by),
            limit: Some(Box::new(Expr::constant(limit))),
            offset: Some(Box::new(Expr::constant(offset))),
        };
        Ok(AssembledEventsQuery {
            select,
            columns,
            limit,
        })
    }

    /// Render the assembled statement as ClickHouse SQL for `team`.
    pub fn to_clickhouse_sql(
        &self,
        assembled: &AssembledEventsQuery,
        team: &TeamContext,
        property_resolver: &dyn PropertyResolver,
    ) -> Result<String, HogQLError> {
        let ctx = PrintContext::new(team.team_id, property_resolver)
            .with_timezone(team.timezone.as_str())
            .with_settings(self.config.settings());
        Ok(print_select(&assembled.select, &ctx)?)
    }

    /// Build, execute and post-process an events query.
    pub async fn run(
        &self,
        executor: &dyn QueryExecutor,
        query: &EventsQuery,
        team: &TeamContext,
    ) -> Result<EventsQueryResponse, HogQLError> {
        let assembled = self.build(query, team).await?;
        let result = executor
            .execute(&assembled.select, team, Workload::Offline, QUERY_TYPE)
            .await?;
        self.post_process(assembled, result, team).await
    }

    async fn post_process(
        &self,
        assembled: AssembledEventsQuery,
        result: HogQLQueryResult,
        team: &TeamContext,
    ) -> Result<EventsQueryResponse, HogQLError> {
        let mut results = result.results;
        let columns = assembled.columns;

        if let Some(star_idx) = columns.iter().position(|c| c == "*") {
            expand_star_column(&mut results, star_idx, self.elements.as_ref())?;
        }

        let person_columns: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() == "person")
            .map(|(idx, _)| idx)
            .collect();
        if !person_columns.is_empty() && !results.is_empty() {
            let distinct_ids = collect_distinct_ids(&results, &person_columns);
            let persons = self
                .persons
                .get_persons_by_distinct_ids(team.team_id, &distinct_ids)
                .await?;
            log::debug!(
                "resolved {} person(s) for {} distinct id(s)",
                persons.len(),
                distinct_ids.len()
            );
            attach_persons(&mut results, &person_columns, &persons);
        }

        let has_more = trim_lookahead(&mut results, assembled.limit as usize);
        log::info!(
            "{} for team {} returned {} row(s), has_more={}",
            QUERY_TYPE,
            team.team_id,
            results.len(),
            has_more
        );
        Ok(EventsQueryResponse {
            results,
            columns,
            types: result.types.into_iter().map(|(_, t)| t).collect(),
            has_more,
        })
    }
}

fn bind(template: &str, name: &str, value: Expr) -> Result<Expr, HogQLError> {
    let values = HashMap::from([(name.to_string(), value)]);
    parse_expr_with_placeholders(template, &values)
}

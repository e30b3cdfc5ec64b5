//! Maps HogQL field chains onto physical columns of the `events` table.

use std::collections::HashMap;

use super::errors::ClickhouseQueryGeneratorError;
use super::escape::escape_clickhouse_string;
use super::function_registry::is_keyword;

/// Event columns that can be referenced by a bare name. `id` is an alias of `uuid`.
pub const EVENT_FIELDS: &[&str] = &[
    "id",
    "uuid",
    "event",
    "timestamp",
    "distinct_id",
    "properties",
    "elements_chain",
    "created_at",
    "team_id",
];

/// Person columns denormalised onto events as `person_<field>`.
pub const PERSON_FIELDS: &[&str] = &["id", "created_at", "properties"];

pub const EVENTS_TABLE: &str = "events";

/// How a property expression reads its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySource {
    /// Extracted from the JSON properties column at query time.
    Json,
    /// Read from a dedicated materialized column.
    MaterializedColumn,
}

/// Resolves a property key to a ClickHouse expression that reads it.
pub trait PropertyResolver: Send + Sync {
    fn resolve_property_expr(
        &self,
        table: &str,
        property_key: &str,
        escaped_key: &str,
        column: &str,
    ) -> (String, PropertySource);
}

/// JSON extraction with optional materialized columns keyed by `(property, column)`.
#[derive(Debug, Clone, Default)]
pub struct DefaultPropertyResolver {
    materialized_columns: HashMap<(String, String), String>,
}

impl DefaultPropertyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_materialized_column(
        mut self,
        property_key: impl Into<String>,
        column: impl Into<String>,
        materialized_name: impl Into<String>,
    ) -> Self {
        self.materialized_columns.insert(
            (property_key.into(), column.into()),
            materialized_name.into(),
        );
        self
    }
}

impl PropertyResolver for DefaultPropertyResolver {
    fn resolve_property_expr(
        &self,
        _table: &str,
        property_key: &str,
        escaped_key: &str,
        column: &str,
    ) -> (String, PropertySource) {
        if let Some(materialized) = self
            .materialized_columns
            .get(&(property_key.to_string(), column.to_string()))
        {
            return (
                format!("\"{}\"", materialized),
                PropertySource::MaterializedColumn,
            );
        }
        (
            format!(
                "replaceRegexpAll(JSONExtractRaw({}, {}), '^\"|\"$', '')",
                column, escaped_key
            ),
            PropertySource::Json,
        )
    }
}

fn person_field(name: &str) -> Result<&str, ClickhouseQueryGeneratorError> {
    if PERSON_FIELDS.contains(&name) {
        Ok(name)
    } else {
        Err(ClickhouseQueryGeneratorError::UnknownPersonField(
            name.to_string(),
        ))
    }
}

fn property_expr(resolver: &dyn PropertyResolver, key: &str, column: &str) -> String {
    let (expr, _) =
        resolver.resolve_property_expr(EVENTS_TABLE, key, &escape_clickhouse_string(key), column);
    expr
}

/// Resolve a field chain to ClickHouse SQL.
///
/// Accepted shapes: `<event field>`, `person_<person field>`, `properties.<key>`,
/// `person.<person field>` and `person.properties.<key>`. Both person spellings go
/// through the same field check.
pub fn resolve_field_chain(
    chain: &[String],
    resolver: &dyn PropertyResolver,
) -> Result<String, ClickhouseQueryGeneratorError> {
    let segments: Vec<&str> = chain.iter().map(String::as_str).collect();
    match segments.as_slice() {
        [name] => {
            if EVENT_FIELDS.contains(name) {
                return Ok(if *name == "id" { "uuid" } else { *name }.to_string());
            }
            if is_keyword(name) {
                return Ok(name.to_string());
            }
            match name.strip_prefix("person_") {
                Some(field) => Ok(format!("person_{}", person_field(field)?)),
                None => Err(ClickhouseQueryGeneratorError::UnknownEventField(
                    name.to_string(),
                )),
            }
        }
        ["properties", key] => Ok(property_expr(resolver, key, "properties")),
        ["person", field] => Ok(format!("person_{}", person_field(field)?)),
        ["person", "properties", key] => Ok(property_expr(resolver, key, "person_properties")),
        _ => Err(ClickhouseQueryGeneratorError::UnsupportedPropertyAccess(
            chain.to_vec(),
        )),
    }
}

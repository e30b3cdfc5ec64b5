//! HogQL AST to ClickHouse SQL.
//!
//! The printer validates every call against the function registry and resolves every
//! field chain against the events schema before anything is emitted.

pub mod aggregation;
mod errors;
pub mod escape;
pub mod field_resolver;
pub mod function_registry;
pub mod to_sql;

pub use aggregation::contains_aggregation;
pub use errors::ClickhouseQueryGeneratorError;
pub use escape::{
    escape_clickhouse_identifier, escape_clickhouse_string, escape_hogql_identifier,
    escape_hogql_string, escape_literal, Dialect,
};
pub use field_resolver::{
    resolve_field_chain, DefaultPropertyResolver, PropertyResolver, PropertySource,
};
pub use to_sql::{print_expr, print_select, HogQLSettings, PrintContext, ToSql};

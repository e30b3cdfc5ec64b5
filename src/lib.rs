//! HogQL - a restricted analytics expression language compiled to ClickHouse SQL
//!
//! This crate provides:
//! - A parser for HogQL expressions
//! - A validating printer from the HogQL AST to ClickHouse SQL
//! - The events table query assembler and its result post-processing
//! - A ClickHouse-backed query executor

pub mod clickhouse_query_generator;
pub mod config;
pub mod errors;
pub mod events_query;
pub mod executor;
pub mod hogql_parser;
pub mod testing;

pub use errors::HogQLError;
pub use events_query::{EventsQuery, EventsQueryResponse, EventsQueryRunner, TeamContext};
pub use hogql_parser::{parse_expr, parse_order_expr};

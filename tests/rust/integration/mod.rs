//! Integration tests - the events query end to end, with in-memory or mocked collaborators
//!
//! These tests verify that assembly, printing, execution and post-processing work together.

mod events_query_tests;
mod pagination_tests;
mod where_having_tests;

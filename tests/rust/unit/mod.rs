//! Unit tests - cross-module behaviour that needs no external services

mod escaping_tests;
mod parser_robustness_tests;

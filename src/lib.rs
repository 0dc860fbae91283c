//! esql-reports - charts for Typst reports from Elasticsearch ES|QL queries.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod esql;
pub mod logging;
pub mod render;
pub mod report;
pub mod script;
pub mod typst;

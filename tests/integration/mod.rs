//! Integration tests for esql-reports.
//!
//! Most tests run against a local HTTP listener or a mock backend. The live
//! tests need a cluster: set ES_URL to run them.

pub mod client_test;
pub mod common;
pub mod live_test;
pub mod report_test;

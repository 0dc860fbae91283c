//! ES|QL query layer.
//!
//! Resolves connection URLs, sends queries, and turns columnar responses into
//! tidy records. The [`QueryBackend`] trait lets the report driver run against
//! a mock backend in tests.

mod client;
mod connection;
mod mock;
mod response;
mod types;

pub use client::{ClientConfig, EsqlClient, DEFAULT_TIMEOUT_SECS};
pub use connection::{
    Authorization, ConnectionResolver, ConnectionSpec, API_KEY_USERNAME, CONTENT_TYPE,
    QUERY_SUFFIX,
};
pub use mock::MockBackend;
pub use response::{normalize, QueryResponse, ResultSet};
pub use types::{ColumnInfo, QueryResults, QuerySet, TidyData, TidyRecord, TidyValue, DATE_TYPE};

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

/// Trait defining the interface to the query endpoint.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Runs `query` against the backend addressed by `url`.
    ///
    /// Only URL and credential problems are errors. Transport failures come
    /// back as [`QueryResponse::empty`].
    async fn execute(&self, url: &str, query: &str) -> Result<QueryResponse>;
}

/// Runs every query of a query set, one after the other, in declaration order.
///
/// The first failing query aborts the rest.
pub async fn run_queries(
    backend: &dyn QueryBackend,
    url: &str,
    queries: &QuerySet,
) -> Result<QueryResults> {
    let mut results = QueryResults::with_capacity(queries.len());

    for (name, query) in queries {
        debug!("running query '{}'", name);
        let response = backend.execute(url, query).await?;
        let records = normalize(&response)?;
        debug!("query '{}' returned {} rows", name, records.len());
        results.insert(name.clone(), records);
    }

    Ok(results)
}

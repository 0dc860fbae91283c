//! Mock query backend for testing.
//!
//! Returns canned responses based on query patterns and records every query
//! it receives.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::connection::ConnectionSpec;
use super::response::QueryResponse;
use super::QueryBackend;
use crate::error::Result;

/// A mock backend that answers queries with predefined responses.
///
/// Queries that match no pattern get [`QueryResponse::empty`], the same thing
/// a transport failure produces.
#[derive(Debug, Default)]
pub struct MockBackend {
    responses: Vec<(String, QueryResponse)>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Creates a mock backend with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a canned response.
    ///
    /// When a query contains `pattern`, the mock returns `response`.
    pub fn with_response(mut self, pattern: impl Into<String>, response: serde_json::Value) -> Self {
        self.responses
            .push((pattern.into(), QueryResponse::from_json(response)));
        self
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    async fn execute(&self, url: &str, query: &str) -> Result<QueryResponse> {
        // Same credential checks as the real client, before anything is "sent".
        ConnectionSpec::from_url(url)?;

        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        let response = self
            .responses
            .iter()
            .find(|(pattern, _)| query.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(QueryResponse::empty);

        Ok(response)
    }
}

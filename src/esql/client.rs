//! ES|QL query endpoint client.
//!
//! Implements the QueryBackend trait over HTTP. This is the only part of the
//! crate that talks to the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::connection::{ConnectionResolver, ConnectionSpec};
use super::response::{normalize, QueryResponse};
use super::types::TidyData;
use super::QueryBackend;
use crate::error::{ReportError, Result};

/// Default timeout for query requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Query client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// HTTP client for the ES|QL `_query` endpoint.
///
/// Owns the connection resolver, so every URL it is handed is parsed once.
#[derive(Debug)]
pub struct EsqlClient {
    http: Client,
    resolver: ConnectionResolver,
}

impl EsqlClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            resolver: ConnectionResolver::new(),
        })
    }

    /// The resolver holding every connection spec derived so far.
    pub fn resolver(&self) -> &ConnectionResolver {
        &self.resolver
    }

    /// Posts `query` to the endpoint described by `spec`.
    ///
    /// Never fails: transport errors are logged and replaced by an empty
    /// response. The status code is not inspected; the body goes to the
    /// normalizer as-is.
    pub async fn send(&self, spec: &ConnectionSpec, query: &str) -> QueryResponse {
        let mut request = self
            .http
            .post(spec.query_url())
            .header(CONTENT_TYPE, spec.content_type_header())
            .json(&QueryRequest { query });

        if let Some(authorization) = spec.authorization_header() {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log_transport_failure(&e);
                return QueryResponse::empty();
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => {
                debug!(
                    "query to {} returned {} ({} bytes)",
                    spec.request_target(),
                    status,
                    body.len()
                );
                QueryResponse::from_body(&body)
            }
            Err(e) => {
                log_transport_failure(&e);
                QueryResponse::empty()
            }
        }
    }

    /// Runs one query and normalizes its result.
    pub async fn query(&self, url: &str, query: &str) -> Result<TidyData> {
        let response = self.execute(url, query).await?;
        normalize(&response)
    }
}

#[async_trait]
impl QueryBackend for EsqlClient {
    async fn execute(&self, url: &str, query: &str) -> Result<QueryResponse> {
        let spec = self.resolver.resolve(url)?;
        Ok(self.send(&spec, query).await)
    }
}

fn log_transport_failure(err: &reqwest::Error) {
    let cause = std::error::Error::source(err)
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    warn!("error running query: {}; cause: {}", err, cause);
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

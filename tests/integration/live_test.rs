//! Tests against a real Elasticsearch cluster.
//!
//! Set ES_URL to run them; they are skipped otherwise.

use esql_reports::error::ReportError;
use esql_reports::esql::{ClientConfig, EsqlClient, TidyValue};

/// Helper to get the test cluster URL from environment.
fn get_test_es_url() -> Option<String> {
    std::env::var("ES_URL").ok()
}

fn client() -> EsqlClient {
    EsqlClient::new(ClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_row_query_with_date() {
    let Some(url) = get_test_es_url() else {
        eprintln!("Skipping test: ES_URL not set");
        return;
    };

    let records = client()
        .query(
            &url,
            r#"ROW n = 1, d = TO_DATETIME("2024-01-01T00:00:00.000Z")"#,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["n"], TidyValue::from(1i64));
    assert!(records[0]["d"].as_date().is_some());
}

#[tokio::test]
async fn test_unknown_index_is_backend_error() {
    let Some(url) = get_test_es_url() else {
        eprintln!("Skipping test: ES_URL not set");
        return;
    };

    let err = client()
        .query(&url, "FROM esql-reports-index-that-does-not-exist")
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Backend { .. }));
}

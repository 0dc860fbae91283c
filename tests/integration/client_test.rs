//! Query client tests against a local HTTP listener.
//!
//! Checks what actually goes over the wire: path, headers and body.

use esql_reports::error::ReportError;
use esql_reports::esql::{ClientConfig, EsqlClient, QueryBackend, QueryResponse, TidyValue};
use serde_json::{json, Value};

use super::common::serve_once;

fn client() -> EsqlClient {
    EsqlClient::new(ClientConfig::default().with_timeout(10)).unwrap()
}

fn with_userinfo(base: &str, userinfo: &str) -> String {
    format!("http://{userinfo}@{}", base.trim_start_matches("http://"))
}

const EVENT_LOG_RESPONSE: &str = r#"{
  "columns": [
    { "name": "date", "type": "date" },
    { "name": "duration", "type": "double" }
  ],
  "values": [["2024-01-01T00:00:00Z", 1.5]]
}"#;

#[tokio::test]
async fn test_basic_auth_request() {
    let (base, server) = serve_once(200, EVENT_LOG_RESPONSE).await;
    let url = with_userinfo(&base, "elastic:changeme");

    let records = client().query(&url, "FROM idx | LIMIT 1").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(request.request_line, "POST /_query HTTP/1.1");
    assert_eq!(
        request.header("authorization"),
        Some("Basic ZWxhc3RpYzpjaGFuZ2VtZQ==")
    );
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(
        serde_json::from_str::<Value>(&request.body).unwrap(),
        json!({ "query": "FROM idx | LIMIT 1" })
    );

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0]["date"]
            .as_date()
            .map(|d| d.to_rfc3339()),
        Some("2024-01-01T00:00:00+00:00".to_string())
    );
    assert_eq!(records[0]["duration"], TidyValue::from(1.5));
}

#[tokio::test]
async fn test_api_key_request_with_path() {
    let (base, server) = serve_once(200, r#"{ "columns": [], "values": [] }"#).await;
    let url = format!("{}/proxy/", with_userinfo(&base, "API-KEY:abc%3D%3D"));

    let records = client().query(&url, "FROM idx").await.unwrap();
    let request = server.await.unwrap();

    assert!(records.is_empty());
    assert_eq!(request.request_line, "POST /proxy/_query HTTP/1.1");
    assert_eq!(request.header("authorization"), Some("ApiKey abc=="));
}

#[tokio::test]
async fn test_no_credentials_and_query_string_dropped() {
    let (base, server) = serve_once(200, r#"{ "columns": [], "values": [] }"#).await;
    let url = format!("{base}/?pretty=true#section");

    client().query(&url, "FROM idx").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(request.request_line, "POST /_query HTTP/1.1");
    assert_eq!(request.header("authorization"), None);
}

#[tokio::test]
async fn test_backend_error_body_on_non_2xx() {
    let body = r#"{
      "error": { "type": "verification_exception", "reason": "Unknown index [idx]" },
      "status": 400
    }"#;
    let (base, server) = serve_once(400, body).await;

    let err = client().query(&base, "FROM idx").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, ReportError::Backend { .. }));
    assert!(err.to_string().contains("Unknown index [idx]"));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (base, server) = serve_once(502, "Bad Gateway").await;

    let response = client().execute(&base, "FROM idx").await.unwrap();
    server.await.unwrap();

    assert_eq!(response.raw(), &json!("Bad Gateway"));
    let err = esql_reports::esql::normalize(&response).unwrap_err();
    assert!(matches!(err, ReportError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_empty_response() {
    // Bind and drop a listener to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let response = client()
        .execute(&format!("http://127.0.0.1:{port}"), "FROM idx")
        .await
        .unwrap();

    assert_eq!(response, QueryResponse::empty());
}

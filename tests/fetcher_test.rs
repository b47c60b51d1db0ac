//! Integration tests for PageFetcher using wiremock
//!
//! These tests validate the HTTP fetcher's behavior with mock servers.

use retrocrawl::crawler::fetcher::PageFetcher;
use retrocrawl::utils::error::{FetchError, Retryable};
use retrocrawl::utils::retry::RetryPolicy;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> PageFetcher {
    PageFetcher::with_timeout("retrocrawl-test", Duration::from_secs(5)).unwrap()
}

/// Test successful fetch from mock server
#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;
    let html = r#"<!DOCTYPE html>
<html>
<head><title>Nota</title></head>
<body><h1>Año nuevo en Perú</h1><p>Cuerpo de la nota.</p></body>
</html>"#;

    Mock::given(method("GET"))
        .and(path("/politica/nota"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&mock_server)
        .await;

    let url = format!("{}/politica/nota", mock_server.uri());
    let result = fetcher().fetch_text(&url).await;

    assert!(result.is_ok(), "Fetch should succeed: {:?}", result.err());
    let body = result.unwrap();
    assert!(body.contains("Año nuevo en Perú"));
    assert!(body.contains("Cuerpo de la nota."));
}

/// Test that server errors are retried by the policy
#[tokio::test]
async fn test_server_error_retry() {
    let mock_server = MockServer::start().await;

    // Return 500 twice, then succeed
    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher();
    let url = format!("{}/test", mock_server.uri());
    let policy = RetryPolicy::new(3, Duration::from_millis(1));
    let result = policy.execute(|| fetcher.fetch_text(&url)).await;

    assert_eq!(result.unwrap(), "OK");
}

/// Test 404 does not retry
#[tokio::test]
async fn test_404_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notfound"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // Should only be called once (no retry)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher();
    let url = format!("{}/notfound", mock_server.uri());
    let policy = RetryPolicy::new(3, Duration::from_millis(1));
    let result = policy.execute(|| fetcher.fetch_text(&url)).await;

    let err = result.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_retryable());
}

/// Test max retries exceeded
#[tokio::test]
async fn test_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    // Always return 503
    Mock::given(method("GET"))
        .and(path("/always-fail"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = fetcher();
    let url = format!("{}/always-fail", mock_server.uri());
    let policy = RetryPolicy::new(2, Duration::from_millis(1));
    let result = policy.execute(|| fetcher.fetch_text(&url)).await;

    assert!(matches!(
        result,
        Err(FetchError::Status { status: 503, .. })
    ));
}

/// Test timeout classification
#[tokio::test]
async fn test_timeout_is_retryable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_timeout("retrocrawl-test", Duration::from_millis(50)).unwrap();
    let url = format!("{}/slow", mock_server.uri());
    let err = fetcher.fetch_text(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
    assert!(err.is_retryable());
}

/// Test Latin-1 decoding from the declared charset
#[tokio::test]
async fn test_latin1_decoding() {
    let mock_server = MockServer::start().await;
    // "Perú" in ISO-8859-1
    let body: Vec<u8> = vec![0x50, 0x65, 0x72, 0xfa];

    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "text/html; charset=ISO-8859-1"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/latin1", mock_server.uri());
    let result = fetcher().fetch_text(&url).await;

    assert_eq!(result.unwrap(), "Perú");
}

/// Test User-Agent header is set
#[tokio::test]
async fn test_user_agent_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ua-test"))
        .and(wiremock::matchers::header("user-agent", "retrocrawl-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/ua-test", mock_server.uri());
    let result = fetcher().fetch_text(&url).await;

    assert!(result.is_ok(), "User-Agent header should match");
}

//! Lightweight fetch behavior against a mock server

use linkscape::config::FetchConfig;
use linkscape::fetch::FetchError;
use linkscape::{Fetch, FetchClient, FetchOptions, FetchOutcome, FetchStrategy};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fetch configuration with short delays for testing
fn test_fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 5,
        max_retries: 3,
        retry_delay_ms: 20,
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/post"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(&test_fetch_config()).unwrap();
    let url = format!("{}/blog/post", mock_server.uri());
    let result = client
        .fetch(&url, FetchStrategy::Lightweight, &FetchOptions::default())
        .await;

    assert!(result.is_success());
    assert_eq!(result.outcome(), FetchOutcome::Success);
    assert_eq!(result.attempts, 1);
    assert_eq!(result.strategy, FetchStrategy::Lightweight);
    assert!(result.body.unwrap().contains("hi"));
}

#[tokio::test]
async fn test_rate_limit_retried_with_growing_delay() {
    let mock_server = MockServer::start().await;

    // First two requests are throttled, the third succeeds
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(&test_fetch_config()).unwrap();
    let url = format!("{}/busy", mock_server.uri());

    let started = Instant::now();
    let result = client
        .fetch(&url, FetchStrategy::Lightweight, &FetchOptions::default())
        .await;

    assert!(result.is_success());
    assert_eq!(result.attempts, 3);
    assert_eq!(result.body.as_deref(), Some("finally"));
    // 20ms before the first retry, 40ms before the second
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_rate_limit_budget_exhausted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/throttled"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(&test_fetch_config()).unwrap();
    let url = format!("{}/throttled", mock_server.uri());
    let result = client
        .fetch(&url, FetchStrategy::Lightweight, &FetchOptions::default())
        .await;

    assert!(!result.is_success());
    assert_eq!(result.attempts, 4);
    assert_eq!(result.error, Some(FetchError::RateLimited(503)));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FetchClient::new(&test_fetch_config()).unwrap();
    let url = format!("{}/missing", mock_server.uri());
    let result = client
        .fetch(&url, FetchStrategy::Lightweight, &FetchOptions::default())
        .await;

    assert!(!result.is_success());
    assert_eq!(result.attempts, 1);
    assert_eq!(result.error, Some(FetchError::HttpStatus(404)));
    assert!(result.body.is_none());
}

#[tokio::test]
async fn test_browser_fetch_without_session_fails_fast() {
    let client = FetchClient::new(&test_fetch_config()).unwrap();

    let result = client
        .fetch(
            "https://example.com/post",
            FetchStrategy::Browser,
            &FetchOptions::default(),
        )
        .await;

    assert!(!result.is_success());
    assert_eq!(result.strategy, FetchStrategy::Browser);
    assert_eq!(result.attempts, 0);
    assert!(matches!(result.error, Some(FetchError::Render(_))));
}

#[tokio::test]
async fn test_lightweight_session_is_noop() {
    let client = FetchClient::new(&test_fetch_config()).unwrap();
    client.open_session(FetchStrategy::Lightweight).await.unwrap();
    client.close_session(FetchStrategy::Lightweight).await;

    // Still no browser: a browser fetch keeps failing fast
    let result = client
        .fetch(
            "https://example.com/post",
            FetchStrategy::Browser,
            &FetchOptions::default(),
        )
        .await;
    assert_eq!(result.attempts, 0);
}

//! Integration tests for `HttpBoardAdapter` against a local `wiremock` server.

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobpacker_core::{JobType, SearchQuery, SourceErrorKind, SourceId};
use jobpacker_harvest::{FetchContext, HttpBoardAdapter, HttpBoardSettings, SourceAdapter};

fn test_adapter(source: SourceId, server: &MockServer, page_size: u32) -> HttpBoardAdapter {
    HttpBoardAdapter::new(
        source,
        HttpBoardSettings {
            endpoint: format!("{}/search", server.uri()),
            user_agent: "jobpacker-test/0.1".to_string(),
            page_size,
            min_interval: Duration::ZERO,
        },
    )
    .expect("failed to build test adapter")
}

fn ctx(secs: u64) -> FetchContext {
    FetchContext::new(
        Instant::now() + Duration::from_secs(secs),
        CancellationToken::new(),
    )
}

fn jobs(range: std::ops::Range<u32>) -> serde_json::Value {
    json!(range
        .map(|i| json!({"jobkey": format!("k{i}"), "title": format!("Job {i}"), "company": "Acme"}))
        .collect::<Vec<_>>())
}

fn query() -> SearchQuery {
    SearchQuery::new("rust engineer", "Austin, TX").with_sources([SourceId::Indeed])
}

#[tokio::test]
async fn fetch_sends_query_parameters_and_parses_array_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust engineer"))
        .and(query_param("location", "Austin, TX"))
        .and(query_param("limit", "10"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(0..3)))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Indeed, &server, 10);
    let result = adapter.fetch(&query(), 10, &ctx(5)).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let fetch = result.unwrap();
    assert_eq!(fetch.results.len(), 3);
    assert!(fetch.interrupted.is_none());
}

#[tokio::test]
async fn fetch_reads_wrapped_results_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("remote", "true"))
        .and(query_param("job_type", "contract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": jobs(0..2)})))
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::LinkedIn, &server, 10);
    let query = query()
        .with_remote_only(true)
        .with_job_type(Some(JobType::Contract));
    let fetch = adapter.fetch(&query, 10, &ctx(5)).await.unwrap();
    assert_eq!(fetch.results.len(), 2);
}

#[tokio::test]
async fn fetch_pages_until_limit_reached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(0..5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(5..10)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(10..15)))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Indeed, &server, 5);
    let fetch = adapter.fetch(&query(), 8, &ctx(5)).await.unwrap();
    assert_eq!(fetch.results.len(), 8);
    assert!(fetch.interrupted.is_none());
}

#[tokio::test]
async fn fetch_stops_on_short_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(0..2)))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Indeed, &server, 5);
    let fetch = adapter.fetch(&query(), 20, &ctx(5)).await.unwrap();
    assert_eq!(fetch.results.len(), 2);
}

#[tokio::test]
async fn page_with_junk_entry_is_not_short() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"title": "a"}, 7])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(0..2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Indeed, &server, 2);
    let fetch = adapter.fetch(&query(), 4, &ctx(5)).await.unwrap();
    assert_eq!(fetch.results.len(), 3);
    assert!(fetch.interrupted.is_none());
}

#[tokio::test]
async fn http_429_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "60"))
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Indeed, &server, 10);
    let err = adapter.fetch(&query(), 10, &ctx(5)).await.unwrap_err();
    assert_eq!(err.kind, SourceErrorKind::RateLimited);
    assert!(err.message.contains("60"), "message: {}", err.message);
}

#[tokio::test]
async fn auth_and_missing_endpoints_are_fatal() {
    for status in [401u16, 403, 404] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let adapter = test_adapter(SourceId::Indeed, &server, 10);
        let err = adapter.fetch(&query(), 10, &ctx(5)).await.unwrap_err();
        assert_eq!(err.kind, SourceErrorKind::Fatal, "status {status}");
    }
}

#[tokio::test]
async fn server_errors_and_bad_bodies_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let adapter = test_adapter(SourceId::Indeed, &server, 10);
    let err = adapter.fetch(&query(), 10, &ctx(5)).await.unwrap_err();
    assert_eq!(err.kind, SourceErrorKind::Transient);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;
    let adapter = test_adapter(SourceId::Indeed, &server, 10);
    let err = adapter.fetch(&query(), 10, &ctx(5)).await.unwrap_err();
    assert_eq!(err.kind, SourceErrorKind::Transient);
}

#[tokio::test]
async fn failure_after_first_page_is_partial() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(0..5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Indeed, &server, 5);
    let fetch = adapter.fetch(&query(), 10, &ctx(5)).await.unwrap();
    assert_eq!(fetch.results.len(), 5);
    let interrupted = fetch.interrupted.expect("expected an interrupting error");
    assert_eq!(interrupted.kind, SourceErrorKind::Transient);
}

#[tokio::test]
async fn slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(jobs(0..1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Indeed, &server, 10);
    let err = adapter.fetch(&query(), 10, &ctx(1)).await.unwrap_err();
    assert_eq!(err.kind, SourceErrorKind::Timeout);
}

#[tokio::test]
async fn unsupported_query_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs(0..1)))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = test_adapter(SourceId::Google, &server, 10);
    let keywordless = SearchQuery::new("", "USA").with_sources([SourceId::Google]);
    let err = adapter.fetch(&keywordless, 10, &ctx(5)).await.unwrap_err();
    assert_eq!(err.kind, SourceErrorKind::Unsupported);
}

//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end: robots.txt, retries, pagination and CSV.

use quote_trawler::config::Config;
use quote_trawler::crawler::{crawl, FetchError, HttpFetcher, PageFetcher, RetryPolicy};
use quote_trawler::output::split_tags;
use quote_trawler::robots::{fetch_robots, PermissionCheck, RobotsChecker};
use quote_trawler::{CrawlState, HarvestError, StopReason};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration pointed at the mock server
fn create_test_config(origin: &str, csv_path: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.origin = origin.to_string();
    config.crawler.min_delay_secs = 0.0;
    config.crawler.max_delay_secs = 0.01; // Very short for testing
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.retry.backoff_factor = 0.01;
    config.output.csv_path = csv_path.to_string_lossy().into_owned();
    config
}

fn route(n: u32) -> String {
    if n == 1 {
        "/".to_string()
    } else {
        format!("/page/{}/", n)
    }
}

/// Page `n` of a `total`-page quote listing
fn quote_page(n: u32, total: u32) -> String {
    let next = if n < total {
        format!(
            r#"<li class="next"><a href="/page/{}/">Next <span>&rarr;</span></a></li>"#,
            n + 1
        )
    } else {
        String::new()
    };

    format!(
        r#"<html><head><title>Quotes</title></head><body>
        <div class="quote">
            <span class="text">Quote {n}a</span>
            <span>by <small class="author">Author {n}</small></span>
            <div class="tags">Tags: <a class="tag" href="/tag/x/">x</a> <a class="tag" href="/tag/y/">y</a></div>
        </div>
        <div class="quote">
            <span class="text">Quote {n}b</span>
            <span>by <small class="author">Author {n}</small></span>
            <div class="tags"></div>
        </div>
        <nav><ul class="pager">{next}</ul></nav>
        </body></html>"#
    )
}

async fn mount_robots(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounts pages 1..=total, each expected to be requested `expected(n)` times
async fn mount_site(server: &MockServer, total: u32, expected: impl Fn(u32) -> u64) {
    for n in 1..=total {
        Mock::given(method("GET"))
            .and(path(route(n)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(quote_page(n, total))
                    .insert_header("content-type", "text/html"),
            )
            .expect(expected(n))
            .mount(server)
            .await;
    }
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV");
    let header = reader
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|row| row.expect("Bad row").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

#[tokio::test]
async fn test_full_crawl_writes_csv() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"),
    )
    .await;
    mount_site(&mock_server, 3, |_| 1).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    let config = create_test_config(&mock_server.uri(), &csv_path);

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Completed);
    assert_eq!(report.final_state, CrawlState::Done);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.rows_written, Some(6));

    let (header, rows) = read_csv(&csv_path);
    assert_eq!(header, vec!["text", "author", "tags"]);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0], vec!["Quote 1a", "Author 1", "x;y"]);
    assert_eq!(rows[1], vec!["Quote 1b", "Author 1", ""]);
    assert_eq!(rows[5], vec!["Quote 3b", "Author 3", ""]);
    assert_eq!(split_tags(&rows[2][2]), vec!["x", "y"]);
}

#[tokio::test]
async fn test_identity_header_on_every_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(quote_page(1, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("quotes.csv"));

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.pages_fetched, 1);
}

#[tokio::test]
async fn test_robots_txt_disallow_skips_crawl() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"),
    )
    .await;
    mount_site(&mock_server, 2, |_| 0).await; // Should never be called

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    let config = create_test_config(&mock_server.uri(), &csv_path);

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::PermissionDenied);
    assert!(report.records.is_empty());
    assert_eq!(report.rows_written, None);
    assert!(!csv_path.exists(), "No file should be written without data");
}

#[tokio::test]
async fn test_robots_txt_targets_our_agent() {
    let mock_server = MockServer::start().await;
    mount_robots(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_string("User-agent: TestBot\nDisallow: /\n\nUser-agent: *\nAllow: /"),
    )
    .await;

    let checker = RobotsChecker::new(reqwest::Client::new());
    let origin = Url::parse(&mock_server.uri()).unwrap();

    assert!(!checker.is_allowed(&origin, "TestBot").await);
    assert!(checker.is_allowed(&origin, "OtherBot").await);
}

#[tokio::test]
async fn test_missing_robots_txt_allows_crawl() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, ResponseTemplate::new(404)).await;
    mount_site(&mock_server, 1, |_| 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("quotes.csv"));

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stop_reason, StopReason::Completed);
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1) // Single attempt, no retries
        .mount(&mock_server)
        .await;
    mount_site(&mock_server, 1, |_| 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("quotes.csv"));

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stop_reason, StopReason::Completed);
    assert_eq!(report.pages_fetched, 1);
}

#[tokio::test]
async fn test_undecodable_robots_txt_fails_open() {
    let mock_server = MockServer::start().await;

    let mut body = b"User-agent: *\nDisallow: /\n# caf".to_vec();
    body.push(0xE9); // latin-1 e-acute, invalid as UTF-8
    mount_robots(&mock_server, ResponseTemplate::new(200).set_body_bytes(body)).await;

    let client = reqwest::Client::new();
    let origin = Url::parse(&mock_server.uri()).unwrap();

    let fetched = fetch_robots(&client, &origin).await;
    assert!(matches!(fetched, Err(HarvestError::Robots(_))));

    let checker = RobotsChecker::new(client);
    assert!(checker.is_allowed(&origin, "TestBot").await);
}

#[tokio::test]
async fn test_robots_forbidden_denies() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, ResponseTemplate::new(403)).await;
    mount_site(&mock_server, 1, |_| 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("quotes.csv"));

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stop_reason, StopReason::PermissionDenied);
}

#[tokio::test]
async fn test_unreachable_robots_txt_fails_open() {
    // Reserve a port, then free it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let checker = RobotsChecker::new(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap(),
    );
    let origin = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

    assert!(checker.is_allowed(&origin, "TestBot").await);
}

#[tokio::test]
async fn test_max_pages_limit() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, ResponseTemplate::new(404)).await;
    mount_site(&mock_server, 5, |n| if n <= 2 { 1 } else { 0 }).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    let mut config = create_test_config(&mock_server.uri(), &csv_path);
    config.crawler.max_pages = Some(2);

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::PageLimitReached { limit: 2 });
    assert_eq!(report.pages_fetched, 2);

    let (_, rows) = read_csv(&csv_path);
    assert_eq!(rows.len(), 4);
}

#[tokio::test]
async fn test_fatal_status_keeps_partial_results() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, ResponseTemplate::new(404)).await;

    // Pages 1-2 succeed, page 3 is gone, pages 4-5 are never reached
    mount_site(&mock_server, 5, |n| match n {
        1 | 2 => 1,
        _ => 0,
    })
    .await;
    Mock::given(method("GET"))
        .and(path("/page/3/"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .expect(1) // Not retried
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("quotes.csv");
    let config = create_test_config(&mock_server.uri(), &csv_path);

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.final_state, CrawlState::Aborted);
    assert!(matches!(report.stop_reason, StopReason::FetchFailed { .. }));

    let (_, rows) = read_csv(&csv_path);
    let texts: Vec<_> = rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(texts, vec!["Quote 1a", "Quote 1b", "Quote 2a", "Quote 2b"]);
}

#[tokio::test]
async fn test_retry_transient_errors_then_succeed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new(), RetryPolicy::new(5, 0.01));
    let url = Url::parse(&mock_server.uri()).unwrap();

    let body = fetcher.fetch(&url).await.expect("Fetch should recover");
    assert_eq!(body, "ok");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(5)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new(), RetryPolicy::new(5, 0.01));
    let url = Url::parse(&mock_server.uri()).unwrap();

    match fetcher.fetch(&url).await {
        Err(FetchError::RetriesExhausted { attempts, last, .. }) => {
            assert_eq!(attempts, 5);
            assert_eq!(last.status(), Some(502));
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_retryable_status_fails_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new(), RetryPolicy::new(5, 0.01));
    let url = Url::parse(&mock_server.uri()).unwrap();

    let error = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(error.status(), Some(403));
    assert!(matches!(error, FetchError::Status { .. }));
}

#[tokio::test]
async fn test_retry_after_header_is_honored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new(), RetryPolicy::new(3, 0.01));
    let url = Url::parse(&mock_server.uri()).unwrap();

    let start = std::time::Instant::now();
    assert_eq!(fetcher.fetch(&url).await.unwrap(), "ok");
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_retry_after_ignored_on_internal_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).insert_header("retry-after", "120"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(reqwest::Client::new(), RetryPolicy::new(3, 0.01));
    let url = Url::parse(&mock_server.uri()).unwrap();

    // Regular 10ms backoff applies instead of the two-minute hint
    let result = tokio::time::timeout(Duration::from_secs(10), fetcher.fetch(&url)).await;
    assert_eq!(result.expect("Retry-After on a 500 was honored").unwrap(), "ok");
}

#[tokio::test]
async fn test_request_timeout_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let fetcher = HttpFetcher::new(client, RetryPolicy::new(2, 0.01));
    let url = Url::parse(&mock_server.uri()).unwrap();

    match fetcher.fetch(&url).await {
        Err(FetchError::RetriesExhausted { attempts, last, .. }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, FetchError::Timeout { .. }));
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
}

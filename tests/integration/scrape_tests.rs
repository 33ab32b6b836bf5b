//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve pages and run real scrapes against them.

use link_census::config::ScraperConfig;
use link_census::scrape::{
    header_modifier, PageReport, PageScraper, RequestModifier, ScrapeError, Scraper,
};
use link_census::urls::TargetUrl;
use reqwest::Request;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_scraper(concurrency: usize) -> Scraper {
    let config = ScraperConfig {
        concurrency,
        user_agent: "CensusTest/1.0".to_string(),
        request_timeout: 5,
        connect_timeout: 2,
        ..ScraperConfig::default()
    };
    Scraper::new(&config).expect("Failed to build scraper")
}

fn page_urls(base: &str, count: usize) -> Vec<TargetUrl> {
    (0..count)
        .map(|i| TargetUrl::parse(&format!("{}/page{}", base, i)).expect("Failed to build URL"))
        .collect()
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn by_url(reports: &[PageReport]) -> Vec<&PageReport> {
    let mut sorted: Vec<_> = reports.iter().collect();
    sorted.sort_by(|a, b| a.page_url.cmp(&b.page_url));
    sorted
}

#[tokio::test]
async fn test_one_report_per_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page(r#"<a href="/home">Home</a>"#))
        .mount(&mock_server)
        .await;

    let urls = page_urls(&mock_server.uri(), 25);
    let scraper = test_scraper(4);

    let reports = scraper
        .scrape_pages(CancellationToken::new(), urls.clone(), Vec::new())
        .await;

    assert_eq!(reports.len(), urls.len());
    let seen: HashSet<_> = reports.iter().map(|r| r.page_url.clone()).collect();
    let expected: HashSet<_> = urls.iter().map(|u| u.to_string()).collect();
    assert_eq!(seen, expected);
    assert!(reports.iter().all(|r| r.success));
}

#[tokio::test]
async fn test_concurrency_above_url_count() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page(""))
        .mount(&mock_server)
        .await;

    let urls = page_urls(&mock_server.uri(), 3);
    let reports = test_scraper(1000)
        .scrape_pages(CancellationToken::new(), urls, Vec::new())
        .await;

    assert_eq!(reports.len(), 3);
}

#[tokio::test]
async fn test_link_classification_counts() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{base}/page1">One</a>
               <a href="/page2">Two</a>
               <a href="page3?x=1">Three</a>
               <a href="https://example.com/">Elsewhere</a>
               <a href="mailto:someone@example.com">Mail</a>
               <a href="">Empty</a>
               <a>No href</a>"#,
            base = base_url
        )))
        .mount(&mock_server)
        .await;

    let urls = vec![TargetUrl::parse(&format!("{}/", base_url)).unwrap()];
    let reports = test_scraper(2)
        .scrape_pages(CancellationToken::new(), urls, Vec::new())
        .await;

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.success);
    assert!(report.error.is_none());
    assert_eq!(report.internal_links_count, 3);
    assert_eq!(report.external_links_count, 2);
}

#[tokio::test]
async fn test_error_status_is_a_failure_report() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_page(r#"<a href="/x">x</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let urls = vec![
        TargetUrl::parse(&format!("{}/ok", base_url)).unwrap(),
        TargetUrl::parse(&format!("{}/missing", base_url)).unwrap(),
        TargetUrl::parse(&format!("{}/broken", base_url)).unwrap(),
    ];
    let reports = test_scraper(3)
        .scrape_pages(CancellationToken::new(), urls, Vec::new())
        .await;

    let reports = by_url(&reports);
    assert_eq!(reports.len(), 3);

    let broken = reports[0];
    assert!(broken.page_url.ends_with("/broken"));
    assert!(!broken.success);
    assert_eq!(broken.error.as_deref(), Some("bad status code: 500"));

    let missing = reports[1];
    assert!(missing.page_url.ends_with("/missing"));
    assert!(!missing.success);
    assert_eq!(missing.error.as_deref(), Some("bad status code: 404"));
    assert_eq!(missing.internal_links_count, 0);
    assert_eq!(missing.external_links_count, 0);

    let ok = reports[2];
    assert!(ok.success);
    assert_eq!(ok.internal_links_count, 1);
}

#[tokio::test]
async fn test_unreachable_host_is_a_failure_report() {
    let urls = vec![TargetUrl::parse("http://127.0.0.1:1/").unwrap()];
    let reports = test_scraper(1)
        .scrape_pages(CancellationToken::new(), urls, Vec::new())
        .await;

    assert_eq!(reports.len(), 1);
    assert!(!reports[0].success);
    assert!(reports[0].error.is_some());
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "CensusTest/1.0"))
        .respond_with(html_page(""))
        .mount(&mock_server)
        .await;

    let urls = page_urls(&mock_server.uri(), 1);
    let reports = test_scraper(1)
        .scrape_pages(CancellationToken::new(), urls, Vec::new())
        .await;

    assert!(reports[0].success, "unexpected failure: {:?}", reports[0].error);
}

#[tokio::test]
async fn test_header_modifier_applies_to_every_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-census", "yes"))
        .respond_with(html_page(""))
        .expect(4)
        .mount(&mock_server)
        .await;

    let urls = page_urls(&mock_server.uri(), 4);
    let modifiers = vec![header_modifier("X-Census", "yes").unwrap()];
    let reports = test_scraper(2)
        .scrape_pages(CancellationToken::new(), urls, modifiers)
        .await;

    assert_eq!(reports.len(), 4);
    assert!(reports.iter().all(|r| r.success));
}

#[tokio::test]
async fn test_modifier_can_replace_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "Replaced/2.0"))
        .respond_with(html_page(""))
        .mount(&mock_server)
        .await;

    let urls = page_urls(&mock_server.uri(), 1);
    let modifiers = vec![header_modifier("User-Agent", "Replaced/2.0").unwrap()];
    let reports = test_scraper(1)
        .scrape_pages(CancellationToken::new(), urls, modifiers)
        .await;

    assert!(reports[0].success);
}

#[tokio::test]
async fn test_failing_modifier_skips_the_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let reject: RequestModifier = Arc::new(|_request: &mut Request| -> Result<(), ScrapeError> {
        Err(ScrapeError::Modifier("signing key unavailable".to_string()))
    });

    let urls = page_urls(&mock_server.uri(), 2);
    let reports = test_scraper(2)
        .scrape_pages(CancellationToken::new(), urls, vec![reject])
        .await;

    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert!(!report.success);
        let error = report.error.as_deref().unwrap_or_default();
        assert!(error.contains("signing key unavailable"), "got {:?}", error);
    }
}

#[tokio::test]
async fn test_cancellation_returns_partial_results_without_duplicates() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page("").set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    let urls = page_urls(&mock_server.uri(), 8);
    let scraper = test_scraper(2);
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        })
    };

    let reports = scraper.scrape_pages(cancel, urls.clone(), Vec::new()).await;
    canceller.await.unwrap();

    assert!(reports.len() < urls.len());
    let unique: HashSet<_> = reports.iter().map(|r| r.page_url.clone()).collect();
    assert_eq!(unique.len(), reports.len());

    scraper.close(Duration::from_secs(5)).await.unwrap();
    assert_eq!(scraper.in_flight(), 0);
}

#[tokio::test]
async fn test_close_times_out_while_work_is_running() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page("").set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let scraper = test_scraper(1);
    let mut stream = scraper.scrape_stream(
        CancellationToken::new(),
        page_urls(&mock_server.uri(), 1),
        Vec::new(),
    );

    let result = scraper.close(Duration::from_millis(20)).await;
    assert!(matches!(result, Err(ScrapeError::CloseTimeout(_))));

    // The scrape still completes after the timed-out close
    let report = stream.recv().await.expect("report missing");
    assert!(report.success);
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn test_close_waits_for_running_scrape() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page(r#"<a href="/a">a</a>"#).set_delay(Duration::from_millis(200)))
        .mount(&mock_server)
        .await;

    let scraper = test_scraper(3);
    let urls = page_urls(&mock_server.uri(), 3);
    let scrape = {
        let scraper = scraper.clone();
        tokio::spawn(async move {
            scraper
                .scrape_pages(CancellationToken::new(), urls, Vec::new())
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(scraper.in_flight(), 1);

    scraper.close(Duration::from_secs(5)).await.unwrap();
    assert_eq!(scraper.in_flight(), 0);

    let reports = scrape.await.unwrap();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.success && r.internal_links_count == 1));
}

#[tokio::test]
async fn test_concurrent_scrapes_share_one_scraper() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page("").set_delay(Duration::from_millis(150)))
        .mount(&mock_server)
        .await;

    let scraper = test_scraper(2);
    let base = mock_server.uri();

    let spawn_scrape = |urls: Vec<TargetUrl>| {
        let scraper = scraper.clone();
        tokio::spawn(async move {
            scraper
                .scrape_pages(CancellationToken::new(), urls, Vec::new())
                .await
        })
    };

    let first_urls = page_urls(&base, 3);
    let second_urls: Vec<_> = (0..4)
        .map(|i| TargetUrl::parse(&format!("{}/other{}", base, i)).unwrap())
        .collect();
    let first = spawn_scrape(first_urls.clone());
    let second = spawn_scrape(second_urls.clone());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(scraper.in_flight(), 2);

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    // Each scrape gets exactly its own pages back
    let first_pages: HashSet<_> = first.iter().map(|r| r.page_url.clone()).collect();
    let second_pages: HashSet<_> = second.iter().map(|r| r.page_url.clone()).collect();
    let expected_first: HashSet<_> = first_urls.iter().map(|u| u.to_string()).collect();
    let expected_second: HashSet<_> = second_urls.iter().map(|u| u.to_string()).collect();
    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 4);
    assert_eq!(first_pages, expected_first);
    assert_eq!(second_pages, expected_second);

    scraper.close(Duration::from_secs(5)).await.unwrap();
    assert_eq!(scraper.in_flight(), 0);
}

#[tokio::test]
async fn test_page_url_is_reported_as_submitted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Mixed/Case"))
        .respond_with(html_page(""))
        .mount(&mock_server)
        .await;

    let submitted = format!("{}/Mixed/Case", mock_server.uri());
    let urls = vec![TargetUrl::parse(&submitted).unwrap()];
    let reports = test_scraper(1)
        .scrape_pages(CancellationToken::new(), urls, Vec::new())
        .await;

    assert!(reports[0].success);
    assert_eq!(reports[0].page_url, submitted);
}

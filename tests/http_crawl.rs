//! End-to-end crawl tests against a local `wiremock` server: real HTTP
//! fetching, extraction, normalization and CSV export, no outside network.

use pretty_assertions::assert_eq;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use listing_mailer::app::{run_with_fetcher, RunOutcome};
use listing_mailer::config::{Config, MailConfig};
use listing_mailer::scrapers::{Crawler, ListingExtractor, PageFetcher, StopReason};
use listing_mailer::storage::CsvSink;
use listing_mailer::utils::http::{create_client, HttpFetcher};
use listing_mailer::{MailError, ScrapeError};

const TEST_UA: &str = "listing-mailer-test/0.1";

fn fetcher(obey_robots: bool) -> HttpFetcher {
    let client =
        create_client(TEST_UA, Duration::from_secs(5)).expect("failed to build test client");
    HttpFetcher::new(client, TEST_UA, obey_robots)
}

fn listing(address: &str, price: &str, home: &str, lot: &str) -> String {
    format!(
        r#"<div class="listing">
             <span class="address">{address}</span>
             <span class="price">{price}</span>
             <span class="home-size">{home}</span>
             <span class="lot-size">{lot}</span>
           </div>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Page 1: two listings and a relative next link. Page 2: one listing, no next link.
async fn mount_two_pages(server: &MockServer) {
    let page1 = format!(
        "<html><body>{}{}<a class=\"next-page\" href=\"page/2\">Next</a></body></html>",
        listing("12 Main St", "$250,000", "1,200 sqft", "5,000 sqft"),
        listing("9 Oak Ave", "$ 99,500 ", "850 sqft", "2,100 sqft"),
    );
    let page2 = format!(
        "<html><body>{}</body></html>",
        listing("4 Pine Rd", "$1,100,000", "3,400 sqft", "20,000 sqft"),
    );
    mount_page(server, "/homes/", page1).await;
    mount_page(server, "/homes/page/2", page2).await;
}

fn test_config(output: &std::path::Path) -> Config {
    Config {
        user_agent: TEST_UA.to_string(),
        output_path: output.to_path_buf(),
        mail: MailConfig {
            smtp_host: "127.0.0.1".to_string(),
            smtp_port: 9,
            sender_email: None,
            sender_password: None,
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn fetcher_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/homes"))
        .and(header("user-agent", TEST_UA))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/homes", server.uri())).unwrap();
    let body = fetcher(false).fetch(&url).await.unwrap();
    assert_eq!(body, "<html></html>");
}

#[tokio::test]
async fn non_success_status_is_an_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/homes"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/homes", server.uri())).unwrap();
    let err = fetcher(false).fetch(&url).await.unwrap_err();
    assert!(matches!(err, ScrapeError::UnexpectedStatus { status: 503, .. }));
}

#[tokio::test]
async fn two_page_site_exports_three_rows_in_order() {
    let server = MockServer::start().await;
    mount_two_pages(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.csv");
    let config = test_config(&output);

    let outcome = run_with_fetcher(
        &config,
        fetcher(false),
        &format!("{}/homes/", server.uri()),
        "buyer@example.com",
    )
    .await;

    // No sender credentials: the crawl completes, the mail step fails on its own.
    match outcome {
        RunOutcome::MailFailed(summary, MailError::MissingCredentials(..)) => {
            assert_eq!(summary.pages, 2);
            assert_eq!(summary.records, 3);
            assert_eq!(summary.stop_reason, StopReason::NoNextPage);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        "address,sale_price,home_size_sqft,lot_size_sqft\n\
         12 Main St,250000,1200,5000\n\
         9 Oak Ave,99500,850,2100\n\
         4 Pine Rd,1100000,3400,20000\n"
    );
}

#[tokio::test]
async fn listing_free_site_writes_header_only_and_sends_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/empty", "<html><body><p>No results</p></body></html>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.csv");
    let config = test_config(&output);

    let outcome = run_with_fetcher(
        &config,
        fetcher(false),
        &format!("{}/empty", server.uri()),
        "buyer@example.com",
    )
    .await;

    assert!(matches!(outcome, RunOutcome::NoData(ref s) if s.pages == 1 && s.records == 0));
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "address,sale_price,home_size_sqft,lot_size_sqft\n"
    );
}

#[tokio::test]
async fn failed_next_page_aborts_the_run() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/homes",
        format!(
            "{}<a class=\"next-page\" href=\"/gone\">Next</a>",
            listing("1 Elm St", "$1", "1 sqft", "1 sqft")
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.csv");
    let config = test_config(&output);

    let outcome = run_with_fetcher(
        &config,
        fetcher(false),
        &format!("{}/homes", server.uri()),
        "buyer@example.com",
    )
    .await;

    assert!(matches!(
        outcome,
        RunOutcome::CrawlFailed(ScrapeError::UnexpectedStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn empty_start_url_leaves_previous_export_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.csv");
    std::fs::write(&output, "previous run\n").unwrap();
    let config = test_config(&output);

    let outcome = run_with_fetcher(&config, fetcher(false), "  ", "buyer@example.com").await;

    assert!(matches!(outcome, RunOutcome::CrawlFailed(ScrapeError::EmptyStartUrl)));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous run\n");
}

#[tokio::test]
async fn robots_txt_is_ignored_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/homes", "<html></html>".to_string()).await;

    let url = Url::parse(&format!("{}/homes", server.uri())).unwrap();
    assert!(fetcher(false).fetch(&url).await.is_ok());
}

#[tokio::test]
async fn robots_txt_is_fetched_once_and_obeyed_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/homes", "<html></html>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/private/homes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher(true);
    let allowed = Url::parse(&format!("{}/homes", server.uri())).unwrap();
    let forbidden = Url::parse(&format!("{}/private/homes", server.uri())).unwrap();

    assert!(fetcher.fetch(&allowed).await.is_ok());
    let err = fetcher.fetch(&forbidden).await.unwrap_err();
    assert!(matches!(err, ScrapeError::ForbiddenByRobots { .. }));
}

#[tokio::test]
async fn crawler_over_http_stops_on_a_pagination_cycle() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", "<a class=\"next-page\" href=\"/b\">Next</a>".to_string()).await;
    mount_page(&server, "/b", "<a class=\"next-page\" href=\"/a\">Next</a>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.csv");
    let extractor = ListingExtractor::from_config(&Config::default().selectors).unwrap();
    let crawler = Crawler::new(fetcher(false), extractor);
    let mut sink = CsvSink::create(&output).unwrap();

    let summary = crawler
        .crawl(&format!("{}/a", server.uri()), &mut sink)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.records, 0);
    assert!(matches!(summary.stop_reason, StopReason::Revisited(_)));
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "address,sale_price,home_size_sqft,lot_size_sqft\n"
    );
}

#[tokio::test]
async fn fragment_next_link_does_not_refetch_the_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/homes",
        format!(
            "{}<a class=\"next-page\" href=\"#\">Next</a>",
            listing("7 Bay Ct", "$410,000", "1,500 sqft", "4,000 sqft")
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.csv");
    let config = test_config(&output);

    let outcome = run_with_fetcher(
        &config,
        fetcher(false),
        &format!("{}/homes", server.uri()),
        "buyer@example.com",
    )
    .await;

    match outcome {
        RunOutcome::MailFailed(summary, MailError::MissingCredentials(..)) => {
            assert_eq!(summary.pages, 1);
            assert_eq!(summary.records, 1);
            assert!(matches!(summary.stop_reason, StopReason::Revisited(_)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "address,sale_price,home_size_sqft,lot_size_sqft\n7 Bay Ct,410000,1500,4000\n"
    );
}

#[tokio::test]
async fn malformed_recipient_is_reported_as_mail_failure() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/homes",
        listing("12 Main St", "$250,000", "1,200 sqft", "5,000 sqft"),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("output.csv");
    let mut config = test_config(&output);
    config.mail.sender_email = Some("sender@example.com".to_string());
    config.mail.sender_password = Some("secret".to_string());

    let outcome = run_with_fetcher(
        &config,
        fetcher(false),
        &format!("{}/homes", server.uri()),
        "bob@",
    )
    .await;

    match outcome {
        RunOutcome::MailFailed(summary, MailError::InvalidAddress { address, .. }) => {
            assert_eq!(summary.records, 1);
            assert_eq!(address, "bob@");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

use anyhow::{bail, Context, Result};
use listing_mailer::config::Config;
use listing_mailer::scrapers::{ListingExtractor, PageFetcher};
use listing_mailer::utils::http::HttpFetcher;
use url::Url;

/// Fetches one page and reports what the configured selectors match on it,
/// for retargeting the scraper at a new site.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("listing_mailer=debug".parse()?),
        )
        .init();

    let Some(raw_url) = std::env::args().nth(1) else {
        bail!("usage: probe-selectors <url>");
    };
    let url = Url::parse(&raw_url).with_context(|| format!("Invalid URL: {}", raw_url))?;

    let config = Config::load()?;
    let extractor = ListingExtractor::from_config(&config.selectors)?;
    let fetcher = HttpFetcher::from_config(&config)?;

    println!("Fetching {}...", url);
    let html = fetcher.fetch(&url).await?;
    println!("Fetched {} bytes", html.len());

    for (name, count) in extractor.selector_hits(&html) {
        println!("{:<16} matched {} elements", name, count);
    }

    let page = extractor.extract(&html, url.as_str());
    println!("\nExtracted {} listings", page.listings.len());
    if let Some(first) = page.listings.first() {
        println!("First listing (raw):        {:?}", first);
        println!("First listing (normalized): {:?}", first.normalized());
    }

    match page.next_page {
        Some(link) => match url.join(&link) {
            Ok(next) => println!("Next page: {}", next),
            Err(e) => println!("Next page link '{}' does not resolve: {}", link, e),
        },
        None => println!("No next page link; this page would end the crawl"),
    }

    Ok(())
}

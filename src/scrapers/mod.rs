use async_trait::async_trait;
use url::Url;

use crate::error::ScrapeError;

mod crawl;
mod extract;

pub use crawl::{CrawlSummary, Crawler, StopReason};
pub use extract::ListingExtractor;

/// Source of page bodies for the crawler. The HTTP implementation lives in
/// `utils::http`; tests plug in canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        (**self).fetch(url).await
    }
}

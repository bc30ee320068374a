use std::collections::HashSet;
use tracing::{info, warn};
use url::Url;

use crate::error::ScrapeError;
use crate::scrapers::{ListingExtractor, PageFetcher};
use crate::storage::ListingSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last page had no next-page link.
    NoNextPage,
    /// The next-page link pointed at a page already crawled in this run.
    Revisited(Url),
    /// `max_pages` pages were crawled and another was still linked.
    PageLimit(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: usize,
    pub records: usize,
    pub stop_reason: StopReason,
}

enum CrawlState {
    Fetching(Url),
    Done(StopReason),
}

/// Sequential pagination follower: one page is fetched, extracted,
/// normalized and exported before the next is requested.
pub struct Crawler<F> {
    fetcher: F,
    extractor: ListingExtractor,
    max_pages: Option<usize>,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, extractor: ListingExtractor) -> Self {
        Self {
            fetcher,
            extractor,
            max_pages: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages.filter(|&n| n > 0);
        self
    }

    /// Crawl from `start_url` until a page has no next link. Any fetch
    /// failure aborts the crawl; records already handed to `sink` stay there.
    pub async fn crawl<S: ListingSink>(
        &self,
        start_url: &str,
        sink: &mut S,
    ) -> Result<CrawlSummary, ScrapeError> {
        let start_url = start_url.trim();
        if start_url.is_empty() {
            return Err(ScrapeError::EmptyStartUrl);
        }
        let mut start = Url::parse(start_url).map_err(|source| ScrapeError::InvalidUrl {
            url: start_url.to_string(),
            source,
        })?;
        // Fragments never change the fetched document.
        start.set_fragment(None);

        let mut visited: HashSet<Url> = HashSet::new();
        let mut pages = 0;
        let mut records = 0;
        let mut state = CrawlState::Fetching(start);

        loop {
            match state {
                CrawlState::Fetching(url) => {
                    pages += 1;
                    info!("Fetching page {}: {}", pages, url);

                    let html = self.fetcher.fetch(&url).await?;
                    let page = self.extractor.extract(&html, url.as_str());

                    for raw in &page.listings {
                        sink.write(&raw.normalized())?;
                    }
                    records += page.listings.len();
                    info!("Exported {} listings from {}", page.listings.len(), url);

                    visited.insert(url.clone());
                    state = self.next_state(&url, page.next_page.as_deref(), pages, &visited)?;
                }
                CrawlState::Done(stop_reason) => {
                    sink.finish()?;
                    info!("Crawl finished after {} pages, {} listings", pages, records);
                    return Ok(CrawlSummary {
                        pages,
                        records,
                        stop_reason,
                    });
                }
            }
        }
    }

    fn next_state(
        &self,
        current: &Url,
        next_link: Option<&str>,
        pages: usize,
        visited: &HashSet<Url>,
    ) -> Result<CrawlState, ScrapeError> {
        let Some(link) = next_link else {
            return Ok(CrawlState::Done(StopReason::NoNextPage));
        };

        let mut next = current.join(link).map_err(|source| ScrapeError::InvalidUrl {
            url: link.to_string(),
            source,
        })?;
        next.set_fragment(None);

        if visited.contains(&next) {
            warn!("Next page {} was already crawled, stopping to avoid a loop", next);
            return Ok(CrawlState::Done(StopReason::Revisited(next)));
        }

        if let Some(max) = self.max_pages {
            if pages >= max {
                warn!("Reached the page limit of {}, not following {}", max, next);
                return Ok(CrawlState::Done(StopReason::PageLimit(max)));
            }
        }

        Ok(CrawlState::Fetching(next))
    }
}

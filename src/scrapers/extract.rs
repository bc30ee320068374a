use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::SelectorConfig;
use crate::error::ScrapeError;
use crate::models::{FieldKind, ListingRecord, PageExtract};
use crate::parsers::{parse_field_query, QueryTarget};

struct FieldSelector {
    kind: FieldKind,
    selector: Selector,
    target: QueryTarget,
}

/// Compiled form of a `SelectorConfig`. Extraction is a pure function of the
/// page content and these selectors.
pub struct ListingExtractor {
    listing_css: String,
    listing: Selector,
    fields: Vec<FieldSelector>,
    next_page: Selector,
    next_page_attr: String,
}

fn compile(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_string(),
        reason: format!("{:?}", e),
    })
}

impl ListingExtractor {
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ScrapeError> {
        let field_queries = [
            (FieldKind::Address, &config.address),
            (FieldKind::SalePrice, &config.price),
            (FieldKind::HomeSizeSqft, &config.home_size),
            (FieldKind::LotSizeSqft, &config.lot_size),
        ];

        let mut fields = Vec::with_capacity(field_queries.len());
        for (kind, query) in field_queries {
            let query = parse_field_query(query);
            fields.push(FieldSelector {
                kind,
                selector: compile(&query.css)?,
                target: query.target,
            });
        }

        Ok(Self {
            listing_css: config.listing.clone(),
            listing: compile(&config.listing)?,
            fields,
            next_page: compile(&config.next_page)?,
            next_page_attr: config.next_page_attr.clone(),
        })
    }

    pub fn extract(&self, html: &str, page_url: &str) -> PageExtract {
        let document = Html::parse_document(html);

        let listings: Vec<ListingRecord> = document
            .select(&self.listing)
            .map(|container| self.extract_listing(container))
            .collect();

        if listings.is_empty() {
            warn!(
                "No listings found with the provided selector. Please check the '{}' selector.",
                self.listing_css
            );
            warn!("Listing count = 0 for response URL: {}", page_url);
        } else {
            debug!("Extracted {} listings from {}", listings.len(), page_url);
        }

        let next_page = document
            .select(&self.next_page)
            .next()
            .and_then(|link| link.value().attr(&self.next_page_attr))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string);

        PageExtract { listings, next_page }
    }

    /// Counts how many elements each configured selector matches on a page.
    pub fn selector_hits(&self, html: &str) -> Vec<(String, usize)> {
        let document = Html::parse_document(html);
        let mut hits = vec![(
            "listing".to_string(),
            document.select(&self.listing).count(),
        )];
        for field in &self.fields {
            hits.push((field.kind.to_string(), document.select(&field.selector).count()));
        }
        hits.push((
            "next_page".to_string(),
            document.select(&self.next_page).count(),
        ));
        hits
    }

    fn extract_listing(&self, container: ElementRef<'_>) -> ListingRecord {
        let mut record = ListingRecord::default();
        for field in &self.fields {
            let value = container
                .select(&field.selector)
                .next()
                .and_then(|element| read_target(element, &field.target));
            record.set_field(field.kind, value);
        }
        record
    }
}

fn read_target(element: ElementRef<'_>, target: &QueryTarget) -> Option<String> {
    match target {
        QueryTarget::Text => {
            let mut nodes = element.text().peekable();
            nodes.peek()?;
            Some(nodes.collect())
        }
        QueryTarget::Attr(name) => element.value().attr(name).map(str::to_string),
    }
}

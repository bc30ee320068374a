use chrono::Local;
use std::io::{self, BufRead};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{InputError, MailError, ScrapeError};
use crate::mailer::{Mailer, DEFAULT_SUBJECT};
use crate::scrapers::{CrawlSummary, Crawler, ListingExtractor, PageFetcher};
use crate::storage::CsvSink;
use crate::utils::http::HttpFetcher;

/// How a run ended. Every variant is a completed run as far as the process
/// exit status goes.
#[derive(Debug)]
pub enum RunOutcome {
    CrawlFailed(ScrapeError),
    NoData(CrawlSummary),
    Mailed(CrawlSummary),
    MailFailed(CrawlSummary, MailError),
}

/// Trims interactive input and rejects it when nothing is left.
pub fn required_input(field: &'static str, raw: &str) -> Result<String, InputError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(InputError::Empty(field));
    }
    Ok(value.to_string())
}

/// Reads one answer line. End of input yields an empty answer, which
/// `required_input` then rejects.
pub fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line)
}

/// Crawl with the HTTP fetcher built from `config`, then mail the export.
pub async fn run(config: &Config, start_url: &str, recipient: &str) -> RunOutcome {
    let fetcher = match HttpFetcher::from_config(config) {
        Ok(fetcher) => fetcher,
        Err(e) => return crawl_failed(e),
    };
    run_with_fetcher(config, fetcher, start_url, recipient).await
}

pub async fn run_with_fetcher<F: PageFetcher>(
    config: &Config,
    fetcher: F,
    start_url: &str,
    recipient: &str,
) -> RunOutcome {
    info!("Starting the scraping process for {}...", start_url);
    info!("Data will be saved to {}", config.output_path.display());

    let summary = match crawl_to_file(config, fetcher, start_url, &config.output_path).await {
        Ok(summary) => summary,
        Err(e) => return crawl_failed(e),
    };

    info!("Scraping complete. Checking for output file...");
    if summary.records == 0 {
        warn!(
            "No listings were written to '{}'. No email sent.",
            config.output_path.display()
        );
        warn!("This could mean no data was scraped. Please verify the configured CSS selectors.");
        return RunOutcome::NoData(summary);
    }
    info!(
        "CSV file '{}' created successfully with {} listings.",
        config.output_path.display(),
        summary.records
    );

    let body = format!(
        "Please find the scraped real estate data from {} attached.\n\nScraped on {}.",
        start_url,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let mailer = Mailer::new(config.mail.clone());
    match mailer
        .send(recipient, DEFAULT_SUBJECT, &body, &config.output_path)
        .await
    {
        Ok(()) => RunOutcome::Mailed(summary),
        Err(e) => {
            report_mail_error(&e);
            RunOutcome::MailFailed(summary, e)
        }
    }
}

/// The output file is opened here and closed when this returns, whichever
/// way the crawl ends.
async fn crawl_to_file<F: PageFetcher>(
    config: &Config,
    fetcher: F,
    start_url: &str,
    output_path: &Path,
) -> Result<CrawlSummary, ScrapeError> {
    // Refuse before the previous export gets truncated.
    if start_url.trim().is_empty() {
        return Err(ScrapeError::EmptyStartUrl);
    }
    let extractor = ListingExtractor::from_config(&config.selectors)?;
    let crawler = Crawler::new(fetcher, extractor).with_max_pages(config.max_pages);

    let mut sink = CsvSink::create(output_path)?;
    crawler.crawl(start_url, &mut sink).await
}

fn crawl_failed(e: ScrapeError) -> RunOutcome {
    error!("An error occurred during scraping: {}", e);
    RunOutcome::CrawlFailed(e)
}

fn report_mail_error(e: &MailError) {
    error!("Email not sent: {}", e);
    error!("{}", mail_error_hint(e));
}

/// What the user can do about a failed mail step.
fn mail_error_hint(e: &MailError) -> &'static str {
    match e {
        MailError::MissingCredentials(..) => {
            "Please set them before running. For Gmail, you might need an App Password."
        }
        MailError::AttachmentNotFound(_) | MailError::AttachmentUnreadable { .. } => {
            "The export file could not be attached. Skipping email."
        }
        MailError::InvalidAddress { .. } => {
            "Please check the receiver email address and the configured sender address."
        }
        MailError::Message(_) => "The message could not be assembled. Skipping email.",
        MailError::Transport(_) => {
            "Please double-check your email credentials, SMTP server settings, and app password."
        }
    }
}

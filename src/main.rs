use anyhow::Result;
use dialoguer::Input;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{error, info};

use listing_mailer::app::{self, read_answer, required_input, RunOutcome};
use listing_mailer::config::Config;

/// dialoguer draws on stderr, so a redirected stderr falls back to a plain
/// stdout prompt and a line read from stdin.
fn prompt(text: &str) -> Result<String> {
    if !io::stderr().is_terminal() {
        let mut stdout = io::stdout();
        write!(stdout, "{}: ", text)?;
        stdout.flush()?;
        return Ok(read_answer(&mut io::stdin().lock())?);
    }
    let answer = Input::<String>::new()
        .with_prompt(text)
        .allow_empty(true)
        .interact_text()?;
    Ok(answer)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("listing_mailer=info".parse()?),
        )
        .init();

    info!("Welcome to the Website Scraping and Email App!");

    let config = Config::load()?;

    let website_url = prompt(
        "Please enter the URL of the website you want to scrape (e.g., 'https://example.com/real-estate')",
    )?;
    let website_url = match required_input("Website URL", &website_url) {
        Ok(url) => url,
        Err(e) => {
            error!("{}. Exiting.", e);
            return Ok(ExitCode::from(1));
        }
    };

    let receiver_email =
        prompt("Please enter the email address where you want to receive the CSV file")?;
    let receiver_email = match required_input("Receiver email", &receiver_email) {
        Ok(email) => email,
        Err(e) => {
            error!("{}. Exiting.", e);
            return Ok(ExitCode::from(1));
        }
    };

    match app::run(&config, &website_url, &receiver_email).await {
        RunOutcome::Mailed(summary) => {
            info!(
                "Done: {} listings from {} pages mailed to {}",
                summary.records, summary.pages, receiver_email
            );
        }
        RunOutcome::NoData(summary) => {
            info!("Done: {} pages crawled, nothing to send", summary.pages);
        }
        RunOutcome::MailFailed(summary, e) => {
            info!(
                "Done: {} listings kept in {} but not mailed ({})",
                summary.records,
                config.output_path.display(),
                e
            );
        }
        RunOutcome::CrawlFailed(_) => {
            info!("Done: crawl aborted, no email sent");
        }
    }

    Ok(ExitCode::SUCCESS)
}

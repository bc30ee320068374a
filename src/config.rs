use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const CONFIG_FILE: &str = "listing-mailer";
const ENV_PREFIX: &str = "LISTING_MAILER";

pub const SENDER_EMAIL_VAR: &str = "SENDER_EMAIL";
pub const SENDER_PASSWORD_VAR: &str = "SENDER_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    pub obey_robots: bool,
    pub request_timeout_secs: u64,
    pub output_path: PathBuf,
    /// Hard stop for the crawl; `None` follows next links until they run out.
    pub max_pages: Option<usize>,
    pub selectors: SelectorConfig,
    pub mail: MailConfig,
}

/// Everything needed to retarget the extractor at a different site.
///
/// Field selectors may end in `::text` (the default) or `::attr(name)` to read
/// an attribute instead of the element text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub listing: String,
    pub address: String,
    pub price: String,
    pub home_size: String,
    pub lot_size: String,
    pub next_page: String,
    pub next_page_attr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    #[serde(skip)]
    pub sender_email: Option<String>,
    #[serde(skip)]
    pub sender_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            obey_robots: false,
            request_timeout_secs: 30,
            output_path: PathBuf::from("output.csv"),
            max_pages: None,
            selectors: SelectorConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing: "div.listing".to_string(),
            address: "span.address::text".to_string(),
            price: "span.price::text".to_string(),
            home_size: "span.home-size::text".to_string(),
            lot_size: "span.lot-size::text".to_string(),
            next_page: "a.next-page".to_string(),
            next_page_attr: "href".to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_email: None,
            sender_password: None,
        }
    }
}

impl MailConfig {
    /// Picks up the sender identity and secret from the process environment.
    /// Empty values count as missing.
    pub fn with_env_credentials(mut self) -> Self {
        self.sender_email = non_empty_var(SENDER_EMAIL_VAR);
        self.sender_password = non_empty_var(SENDER_PASSWORD_VAR);
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Defaults, then `listing-mailer.toml` if present, then
    /// `LISTING_MAILER__*` environment overrides.
    pub fn load() -> Result<Self> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        let mut config = Self::from_builder(builder)?;
        config.mail = config.mail.with_env_credentials();
        Ok(config)
    }

    fn from_builder(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

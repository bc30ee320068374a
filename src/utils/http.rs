use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::error::ScrapeError;
use crate::scrapers::PageFetcher;
use crate::utils::robots::RobotsTxt;

pub fn create_client(user_agent: &str, timeout: Duration) -> Result<Client, ScrapeError> {
    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;

    Ok(client)
}

/// Plain GET fetcher. A failed request or a non-success status is returned
/// as an error straight away; there is no retry.
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    obey_robots: bool,
    robots: Mutex<HashMap<String, RobotsTxt>>,
}

impl HttpFetcher {
    pub fn new(client: Client, user_agent: &str, obey_robots: bool) -> Self {
        Self {
            client,
            user_agent: user_agent.to_string(),
            obey_robots,
            robots: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let client = create_client(
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::new(client, &config.user_agent, config.obey_robots))
    }

    async fn robots_allows(&self, url: &Url) -> bool {
        let origin = url.origin().ascii_serialization();
        let mut cache = self.robots.lock().await;

        if !cache.contains_key(&origin) {
            let robots = self.fetch_robots(&origin).await;
            cache.insert(origin.clone(), robots);
        }

        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        cache
            .get(&origin)
            .map_or(true, |robots| robots.is_allowed(&self.user_agent, &path))
    }

    /// A missing or unreachable robots.txt allows everything.
    async fn fetch_robots(&self, origin: &str) -> RobotsTxt {
        let robots_url = format!("{}/robots.txt", origin);
        info!("Fetching {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => RobotsTxt::parse(&body),
                Err(e) => {
                    warn!("Could not read {}: {}", robots_url, e);
                    RobotsTxt::default()
                }
            },
            Ok(response) => {
                info!("No robots.txt at {} (HTTP {})", origin, response.status());
                RobotsTxt::default()
            }
            Err(e) => {
                warn!("Could not fetch {}: {}", robots_url, e);
                RobotsTxt::default()
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        if self.obey_robots && !self.robots_allows(url).await {
            warn!("Forbidden by robots.txt: {}", url);
            return Err(ScrapeError::ForbiddenByRobots {
                url: url.to_string(),
            });
        }

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {}: {}", status, url);
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{FetchError, FetchPath, PageFetcher};
use crate::settings::Settings;

/// Plain HTTP GET with a per-request timeout and capped exponential backoff.
pub struct HttpFetcher {
    client: reqwest::Client,
    settings: Settings,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpFetcher {
            client,
            settings: settings.clone(),
        })
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify_error(e))?;
        debug!(
            "GET {} -> {} ({} bytes, {}ms)",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );
        Ok(body)
    }

    fn classify_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.settings.request_timeout())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn path(&self) -> FetchPath {
        FetchPath::Static
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.settings.max_retries => {
                    let backoff = self.settings.backoff(attempt);
                    warn!(
                        "{} on {} (attempt {}/{}), backing off {:.1}s",
                        e,
                        url,
                        attempt + 1,
                        self.settings.max_retries,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

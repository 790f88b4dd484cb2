pub mod http;
pub mod rendered;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpFetcher;
pub use rendered::RenderedFetcher;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("render service error: {0}")]
    Render(String),
    #[error("empty page")]
    Empty,
}

impl FetchError {
    /// Timeouts, connection failures, rate limits and server errors are worth
    /// another attempt; client errors and empty pages are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::Network(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Render(_) | FetchError::Empty => false,
        }
    }
}

/// Which fetch path produced a lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPath {
    Static,
    Rendered,
}

/// A way of turning a URL into page content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn path(&self) -> FetchPath;

    /// Raw markup, used for search-result pages.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;

    /// Visible text, used for price classification.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let html = self.fetch_html(url).await?;
        Ok(crate::parser::text::visible_text(&html))
    }
}

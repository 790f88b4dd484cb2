use std::sync::LazyLock;
use std::time::Instant;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;
use spider_client::shapes::request::{RequestType, ReturnFormat, ReturnFormatHandling};
use spider_client::{RequestParams, Spider};
use tracing::debug;

use super::{FetchError, FetchPath, PageFetcher};

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

/// Fetch through spider.cloud with a headless Chrome request, so prices that
/// are filled in by client-side scripts are present in the returned content.
pub struct RenderedFetcher {
    spider: Spider,
}

impl RenderedFetcher {
    pub fn new(api_key: String) -> Result<Self> {
        let spider =
            Spider::new(Some(api_key)).map_err(|e| anyhow!("Failed to create Spider client: {}", e))?;
        Ok(RenderedFetcher { spider })
    }

    async fn scrape(&self, url: &str, format: ReturnFormat) -> Result<String, FetchError> {
        let params = RequestParams {
            return_format: Some(ReturnFormatHandling::Single(format)),
            request: Some(RequestType::Chrome),
            ..Default::default()
        };

        let start = Instant::now();
        let response = self
            .spider
            .scrape_url(url, Some(params), "application/json")
            .await
            .map_err(|e| FetchError::Render(e.to_string()))?;
        debug!("Rendered {} in {}ms", url, start.elapsed().as_millis());

        first_content(response)
    }
}

/// Spider answers with `[{"content": ..., "status": ...}]`, sometimes wrapped
/// in a JSON string.
fn first_content(value: serde_json::Value) -> Result<String, FetchError> {
    let parsed: serde_json::Value = match value.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(value.clone()),
        None => value,
    };
    let first = parsed.as_array().and_then(|arr| arr.first());

    if let Some(status) = first
        .and_then(|obj| obj.get("status"))
        .and_then(|s| s.as_u64())
        .filter(|s| !(200..300).contains(s))
    {
        let url = first
            .and_then(|obj| obj.get("url"))
            .and_then(|u| u.as_str())
            .unwrap_or_default();
        return Err(FetchError::Status {
            status: status as u16,
            url: url.to_string(),
        });
    }

    first
        .and_then(|obj| obj.get("content"))
        .and_then(|c| c.as_str())
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .ok_or(FetchError::Empty)
}

/// Markdown to plain text: drop images, keep link text, collapse blank runs.
fn markdown_to_text(md: &str) -> String {
    let cleaned = IMAGE_RE.replace_all(md, "");
    let cleaned = LINK_RE.replace_all(&cleaned, "$1");
    crate::parser::text::collapse_whitespace(&cleaned)
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    fn path(&self) -> FetchPath {
        FetchPath::Rendered
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.scrape(url, ReturnFormat::Raw).await
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let md = self.scrape(url, ReturnFormat::Markdown).await?;
        Ok(markdown_to_text(&md))
    }
}

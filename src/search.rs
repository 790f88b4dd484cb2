use tracing::{debug, info};

use crate::catalog::fill_template;
use crate::fetch::{FetchError, PageFetcher};
use crate::parser::extract::links;

/// Web search used for vendors without a search template and for the broad
/// fallback query.
#[derive(Debug, Clone)]
pub struct WebSearch {
    url_template: String,
    engine_host: String,
}

impl WebSearch {
    pub fn new(url_template: &str) -> Self {
        WebSearch {
            url_template: url_template.to_string(),
            engine_host: links::extract_domain(url_template),
        }
    }

    pub fn url_for(&self, query: &str) -> String {
        fill_template(&self.url_template, query)
    }

    /// First result link for `query`, or `None` when the results page has
    /// nothing usable.
    pub async fn first_result(
        &self,
        fetcher: &dyn PageFetcher,
        query: &str,
    ) -> Result<Option<String>, FetchError> {
        let url = self.url_for(query);
        info!("Searching: {}", query);
        let html = fetcher.fetch_html(&url).await?;
        let results = links::extract(&html, &self.engine_host);
        debug!("{} result links for {:?}", results.len(), query);
        Ok(results.into_iter().next())
    }
}

/// `"<terms>" site:<host>`
pub fn site_query(terms: &str, homepage: &str) -> String {
    format!("\"{}\" site:{}", terms, links::extract_domain(homepage))
}

/// `"<terms>" buy price`
pub fn broad_query(terms: &str) -> String {
    format!("\"{}\" buy price", terms)
}

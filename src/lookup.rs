use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{fill_template, UrlBuilder};
use crate::fetch::{FetchPath, PageFetcher};
use crate::parser::extract::{self, links, PriceStatus};
use crate::search::{self, WebSearch};
use crate::suppliers::{SupplierRecord, EMAIL_NOT_PROVIDED};

/// What the user is looking for. At least one field must be non-blank.
#[derive(Debug, Clone)]
pub struct ReagentQuery {
    pub name: Option<String>,
    pub catalog_number: Option<String>,
}

impl ReagentQuery {
    pub fn new(name: Option<String>, catalog_number: Option<String>) -> Result<Self> {
        let clean = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let query = ReagentQuery {
            name: clean(name),
            catalog_number: clean(catalog_number),
        };
        if query.name.is_none() && query.catalog_number.is_none() {
            bail!("Provide a reagent name, a catalog number, or both");
        }
        Ok(query)
    }

    /// `"name catalog"` with blanks dropped.
    pub fn terms(&self) -> String {
        [self.name.as_deref(), self.catalog_number.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    pub company: String,
    pub link: Option<String>,
    pub email: String,
    pub status: PriceStatus,
    pub source: Option<FetchPath>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub query: String,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<LookupResult>,
    pub broad_results: Vec<LookupResult>,
}

/// Sequential price lookup over a supplier list.
pub struct Lookup<'a> {
    pub primary: &'a dyn PageFetcher,
    /// Slow path tried when the primary fetch finds no price.
    pub fallback: Option<&'a dyn PageFetcher>,
    pub search: WebSearch,
    pub delay: Duration,
    pub broad_search: bool,
    pub progress: bool,
}

impl<'a> Lookup<'a> {
    pub async fn run(&self, query: &ReagentQuery, suppliers: &[SupplierRecord]) -> Report {
        let terms = query.terms();
        info!("Looking up {:?} across {} suppliers", terms, suppliers.len());

        let pb = if self.progress {
            let pb = ProgressBar::new(suppliers.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("=> "));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut results = Vec::with_capacity(suppliers.len());
        for (i, supplier) in suppliers.iter().enumerate() {
            pb.set_message(supplier.name.clone());
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            results.push(self.lookup_one(&terms, supplier).await);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let found = results.iter().filter(|r| r.status.is_price()).count();
        let errors = results
            .iter()
            .filter(|r| matches!(r.status, PriceStatus::Error(_)))
            .count();
        info!("{} suppliers: {} priced, {} errors", results.len(), found, errors);

        let broad_results = if self.broad_search && results.iter().all(|r| r.link.is_none()) {
            self.broad_lookup(&terms).await.into_iter().collect()
        } else {
            Vec::new()
        };

        Report {
            query: terms,
            generated_at: Utc::now(),
            results,
            broad_results,
        }
    }

    pub async fn lookup_one(&self, terms: &str, supplier: &SupplierRecord) -> LookupResult {
        let mut result = LookupResult {
            company: supplier.name.clone(),
            link: None,
            email: supplier.email.clone(),
            status: PriceStatus::NotFound,
            source: None,
        };

        let link = match &supplier.locator {
            UrlBuilder::Template(template) => Some(fill_template(template, terms)),
            UrlBuilder::SiteSearch => {
                let q = search::site_query(terms, &supplier.homepage);
                match self.search.first_result(self.primary, &q).await {
                    Ok(link) => link,
                    Err(e) => {
                        warn!("Search failed for {}: {}", supplier.name, e);
                        result.status = PriceStatus::Error(e.to_string());
                        return result;
                    }
                }
            }
        };
        let Some(link) = link else {
            info!("No product link for {}", supplier.name);
            return result;
        };

        result.status = self.fetch_status(self.primary, &supplier.name, &link).await;
        result.source = Some(self.primary.path());

        if let Some(fallback) = self.fallback {
            if !result.status.is_price() {
                let retry = self.fetch_status(fallback, &supplier.name, &link).await;
                if retry.rank() > result.status.rank() {
                    info!("{}: rendered fetch improved {} -> {}", supplier.name, result.status, retry);
                    result.status = retry;
                    result.source = Some(fallback.path());
                }
            }
        }

        result.link = Some(link);
        result
    }

    async fn fetch_status(&self, fetcher: &dyn PageFetcher, company: &str, url: &str) -> PriceStatus {
        match fetcher.fetch_text(url).await {
            Ok(text) => extract::classify(&text),
            Err(e) => {
                warn!("{:?} fetch failed for {} ({}): {}", fetcher.path(), company, url, e);
                PriceStatus::Error(e.to_string())
            }
        }
    }

    /// One unrestricted search when no supplier produced a link.
    async fn broad_lookup(&self, terms: &str) -> Option<LookupResult> {
        let q = search::broad_query(terms);
        let url = match self.search.first_result(self.primary, &q).await {
            Ok(Some(url)) => url,
            Ok(None) => return None,
            Err(e) => {
                warn!("Broad search failed: {}", e);
                return None;
            }
        };

        let (status, email) = match self.primary.fetch_text(&url).await {
            Ok(text) => {
                let facts = extract::extract_all(&text);
                (facts.status, facts.email)
            }
            Err(e) => (PriceStatus::Error(e.to_string()), None),
        };

        Some(LookupResult {
            company: links::extract_domain(&url),
            link: Some(url),
            email: email.unwrap_or_else(|| EMAIL_NOT_PROVIDED.to_string()),
            status,
            source: Some(self.primary.path()),
        })
    }
}

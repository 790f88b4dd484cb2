use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::catalog::CatalogEntryConfig;

const CONFIG_FILE: &str = "reagent_quote";
const ENV_PREFIX: &str = "RQ";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Runtime settings. Defaults, then `reagent_quote.{toml,json,yaml}` if
/// present, then `RQ__*` environment variables; CLI flags are applied last by
/// the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub suppliers_path: PathBuf,
    pub sheet_name: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub delay_ms: u64,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub search_url: String,
    pub broad_search: bool,
    pub render_fallback: bool,
    pub render_api_key: Option<String>,
    pub catalog: Vec<CatalogEntryConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            suppliers_path: PathBuf::from("Company_name_email_address_and_phone_number.xlsx"),
            sheet_name: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            delay_ms: 1000,
            max_retries: 2,
            base_backoff_ms: 1000,
            max_backoff_ms: 8000,
            search_url: "https://www.google.com/search?q={query}".to_string(),
            broad_search: true,
            render_fallback: true,
            render_api_key: None,
            catalog: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Backoff before retry number `attempt` (0-based), doubling from the base
    /// and capped at `max_backoff_ms`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self
            .base_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Render key from settings, falling back to `SPIDER_API_KEY`.
    pub fn render_key(&self) -> Option<String> {
        self.render_api_key
            .clone()
            .or_else(|| std::env::var("SPIDER_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let s = Settings {
            base_backoff_ms: 500,
            max_backoff_ms: 3000,
            ..Settings::default()
        };
        assert_eq!(s.backoff(0), Duration::from_millis(500));
        assert_eq!(s.backoff(1), Duration::from_millis(1000));
        assert_eq!(s.backoff(2), Duration::from_millis(2000));
        assert_eq!(s.backoff(3), Duration::from_millis(3000));
        assert_eq!(s.backoff(40), Duration::from_millis(3000));
    }

    #[test]
    fn partial_source_keeps_defaults() {
        let s: Settings = Config::builder()
            .set_override("delay_ms", 250i64)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(s.delay(), Duration::from_millis(250));
        assert_eq!(s.request_timeout(), Duration::from_secs(10));
        assert!(s.render_fallback);
    }
}

use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CATALOG_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const DEFAULT_CATALOG_PROXY_URL: &str = "https://api.allorigins.win/raw";

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Missing keys are tolerated here; the generation call reports them.
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub catalog_search_url: String,
    pub catalog_proxy_url: String,
    pub catalog_limit: usize,
    pub debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            catalog_search_url: DEFAULT_CATALOG_SEARCH_URL.to_string(),
            catalog_proxy_url: DEFAULT_CATALOG_PROXY_URL.to_string(),
            catalog_limit: 5,
            debounce: Duration::from_millis(400),
        }
    }
}

impl Config {
    /// Build a config from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout = match non_empty("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {raw}"))?,
            ),
            None => defaults.request_timeout,
        };
        let catalog_limit = match non_empty("CATALOG_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("CATALOG_LIMIT is not a number: {raw}"))?,
            None => defaults.catalog_limit,
        };
        let debounce = match non_empty("AUTOCOMPLETE_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .with_context(|| format!("AUTOCOMPLETE_DEBOUNCE_MS is not a number: {raw}"))?,
            ),
            None => defaults.debounce,
        };

        Ok(Config {
            api_key: non_empty("API_KEY").or_else(|| non_empty("GEMINI_API_KEY")),
            model: non_empty("GEMINI_MODEL").unwrap_or(defaults.model),
            gemini_base_url: non_empty("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            request_timeout,
            catalog_search_url: non_empty("CATALOG_SEARCH_URL")
                .unwrap_or(defaults.catalog_search_url),
            catalog_proxy_url: non_empty("CATALOG_PROXY_URL").unwrap_or(defaults.catalog_proxy_url),
            catalog_limit,
            debounce,
        })
    }
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    Config::from_lookup(|key| std::env::var(key).ok())
}

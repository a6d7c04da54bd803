use crate::config::Config;
use crate::models::{CatalogItem, CatalogSearchResponse, SearchKind, Suggestion};
use anyhow::Result;
use tracing::{debug, warn};
use ureq::Agent;
use urlencoding::encode;

/// Shortest term worth sending to the catalog
pub const MIN_QUERY_CHARS: usize = 2;

/// Song / artist name lookup for autocomplete
pub trait CatalogSearch {
    fn search(&self, term: &str, kind: SearchKind) -> Result<Vec<Suggestion>>;
}

/// iTunes Search API reached through a CORS proxy
pub struct ItunesCatalog {
    agent: Agent,
    search_url: String,
    proxy_url: String,
    limit: usize,
}

impl ItunesCatalog {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .build();

        ItunesCatalog {
            agent,
            search_url: config.catalog_search_url.clone(),
            proxy_url: config.catalog_proxy_url.clone(),
            limit: config.catalog_limit,
        }
    }

    /// Full proxied URL for one lookup
    pub fn lookup_url(&self, term: &str, kind: SearchKind) -> String {
        let api_url = format!(
            "{}?term={}&entity={}&limit={}&lang=ja_jp",
            self.search_url,
            encode(term),
            kind.entity(),
            self.limit
        );
        format!("{}?url={}", self.proxy_url, encode(&api_url))
    }
}

impl CatalogSearch for ItunesCatalog {
    fn search(&self, term: &str, kind: SearchKind) -> Result<Vec<Suggestion>> {
        if term.trim().chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let url = self.lookup_url(term.trim(), kind);
        debug!(term, entity = kind.entity(), "catalog lookup");

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| anyhow::anyhow!("Catalog request failed: {}", e))?;
        let response_text = response.into_string()?;

        let parsed: CatalogSearchResponse = serde_json::from_str(&response_text)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog response: {}", e))?;

        Ok(to_suggestions(parsed.results, kind, self.limit))
    }
}

/// Map catalog items to at most `limit` suggestions, dropping blanks and repeated pairs
pub fn to_suggestions(
    items: Vec<CatalogItem>,
    kind: SearchKind,
    limit: usize,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = Vec::new();
    for item in items {
        if suggestions.len() >= limit {
            break;
        }
        let suggestion = match kind {
            SearchKind::Song => match item.track_name {
                Some(track) => Suggestion {
                    primary: track,
                    secondary: item.artist_name,
                },
                None => continue,
            },
            SearchKind::Artist => match item.artist_name {
                Some(artist) => Suggestion {
                    primary: artist,
                    secondary: None,
                },
                None => continue,
            },
        };
        if !suggestions.contains(&suggestion) {
            suggestions.push(suggestion);
        }
    }
    suggestions
}

/// Lookup that never fails: errors are logged and become an empty list
pub fn search_or_empty<C: CatalogSearch + ?Sized>(
    catalog: &C,
    term: &str,
    kind: SearchKind,
) -> Vec<Suggestion> {
    match catalog.search(term, kind) {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!(term, error = %e, "Error fetching suggestions");
            Vec::new()
        }
    }
}

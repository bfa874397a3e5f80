use std::sync::Arc;

use cg_core::config::SearchSettings;
use cg_core::{Engine, Error, Result, SearchContext, SearchProvider, SearchResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

pub mod exa;
pub mod tavily;

pub use exa::ExaSearch;
pub use tavily::TavilySearch;

/// Title used when a result comes back without one.
pub const UNTITLED: &str = "无标题";

/// One search hit, normalized across engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl Hit {
    pub fn new(title: Option<String>, content: String, url: Option<String>) -> Self {
        Self {
            title: title.filter(|t| !t.is_empty()).unwrap_or_else(|| UNTITLED.to_string()),
            content,
            url: url.unwrap_or_default(),
        }
    }
}

/// Renders hits as numbered `[Source n]` blocks separated by a blank line,
/// alongside the citation list in the same order.
pub fn format_blocks(engine: Engine, hits: Vec<Hit>) -> SearchContext {
    let text = hits
        .iter()
        .enumerate()
        .map(|(idx, hit)| {
            format!(
                "[Source {}]\nTitle: {}\nContent: {}\nURL: {}",
                idx + 1,
                hit.title,
                hit.content,
                hit.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let sources = hits
        .into_iter()
        .map(|hit| SearchResult { title: hit.title, uri: hit.url })
        .collect();

    SearchContext { text, sources, engine }
}

/// Builds the adapter for `engine`.
pub fn create_provider(
    engine: Engine,
    client: Arc<Client>,
    settings: &SearchSettings,
) -> Arc<dyn SearchProvider> {
    match engine {
        Engine::Tavily => Arc::new(TavilySearch::with_client(
            client,
            settings.tavily_base_url.clone(),
            settings.tavily_api_key.clone(),
        )),
        Engine::Exa => Arc::new(ExaSearch::with_client(
            client,
            settings.exa_base_url.clone(),
            settings.exa_api_key.clone(),
        )),
    }
}

pub(crate) fn require_key(engine: Engine, api_key: Option<&str>) -> Result<&str> {
    api_key.ok_or_else(|| Error::Search(format!("{} API key is not configured", engine)))
}

/// Maps a raw engine response to its `results` array, failing on non-2xx
/// statuses and on empty result sets.
pub(crate) async fn read_results<T: DeserializeOwned>(
    engine: Engine,
    response: Response,
) -> Result<Vec<T>> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Search(format!("{} Error: {}", engine, status.as_u16())));
    }

    let body: ResultsEnvelope<T> = response
        .json()
        .await
        .map_err(|e| Error::Search(format!("{} Error: {}", engine, e)))?;

    match body.results {
        Some(results) if !results.is_empty() => Ok(results),
        _ => Err(Error::Search(format!("{} No Results", engine))),
    }
}

#[derive(serde::Deserialize)]
struct ResultsEnvelope<T> {
    results: Option<Vec<T>>,
}

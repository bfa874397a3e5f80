use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cg_core::{Engine, Result, SearchContext, SearchProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{format_blocks, read_results, require_key, Hit};

#[derive(Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    include_answer: &'static str,
    search_depth: &'static str,
    max_results: u32,
    time_range: &'static str,
}

#[derive(Deserialize)]
struct TavilyResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

pub struct TavilySearch {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    search_depth: &'static str,
    max_results: u32,
}

impl TavilySearch {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(Arc::new(Client::new()), base_url, api_key)
    }

    pub fn with_client(client: Arc<Client>, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            search_depth: "basic",
            max_results: 10,
        }
    }

    pub fn with_search_depth(mut self, depth: &'static str) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

impl fmt::Debug for TavilySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TavilySearch")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("search_depth", &self.search_depth)
            .field("max_results", &self.max_results)
            .finish()
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn engine(&self) -> Engine {
        Engine::Tavily
    }

    async fn search(&self, query: &str) -> Result<SearchContext> {
        let api_key = require_key(Engine::Tavily, self.api_key.as_deref())?;

        debug!(query, depth = self.search_depth, "querying Tavily");
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&TavilyRequest {
                query,
                include_answer: "basic",
                search_depth: self.search_depth,
                max_results: self.max_results,
                time_range: "month",
            })
            .send()
            .await?;

        let results: Vec<TavilyResult> = read_results(Engine::Tavily, response).await?;
        let hits = results
            .into_iter()
            .map(|r| Hit::new(r.title, r.content.unwrap_or_default(), r.url))
            .collect();
        Ok(format_blocks(Engine::Tavily, hits))
    }
}

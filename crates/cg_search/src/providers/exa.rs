use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cg_core::{Engine, Result, SearchContext, SearchProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{format_blocks, read_results, require_key, Hit};

const HIGHLIGHT_MAX_CHARACTERS: u32 = 4000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    num_results: u32,
    #[serde(rename = "type")]
    kind: &'static str,
    contents: serde_json::Value,
}

#[derive(Deserialize)]
struct ExaResult {
    title: Option<String>,
    url: Option<String>,
    highlights: Option<Vec<String>>,
    snippet: Option<String>,
}

impl ExaResult {
    fn content(highlights: Option<Vec<String>>, snippet: Option<String>) -> String {
        match (highlights, snippet) {
            (Some(highlights), _) => highlights.join("\n"),
            (None, Some(snippet)) if !snippet.is_empty() => snippet,
            _ => "No snippet".to_string(),
        }
    }
}

pub struct ExaSearch {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    num_results: u32,
    kind: &'static str,
}

impl ExaSearch {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(Arc::new(Client::new()), base_url, api_key)
    }

    pub fn with_client(client: Arc<Client>, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            num_results: 10,
            kind: "auto",
        }
    }

    pub fn with_num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }
}

impl fmt::Debug for ExaSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExaSearch")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("num_results", &self.num_results)
            .field("kind", &self.kind)
            .finish()
    }
}

#[async_trait]
impl SearchProvider for ExaSearch {
    fn engine(&self) -> Engine {
        Engine::Exa
    }

    async fn search(&self, query: &str) -> Result<SearchContext> {
        let api_key = require_key(Engine::Exa, self.api_key.as_deref())?;

        debug!(query, kind = self.kind, "querying Exa");
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", api_key)
            .json(&ExaRequest {
                query,
                num_results: self.num_results,
                kind: self.kind,
                contents: json!({ "highlights": { "maxCharacters": HIGHLIGHT_MAX_CHARACTERS } }),
            })
            .send()
            .await?;

        let results: Vec<ExaResult> = read_results(Engine::Exa, response).await?;
        let hits = results
            .into_iter()
            .map(|r| Hit::new(r.title, ExaResult::content(r.highlights, r.snippet), r.url))
            .collect();
        Ok(format_blocks(Engine::Exa, hits))
    }
}

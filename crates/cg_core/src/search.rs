use async_trait::async_trait;

use crate::types::{Engine, SearchContext};
use crate::Result;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Which engine this adapter talks to
    fn engine(&self) -> Engine;

    /// Runs one search. Empty result sets are errors so the caller can fall back.
    async fn search(&self, query: &str) -> Result<SearchContext>;
}

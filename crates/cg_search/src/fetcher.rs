use std::sync::Arc;

use cg_core::config::SearchSettings;
use cg_core::{Engine, Error, Result, SearchContext, SearchProvider};
use reqwest::Client;
use tracing::{info, warn};

use crate::providers::create_provider;

/// Runs a search against the preferred engine and, if that fails, exactly one
/// more time against the other engine.
#[derive(Clone)]
pub struct ContextFetcher {
    tavily: Arc<dyn SearchProvider>,
    exa: Arc<dyn SearchProvider>,
}

impl ContextFetcher {
    pub fn new(tavily: Arc<dyn SearchProvider>, exa: Arc<dyn SearchProvider>) -> Self {
        Self { tavily, exa }
    }

    pub fn from_settings(settings: &SearchSettings) -> Self {
        let client = Arc::new(Client::new());
        Self::new(
            create_provider(Engine::Tavily, client.clone(), settings),
            create_provider(Engine::Exa, client, settings),
        )
    }

    pub fn provider(&self, engine: Engine) -> &Arc<dyn SearchProvider> {
        match engine {
            Engine::Tavily => &self.tavily,
            Engine::Exa => &self.exa,
        }
    }

    pub async fn fetch_context(&self, keyword: &str, primary: Engine) -> Result<SearchContext> {
        let secondary = primary.fallback();

        info!("🔍 Searching {} for {}", primary, keyword);
        let first_error = match self.provider(primary).search(keyword).await {
            Ok(context) => return Ok(context),
            Err(e) => e,
        };
        warn!(
            engine = %primary,
            error = %first_error,
            "Primary search engine ({}) failed, retrying with {}",
            primary,
            secondary
        );

        match self.provider(secondary).search(keyword).await {
            Ok(context) => {
                info!("✅ {} answered after {} failed", secondary, primary);
                Ok(context)
            }
            Err(e) => {
                warn!(engine = %secondary, error = %e, "Fallback search engine failed");
                Err(Error::SearchUnavailable { primary, secondary })
            }
        }
    }
}

impl std::fmt::Debug for ContextFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextFetcher")
            .field("tavily", &self.tavily.engine())
            .field("exa", &self.exa.engine())
            .finish()
    }
}

pub mod fetcher;
pub mod pipeline;
pub mod providers;

pub use fetcher::ContextFetcher;
pub use pipeline::{validate, ArticlePipeline};
pub use providers::{create_provider, format_blocks, ExaSearch, TavilySearch};

pub mod prelude {
    pub use super::fetcher::ContextFetcher;
    pub use super::pipeline::ArticlePipeline;
    pub use cg_core::{ArticleData, Engine, Error, Result, SearchContext, SearchProvider};
}

pub mod config;
pub mod error;
pub mod front_matter;
pub mod models;
pub mod presets;
pub mod search;
pub mod storage;
pub mod types;

pub use config::Settings;
pub use error::{Error, Result};
pub use models::GenerationProvider;
pub use search::SearchProvider;
pub use storage::{DocumentStore, SavedDocument};
pub use types::{
    ArticleData, ChatMessage, Engine, GenerationOptions, Provider, Role, SearchContext,
    SearchResult,
};

pub mod prelude {
    pub use crate::{
        ArticleData, ChatMessage, Engine, Error, GenerationOptions, GenerationProvider, Provider,
        Result, Role, SearchContext, SearchProvider, SearchResult, Settings,
    };
}

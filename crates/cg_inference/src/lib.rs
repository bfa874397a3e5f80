pub mod chat;
pub mod document;
pub mod generator;
pub mod models;
pub mod prompt;

pub mod prelude {
    pub use super::chat::{ChatSession, CHAT_APOLOGY, CHAT_EMPTY_REPLY};
    pub use super::document::DocumentParser;
    pub use super::generator::ArticleGenerator;
    pub use super::models::{create_model, GeminiModel, OpenAiModel, ProviderRegistry};
    pub use cg_core::{ChatMessage, Error, GenerationOptions, Result};
}

pub use chat::ChatSession;
pub use document::DocumentParser;
pub use generator::ArticleGenerator;
pub use models::{create_model, ProviderRegistry};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A web-search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    Tavily,
    Exa,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::Tavily, Engine::Exa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Tavily => "Tavily",
            Engine::Exa => "Exa",
        }
    }

    /// The engine tried when this one fails.
    pub fn fallback(&self) -> Engine {
        match self {
            Engine::Tavily => Engine::Exa,
            Engine::Exa => Engine::Tavily,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::Tavily
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tavily" => Ok(Engine::Tavily),
            "exa" => Ok(Engine::Exa),
            other => Err(Error::InvalidInput(format!("Unknown search engine: {}", other))),
        }
    }
}

/// An LLM backend used for generation and chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAI, Provider::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::OpenAI
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "gemini" => Ok(Provider::Gemini),
            other => Err(Error::InvalidInput(format!("Unknown provider: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub uri: String,
}

/// Grounding material returned by a search: the concatenated per-result text
/// blocks plus the parallel citation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchContext {
    pub text: String,
    pub sources: Vec<SearchResult>,
    /// The engine that actually produced the results.
    pub engine: Engine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub audience: String,
    pub length: String,
    pub style: String,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub provider: Option<Provider>,
}

impl GenerationOptions {
    pub fn provider(&self) -> Provider {
        self.provider.unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("audience", &self.audience),
            ("length", &self.length),
            ("style", &self.style),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleData {
    pub title: String,
    pub content: String,
    pub sources: Vec<SearchResult>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, text: text.into() }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

use std::sync::Arc;

use cg_core::{GenerationProvider, Provider, Settings};
use reqwest::Client;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiModel;
pub use openai::OpenAiModel;

/// Builds the backend for `provider`. Construction never fails; missing
/// credentials surface as `ProviderConfig` on first use.
pub fn create_model(provider: Provider, settings: &Settings) -> Arc<dyn GenerationProvider> {
    let client = Arc::new(Client::new());
    match provider {
        Provider::OpenAI => Arc::new(OpenAiModel::with_client(client, &settings.openai)),
        Provider::Gemini => Arc::new(GeminiModel::with_client(client, &settings.gemini)),
    }
}

/// One backend per provider, chosen per request.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    openai: Arc<dyn GenerationProvider>,
    gemini: Arc<dyn GenerationProvider>,
}

impl ProviderRegistry {
    pub fn new(openai: Arc<dyn GenerationProvider>, gemini: Arc<dyn GenerationProvider>) -> Self {
        Self { openai, gemini }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            create_model(Provider::OpenAI, settings),
            create_model(Provider::Gemini, settings),
        )
    }

    pub fn get(&self, provider: Provider) -> Arc<dyn GenerationProvider> {
        match provider {
            Provider::OpenAI => self.openai.clone(),
            Provider::Gemini => self.gemini.clone(),
        }
    }
}

/// Message text of a provider `error` field, which is either an object with
/// a `message` or a bare string.
pub(crate) fn provider_error_message(error: &serde_json::Value) -> Option<String> {
    match error {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Object(fields) => fields
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
    .filter(|message| !message.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_routes_by_provider() {
        let registry = ProviderRegistry::from_settings(&Settings::default());
        assert_eq!(registry.get(Provider::OpenAI).name(), "OpenAI");
        assert_eq!(registry.get(Provider::Gemini).name(), "Gemini");
    }

    #[test]
    fn test_provider_error_message_shapes() {
        assert_eq!(
            provider_error_message(&json!({"message": "bad key"})),
            Some("bad key".to_string())
        );
        assert_eq!(provider_error_message(&json!("plain")), Some("plain".to_string()));
        assert_eq!(provider_error_message(&json!({"message": ""})), None);
        assert_eq!(provider_error_message(&json!(42)), None);
    }
}

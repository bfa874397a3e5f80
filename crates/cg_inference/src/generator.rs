use cg_core::{ChatMessage, GenerationOptions, Result};
use tracing::info;

use crate::models::ProviderRegistry;
use crate::prompt::{build_system_instruction, user_directive};

/// Turns grounding text into an article body with one provider call.
#[derive(Debug, Clone)]
pub struct ArticleGenerator {
    providers: ProviderRegistry,
}

impl ArticleGenerator {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Returns the provider's text verbatim, or an empty string when it sent
    /// no content.
    pub async fn generate(
        &self,
        keyword: &str,
        raw_data: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        let provider = self.providers.get(options.provider());
        let messages = [
            ChatMessage::system(build_system_instruction(raw_data, options)),
            ChatMessage::user(user_directive(keyword)),
        ];

        info!(
            provider = provider.name(),
            style = %options.style,
            context_len = raw_data.len(),
            "✍️ Generating article for {}",
            keyword
        );
        let text = provider.complete(&messages).await?;
        info!(provider = provider.name(), chars = text.chars().count(), "✨ Article generated");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::style_constraint;
    use async_trait::async_trait;
    use cg_core::{Engine, Error, GenerationProvider, Provider, Role};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct RecordingModel {
        name: &'static str,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl GenerationProvider for RecordingModel {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(format!("reply from {}", self.name))
        }
    }

    #[derive(Debug)]
    struct Unconfigured;

    #[async_trait]
    impl GenerationProvider for Unconfigured {
        fn name(&self) -> &str {
            "Unconfigured"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
            Err(Error::ProviderConfig("missing".to_string()))
        }
    }

    fn options(provider: Option<Provider>) -> GenerationOptions {
        GenerationOptions {
            audience: "产品经理".to_string(),
            length: "≤500".to_string(),
            style: "时间线".to_string(),
            engine: Engine::Exa,
            provider,
        }
    }

    #[tokio::test]
    async fn test_sends_system_and_user_messages_to_selected_provider() {
        let openai = Arc::new(RecordingModel { name: "OpenAI", ..Default::default() });
        let gemini = Arc::new(RecordingModel { name: "Gemini", ..Default::default() });
        let generator = ArticleGenerator::new(ProviderRegistry::new(openai.clone(), gemini.clone()));

        let text = generator
            .generate("量子计算", "[Source 1]\nTitle: t", &options(Some(Provider::Gemini)))
            .await
            .unwrap();
        assert_eq!(text, "reply from Gemini");
        assert!(openai.seen.lock().unwrap().is_empty());

        let seen = gemini.seen.lock().unwrap();
        let messages = &seen[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].text.contains(style_constraint("时间线")));
        assert!(messages[0].text.contains("[Source 1]\nTitle: t"));
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].text.starts_with("话题关键词：量子计算。"));
    }

    #[tokio::test]
    async fn test_defaults_to_openai() {
        let openai = Arc::new(RecordingModel { name: "OpenAI", ..Default::default() });
        let gemini = Arc::new(RecordingModel { name: "Gemini", ..Default::default() });
        let generator = ArticleGenerator::new(ProviderRegistry::new(openai, gemini));

        let text = generator.generate("k", "raw", &options(None)).await.unwrap();
        assert_eq!(text, "reply from OpenAI");
    }

    #[tokio::test]
    async fn test_config_error_propagates() {
        let generator =
            ArticleGenerator::new(ProviderRegistry::new(Arc::new(Unconfigured), Arc::new(Unconfigured)));
        let err = generator.generate("k", "raw", &options(None)).await.unwrap_err();
        assert!(matches!(err, Error::ProviderConfig(_)));
    }
}

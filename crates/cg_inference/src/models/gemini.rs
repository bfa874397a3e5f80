use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cg_core::config::GeminiSettings;
use cg_core::error::truncate_body;
use cg_core::{ChatMessage, Error, GenerationProvider, Result, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider_error_message;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), inline_data: None }
    }

    pub fn inline(mime_type: &str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type: mime_type.to_string(), data }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    /// System messages are joined into one instruction; user and model turns
    /// become `contents`. An empty conversation sends a single empty user turn.
    pub fn from_messages(messages: &[ChatMessage]) -> Self {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in messages {
            match message.role {
                Role::System => system_parts.push(message.text.as_str()),
                Role::User => contents.push(Content {
                    role: Some("user"),
                    parts: vec![Part::text(message.text.clone())],
                }),
                Role::Model => contents.push(Content {
                    role: Some("model"),
                    parts: vec![Part::text(message.text.clone())],
                }),
            }
        }

        if contents.is_empty() {
            contents.push(Content { role: Some("user"), parts: vec![Part::text("")] });
        }

        let system_instruction = (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(system_parts.join("\n\n"))],
        });

        Self { contents, system_instruction }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Google Gemini `generateContent` backend.
pub struct GeminiModel {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiModel {
    pub fn new(settings: &GeminiSettings) -> Self {
        Self::with_client(Arc::new(Client::new()), settings)
    }

    pub fn with_client(client: Arc<Client>, settings: &GeminiSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::ProviderConfig("请在 .env 或环境变量中配置 GEMINI_API_KEY".to_string())
        })
    }

    /// Fails fast when the backend cannot be used at all.
    pub(crate) fn ensure_configured(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    pub(crate) async fn generate_content(&self, request: &GenerateContentRequest) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);

        tracing::debug!(model = %self.model, turns = request.contents.len(), "sending generateContent");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<GenerateContentResponse>(&body).ok();

        if let Some(error) = parsed.as_ref().and_then(|p| p.error.as_ref()) {
            return Err(Error::ProviderHttp {
                status: status.as_u16(),
                body: provider_error_message(error)
                    .unwrap_or_else(|| format!("API Error: {}", status.as_u16())),
            });
        }
        if !status.is_success() {
            return Err(Error::ProviderHttp { status: status.as_u16(), body });
        }

        parsed
            .map(GenerateContentResponse::text)
            .ok_or_else(|| Error::MalformedResponse(truncate_body(&body)))
    }
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl GenerationProvider for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = GenerateContentRequest::from_messages(messages);
        self.generate_content(&request).await
    }
}

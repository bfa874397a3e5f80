use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cg_core::config::OpenAiSettings;
use cg_core::error::truncate_body;
use cg_core::{ChatMessage, Error, GenerationProvider, Result, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::provider_error_message;

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        let role = match message.role {
            Role::System => "system",
            Role::User => "user",
            Role::Model => "assistant",
        };
        Self { role, content: &message.text }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Any endpoint that speaks the OpenAI chat-completions dialect.
pub struct OpenAiModel {
    client: Arc<Client>,
    base_url: Option<String>,
    api_key: Option<String>,
    model: String,
}

impl OpenAiModel {
    pub fn new(settings: &OpenAiSettings) -> Self {
        Self::with_client(Arc::new(Client::new()), settings)
    }

    pub fn with_client(client: Arc<Client>, settings: &OpenAiSettings) -> Self {
        Self {
            client,
            base_url: settings
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.base_url.as_deref(), self.api_key.as_deref()) {
            (Some(base_url), Some(api_key)) => Ok((base_url, api_key)),
            _ => Err(Error::ProviderConfig(
                "请在 .env 或环境变量中配置 LLM_API_BASE_URL 和 LLM_API_KEY".to_string(),
            )),
        }
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl GenerationProvider for OpenAiModel {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let (base_url, api_key) = self.credentials()?;

        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "sending chat completion");
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<ChatResponse>(&body).ok();

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

        let parsed = parsed.ok_or_else(|| Error::MalformedResponse(truncate_body(&body)))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: Option<String>, api_key: Option<&str>) -> OpenAiSettings {
        OpenAiSettings {
            base_url,
            api_key: api_key.map(str::to_string),
            model: "gpt-test".to_string(),
        }
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("you are terse"),
            ChatMessage::user("hi"),
            ChatMessage::model("hello"),
            ChatMessage::user("again"),
        ]
    }

    #[tokio::test]
    async fn test_missing_config_fails_before_network() {
        let model = OpenAiModel::new(&settings(None, Some("sk-test")));
        let err = model.complete(&conversation()).await.unwrap_err();
        assert!(matches!(err, Error::ProviderConfig(_)));

        let model = OpenAiModel::new(&settings(Some("http://127.0.0.1:9".to_string()), None));
        let err = model.complete(&conversation()).await.unwrap_err();
        assert!(matches!(err, Error::ProviderConfig(_)));
    }

    #[tokio::test]
    async fn test_sends_conversation_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-test",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "you are terse"},
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "again"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "# 标题\n正文"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = OpenAiModel::new(&settings(Some(format!("{}/", server.uri())), Some("sk-test")));
        let text = model.complete(&conversation()).await.unwrap();
        assert_eq!(text, "# 标题\n正文");
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let model = OpenAiModel::new(&settings(Some(server.uri()), Some("sk-test")));
        assert_eq!(model.complete(&conversation()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_error_payload_is_provider_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"message": "quota exceeded", "code": "insufficient_quota"}
            })))
            .mount(&server)
            .await;

        let model = OpenAiModel::new(&settings(Some(server.uri()), Some("sk-test")));
        match model.complete(&conversation()).await.unwrap_err() {
            Error::ProviderHttp { status, body } => {
                assert_eq!(status, 200);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_success_status_carries_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let model = OpenAiModel::new(&settings(Some(server.uri()), Some("sk-test")));
        let err = model.complete(&conversation()).await.unwrap_err();
        assert!(matches!(&err, Error::ProviderHttp { status: 503, body } if body == "upstream down"));
        assert_eq!(err.to_string(), "HTTP 503: upstream down");
    }

    #[tokio::test]
    async fn test_unparsable_success_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let model = OpenAiModel::new(&settings(Some(server.uri()), Some("sk-test")));
        let err = model.complete(&conversation()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let model = OpenAiModel::new(&settings(Some("http://x".to_string()), Some("sk-secret")));
        let debug = format!("{:?}", model);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cg_core::presets::{AUDIENCE_PRESETS, LENGTH_PRESETS};
use cg_core::{ArticleData, ChatMessage, Engine, Error, GenerationOptions, Provider, Role, SearchContext};
use cg_inference::prompt::{styles, DEFAULT_STYLE};
use cg_inference::ChatSession;
use cg_storage::{PublishOutcome, PublishRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiJson, ApiResult};
use crate::state::Grounding;
use crate::AppState;

type SharedState = State<Arc<AppState>>;

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} 不能为空", field)));
    }
    Ok(())
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn presets() -> impl IntoResponse {
    Json(json!({
        "audiences": AUDIENCE_PRESETS,
        "lengths": LENGTH_PRESETS,
        "styles": styles(),
        "defaultStyle": DEFAULT_STYLE,
        "engines": Engine::ALL,
        "providers": Provider::ALL,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishConfig {
    pub app_id: String,
    pub app_secret: String,
}

/// Prefills the publish form with the configured credentials.
pub async fn publish_config(State(state): SharedState) -> Json<PublishConfig> {
    let publish = &state.settings.publish;
    Json(PublishConfig {
        app_id: publish.app_id.clone().unwrap_or_default(),
        app_secret: publish.app_secret.clone().unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub keyword: String,
    #[serde(default)]
    pub engine: Engine,
}

pub async fn search(
    State(state): SharedState,
    ApiJson(request): ApiJson<SearchRequest>,
) -> ApiResult<Json<SearchContext>> {
    require("keyword", &request.keyword)?;
    let context = state
        .pipeline
        .fetcher()
        .fetch_context(request.keyword.trim(), request.engine)
        .await?;
    Ok(Json(context))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub keyword: String,
    #[serde(flatten)]
    pub options: GenerationOptions,
}

pub async fn create_article(
    State(state): SharedState,
    ApiJson(request): ApiJson<CreateArticleRequest>,
) -> ApiResult<Json<ArticleData>> {
    cg_search::validate(&request.keyword, &request.options)?;
    let ticket = state.article.ticket();
    let article = state.pipeline.run(&request.keyword, &request.options).await?;
    let article = state.replace_article(ticket, article).await?;
    info!(ticket, title = %article.title, "📰 Article ready");
    Ok(Json(article))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFromTextRequest {
    pub keyword: String,
    pub text: String,
    #[serde(flatten)]
    pub options: GenerationOptions,
}

pub async fn create_article_from_text(
    State(state): SharedState,
    ApiJson(request): ApiJson<ArticleFromTextRequest>,
) -> ApiResult<Json<ArticleData>> {
    cg_search::validate(&request.keyword, &request.options)?;
    require("text", &request.text)?;
    let ticket = state.article.ticket();
    let article = state
        .pipeline
        .run_with_text(&request.keyword, &request.text, &request.options)
        .await?;
    let article = state.replace_article(ticket, article).await?;
    info!(ticket, title = %article.title, "📰 Article ready");
    Ok(Json(article))
}

pub async fn current_article(State(state): SharedState) -> ApiResult<Json<ArticleData>> {
    state
        .article
        .current()
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound("当前没有文章".to_string()).into())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub topic: Option<String>,
    pub context: Option<String>,
    pub provider: Option<Provider>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCreated {
    pub session_id: Uuid,
}

/// Opens a chat grounded on the given context, or on the current article.
/// A supplied context needs a topic unless an article can lend its title.
pub async fn create_chat(
    State(state): SharedState,
    ApiJson(request): ApiJson<CreateChatRequest>,
) -> ApiResult<Json<ChatCreated>> {
    let topic = request.topic.filter(|t| !t.trim().is_empty());
    let current = state.article.current().await;

    let (topic, context, grounding) = match request.context.filter(|c| !c.trim().is_empty()) {
        Some(context) => {
            let topic = topic
                .or_else(|| current.map(|a| a.title))
                .ok_or_else(|| Error::InvalidInput("topic 不能为空".to_string()))?;
            (topic, context, Grounding::Supplied)
        }
        None => {
            let article =
                current.ok_or_else(|| Error::NotFound("当前没有可对话的文章".to_string()))?;
            (topic.unwrap_or(article.title), article.content, Grounding::Article)
        }
    };

    let provider = state.providers().get(request.provider.unwrap_or_default());
    let session_id = state
        .chats
        .insert(ChatSession::new(&topic, &context, provider), grounding)
        .await;
    info!(%session_id, topic = %topic, ?grounding, "💬 Chat session opened");
    Ok(Json(ChatCreated { session_id }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTranscript {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
}

fn session_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("会话不存在: {}", id))
}

pub async fn get_chat(
    State(state): SharedState,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ChatTranscript>> {
    let session = state.chats.get(&id).await.ok_or_else(|| session_not_found(id))?;
    let session = session.lock().await;
    let messages = session
        .transcript()
        .iter()
        .filter(|m| m.role != Role::System)
        .cloned()
        .collect();
    Ok(Json(ChatTranscript { session_id: id, messages }))
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub text: String,
    pub ok: bool,
}

pub async fn send_chat_message(
    State(state): SharedState,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<ChatMessageRequest>,
) -> ApiResult<Json<ChatReply>> {
    require("message", &request.message)?;
    let session = state.chats.get(&id).await.ok_or_else(|| session_not_found(id))?;
    let (text, ok) = session.lock().await.reply(request.message.trim()).await;
    Ok(Json(ChatReply { text, ok }))
}

pub async fn delete_chat(
    State(state): SharedState,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.chats.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id).into())
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveMarkdownRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SaveMarkdownResponse {
    pub filename: String,
    pub path: PathBuf,
}

pub async fn save_markdown(
    State(state): SharedState,
    ApiJson(request): ApiJson<SaveMarkdownRequest>,
) -> ApiResult<Json<SaveMarkdownResponse>> {
    let saved = state.store.save_markdown(&request.content).await?;
    Ok(Json(SaveMarkdownResponse { filename: saved.filename, path: saved.path }))
}

pub async fn publish(
    State(state): SharedState,
    ApiJson(request): ApiJson<PublishRequest>,
) -> ApiResult<Json<PublishOutcome>> {
    require("filename", &request.filename)?;
    let outcome = state
        .publisher
        .spawn(request)
        .await
        .map_err(|e| Error::External(e.into()))??;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDocumentRequest {
    pub pdf_url: String,
    pub prompt: String,
}

pub async fn parse_document(
    State(state): SharedState,
    ApiJson(request): ApiJson<ParseDocumentRequest>,
) -> ApiResult<Json<Value>> {
    let text = state.documents.parse(&request.pdf_url, &request.prompt).await?;
    Ok(Json(json!({ "success": true, "text": text })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::Settings;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::from_settings(Settings::default()))
    }

    fn options(audience: &str) -> GenerationOptions {
        GenerationOptions {
            audience: audience.to_string(),
            length: "500-800".to_string(),
            style: DEFAULT_STYLE.to_string(),
            engine: Engine::Tavily,
            provider: None,
        }
    }

    #[tokio::test]
    async fn test_rejected_request_does_not_supersede_running_one() {
        let state = state();
        let running = state.article.ticket();

        let request = CreateArticleRequest {
            keyword: "   ".to_string(),
            options: options("泛科技读者"),
        };
        assert!(create_article(State(state.clone()), ApiJson(request)).await.is_err());

        let request = ArticleFromTextRequest {
            keyword: "量子".to_string(),
            text: "原文".to_string(),
            options: options(" "),
        };
        assert!(create_article_from_text(State(state.clone()), ApiJson(request))
            .await
            .is_err());

        let request = ArticleFromTextRequest {
            keyword: "量子".to_string(),
            text: "\n".to_string(),
            options: options("泛科技读者"),
        };
        assert!(create_article_from_text(State(state.clone()), ApiJson(request))
            .await
            .is_err());

        assert!(state.article.is_latest(running));
    }

    #[tokio::test]
    async fn test_supplied_context_without_topic_or_article_is_rejected() {
        let state = state();
        let request = CreateChatRequest {
            context: Some("背景资料".to_string()),
            ..Default::default()
        };
        let err = create_chat(State(state.clone()), ApiJson(request)).await.unwrap_err();
        assert!(matches!(err.0, Error::InvalidInput(ref m) if m.contains("topic")));
        assert_eq!(state.chats.len().await, 0);
    }

    #[tokio::test]
    async fn test_supplied_context_borrows_article_title() {
        let state = state();
        let ticket = state.article.ticket();
        let article = ArticleData {
            title: "量子计算".to_string(),
            content: "# 量子计算".to_string(),
            sources: Vec::new(),
            generated_at: chrono::Utc::now(),
        };
        state.replace_article(ticket, article).await.unwrap();

        let request = CreateChatRequest {
            context: Some("背景资料".to_string()),
            ..Default::default()
        };
        let Json(created) = create_chat(State(state.clone()), ApiJson(request)).await.unwrap();
        let session = state.chats.get(&created.session_id).await.unwrap();
        let session = session.lock().await;
        let system = &session.transcript()[0];
        assert_eq!(system.role, Role::System);
        assert!(system.text.contains("量子计算"));
        assert!(system.text.contains("背景资料"));
    }
}

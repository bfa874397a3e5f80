use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cg_core::{ArticleData, DocumentStore, Error, Result, Settings};
use cg_inference::models::GeminiModel;
use cg_inference::{ArticleGenerator, ChatSession, DocumentParser, ProviderRegistry};
use cg_search::{ArticlePipeline, ContextFetcher};
use cg_storage::Publisher;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Holds the most recent article. Each generation request draws a ticket
/// first; only the holder of the newest ticket may commit.
#[derive(Debug, Default)]
pub struct ArticleSlot {
    latest_ticket: AtomicU64,
    current: RwLock<Option<ArticleData>>,
}

impl ArticleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> u64 {
        self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket.load(Ordering::SeqCst) == ticket
    }

    /// Replaces the current article, or fails with `Superseded` when a newer
    /// request was issued meanwhile.
    pub async fn commit(&self, ticket: u64, article: ArticleData) -> Result<ArticleData> {
        let mut current = self.current.write().await;
        if !self.is_latest(ticket) {
            return Err(Error::Superseded);
        }
        *current = Some(article.clone());
        Ok(article)
    }

    pub async fn current(&self) -> Option<ArticleData> {
        self.current.read().await.clone()
    }
}

pub type SharedSession = Arc<Mutex<ChatSession>>;

/// What a chat session was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grounding {
    /// The current article; the session goes away when it is replaced.
    Article,
    /// Context supplied by the caller.
    Supplied,
}

#[derive(Debug)]
struct ChatEntry {
    session: SharedSession,
    grounding: Grounding,
}

/// Live chat sessions keyed by id.
#[derive(Debug, Default)]
pub struct ChatRegistry {
    sessions: RwLock<HashMap<Uuid, ChatEntry>>,
}

impl ChatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: ChatSession, grounding: Grounding) -> Uuid {
        let id = Uuid::new_v4();
        let entry = ChatEntry {
            session: Arc::new(Mutex::new(session)),
            grounding,
        };
        self.sessions.write().await.insert(id, entry);
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(id).map(|e| e.session.clone())
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drops the sessions opened on the current article. Returns how many.
    pub async fn drop_article_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, e| e.grounding != Grounding::Article);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

pub struct AppState {
    pub settings: Settings,
    pub pipeline: ArticlePipeline,
    pub store: Arc<dyn DocumentStore>,
    pub publisher: Publisher,
    pub documents: DocumentParser,
    pub article: ArticleSlot,
    pub chats: ChatRegistry,
}

impl AppState {
    pub fn new(settings: Settings, pipeline: ArticlePipeline, store: Arc<dyn DocumentStore>) -> Self {
        let publisher = Publisher::new(store.clone(), settings.publish.clone());
        let documents = DocumentParser::new(Arc::new(GeminiModel::new(&settings.gemini)));
        Self {
            settings,
            pipeline,
            store,
            publisher,
            documents,
            article: ArticleSlot::new(),
            chats: ChatRegistry::new(),
        }
    }

    /// Wires every component from configuration.
    pub fn from_settings(settings: Settings) -> Self {
        let pipeline = ArticlePipeline::new(
            ContextFetcher::from_settings(&settings.search),
            ArticleGenerator::new(ProviderRegistry::from_settings(&settings)),
            settings.covers.clone(),
        );
        let store = cg_storage::create_store(&settings);
        Self::new(settings, pipeline, store)
    }

    pub fn providers(&self) -> &ProviderRegistry {
        self.pipeline.generator().providers()
    }

    /// Commits a finished article and drops the chats grounded on the old one.
    pub async fn replace_article(&self, ticket: u64, article: ArticleData) -> Result<ArticleData> {
        let article = self.article.commit(ticket, article).await?;
        let dropped = self.chats.drop_article_sessions().await;
        if dropped > 0 {
            debug!(dropped, "Closed chats on the previous article");
        }
        Ok(article)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("settings", &self.settings)
            .field("pipeline", &self.pipeline)
            .field("publisher", &self.publisher)
            .finish()
    }
}

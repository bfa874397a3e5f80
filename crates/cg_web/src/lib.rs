use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod logging;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use logging::init_logging;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/presets", get(handlers::presets))
        .route("/api/config", get(handlers::publish_config))
        .route("/api/search", post(handlers::search))
        .route("/api/articles", post(handlers::create_article))
        .route("/api/articles/from-text", post(handlers::create_article_from_text))
        .route("/api/articles/current", get(handlers::current_article))
        .route("/api/chat", post(handlers::create_chat))
        .route(
            "/api/chat/:id",
            get(handlers::get_chat).delete(handlers::delete_chat),
        )
        .route("/api/chat/:id/messages", post(handlers::send_chat_message))
        .route("/api/save-markdown", post(handlers::save_markdown))
        .route("/api/publish", post(handlers::publish))
        .route("/api/parse-document", post(handlers::parse_document))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> cg_core::Result<()> {
    info!(settings = ?state.settings, "⚙️ Configuration loaded");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use cg_core::{ArticleData, Error, Result};
}

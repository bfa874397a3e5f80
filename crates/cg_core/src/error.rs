use thiserror::Error;

use crate::types::Engine;

/// Longest slice of a raw provider body that ends up in an error message.
pub const MAX_BODY_IN_MESSAGE: usize = 500;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A single search engine failed. The fetcher turns two of these into
    /// `SearchUnavailable`.
    #[error("{0}")]
    Search(String),

    #[error("检索失败：{primary} 及备用 {secondary} 均不可用。")]
    SearchUnavailable { primary: Engine, secondary: Engine },

    #[error("未能获取到任何有效信息，请检查关键词或 API 额度。")]
    EmptyContext,

    #[error("{0}")]
    ProviderConfig(String),

    #[error("HTTP {status}: {}", truncate_body(body))]
    ProviderHttp { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("模型未返回任何内容，请重试。")]
    EmptyGeneration,

    #[error("保存 Markdown 文件失败: {0}")]
    SaveFailure(String),

    #[error("发布失败: {message}")]
    PublishFailure {
        message: String,
        stdout: Option<String>,
        stderr: Option<String>,
    },

    #[error("A newer request replaced this one")]
    Superseded,

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Cuts `body` to `MAX_BODY_IN_MESSAGE` characters, on a char boundary.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_IN_MESSAGE) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

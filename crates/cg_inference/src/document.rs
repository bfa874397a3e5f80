use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cg_core::{Error, Result};
use tracing::{info, instrument};
use url::Url;

use crate::models::gemini::{Content, GenerateContentRequest, Part};
use crate::models::GeminiModel;

const PDF_MIME: &str = "application/pdf";

/// Extracts text from a remote PDF by handing the bytes to Gemini inline.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    gemini: Arc<GeminiModel>,
}

impl DocumentParser {
    pub fn new(gemini: Arc<GeminiModel>) -> Self {
        Self { gemini }
    }

    #[instrument(skip(self, prompt))]
    pub async fn parse(&self, pdf_url: &str, prompt: &str) -> Result<String> {
        let url = Url::parse(pdf_url.trim())
            .map_err(|e| Error::InvalidInput(format!("pdfUrl 无效: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!("pdfUrl 仅支持 http(s): {}", url)));
        }
        if prompt.trim().is_empty() {
            return Err(Error::InvalidInput("prompt 不能为空".to_string()));
        }
        self.gemini.ensure_configured()?;

        let response = self.gemini.client().get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ProviderHttp {
                status: status.as_u16(),
                body: format!("下载 PDF 失败: {}", url),
            });
        }
        let bytes = response.bytes().await?;
        info!(bytes = bytes.len(), "📄 Downloaded document");

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part::text(prompt), Part::inline(PDF_MIME, STANDARD.encode(&bytes))],
            }],
            system_instruction: None,
        };
        self.gemini.generate_content(&request).await
    }
}

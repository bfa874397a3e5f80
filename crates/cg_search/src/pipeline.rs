use chrono::Utc;
use cg_core::front_matter::{self, FrontMatter};
use cg_core::{ArticleData, Error, GenerationOptions, Result, SearchResult};
use cg_inference::ArticleGenerator;
use tracing::{info, instrument};

use crate::fetcher::ContextFetcher;

/// The top-level "generate" action: search (or take provided text), write the
/// article, and wrap it in front-matter.
#[derive(Debug, Clone)]
pub struct ArticlePipeline {
    fetcher: ContextFetcher,
    generator: ArticleGenerator,
    covers: Vec<String>,
}

impl ArticlePipeline {
    pub fn new(fetcher: ContextFetcher, generator: ArticleGenerator, covers: Vec<String>) -> Self {
        Self { fetcher, generator, covers }
    }

    pub fn fetcher(&self) -> &ContextFetcher {
        &self.fetcher
    }

    pub fn generator(&self) -> &ArticleGenerator {
        &self.generator
    }

    #[instrument(skip(self, options), fields(engine = %options.engine))]
    pub async fn run(&self, keyword: &str, options: &GenerationOptions) -> Result<ArticleData> {
        let keyword = validate(keyword, options)?;

        let context = self.fetcher.fetch_context(keyword, options.engine).await?;
        if context.text.trim().is_empty() {
            return Err(Error::EmptyContext);
        }
        info!(sources = context.sources.len(), engine = %context.engine, "📚 Context ready");

        self.compose(keyword, &context.text, context.sources, options).await
    }

    /// Same as `run`, grounded on `text` instead of a search.
    #[instrument(skip(self, text, options))]
    pub async fn run_with_text(
        &self,
        keyword: &str,
        text: &str,
        options: &GenerationOptions,
    ) -> Result<ArticleData> {
        let keyword = validate(keyword, options)?;
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text 不能为空".to_string()));
        }
        info!(chars = text.chars().count(), "📄 Using provided text as context");

        self.compose(keyword, text, Vec::new(), options).await
    }

    async fn compose(
        &self,
        keyword: &str,
        raw_data: &str,
        sources: Vec<SearchResult>,
        options: &GenerationOptions,
    ) -> Result<ArticleData> {
        let generated = self.generator.generate(keyword, raw_data, options).await?;
        let body = front_matter::strip(&generated);
        if body.is_empty() {
            return Err(Error::EmptyGeneration);
        }

        let title = front_matter::first_heading(body).unwrap_or_else(|| keyword.to_string());
        let header = FrontMatter::with_random_cover(title.clone(), &self.covers);

        Ok(ArticleData {
            title,
            content: front_matter::prepend(body, &header),
            sources,
            generated_at: Utc::now(),
        })
    }
}

/// Checks a generation request before any work is started. Returns the
/// trimmed keyword.
pub fn validate<'a>(keyword: &'a str, options: &GenerationOptions) -> Result<&'a str> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::InvalidInput("keyword 不能为空".to_string()));
    }
    options.validate()?;
    Ok(keyword)
}

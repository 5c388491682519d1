pub mod config;
pub mod wikipedia;

use async_trait::async_trait;
use tracing::warn;

use crate::app::Result;
use crate::domain::{ArticleFull, ArticleSection, ArticleSummary};

pub use config::SourceConfig;
pub use wikipedia::WikipediaSource;

/// Upper bound on related articles attached to a full article.
pub const MAX_RELATED: usize = 8;

/// Remote encyclopedia content.
///
/// Only the summary is required for a full article. Section and related
/// lookups degrade to empty results instead of failing the whole fetch.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_random_summary(&self) -> Result<ArticleSummary>;

    async fn fetch_summary_by_title(&self, title: &str) -> Result<ArticleSummary>;

    /// Structured sections, lead first.
    async fn fetch_sections(&self, title: &str) -> Result<Vec<ArticleSection>>;

    /// The rendered body as one synthetic section.
    async fn fetch_raw_content(&self, title: &str) -> Result<Vec<ArticleSection>>;

    /// At most [`MAX_RELATED`] entries; empty on any failure.
    async fn fetch_related(&self, title: &str) -> Vec<ArticleSummary>;

    async fn fetch_full_article(&self, title: &str) -> Result<ArticleFull> {
        let summary = self.fetch_summary_by_title(title).await?;

        let (sections, related) = tokio::join!(
            self.fetch_sections_with_fallback(title),
            self.fetch_related(title)
        );

        Ok(ArticleFull::new(summary, sections, related))
    }

    /// Structured sections, falling back to raw content when they are
    /// missing. Never fails.
    async fn fetch_sections_with_fallback(&self, title: &str) -> Vec<ArticleSection> {
        match self.fetch_sections(title).await {
            Ok(sections) if !sections.is_empty() => return sections,
            Ok(_) => tracing::debug!("No structured sections for '{}', trying raw content", title),
            Err(e) => warn!("Failed to fetch sections for '{}': {}", title, e),
        }

        match self.fetch_raw_content(title).await {
            Ok(sections) => sections,
            Err(e) => {
                warn!("Failed to fetch raw content for '{}': {}", title, e);
                Vec::new()
            }
        }
    }
}

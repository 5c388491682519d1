use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::app::error::{Result, SwipediaError};
use crate::config::Config;
use crate::content::ContentRewriter;
use crate::domain::ArticleFull;
use crate::feed::FeedQueue;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::library::Library;
use crate::source::{ContentSource, WikipediaSource};
use crate::store::sqlite::SqliteStore;
use crate::store::Store;

/// A full article ready for display.
#[derive(Debug, Clone)]
pub struct OpenedArticle {
    pub article: ArticleFull,
    pub saved: bool,
    /// Served from the saved copy because the network fetch failed.
    pub offline: bool,
}

pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub source: Arc<dyn ContentSource>,
    pub feed: FeedQueue,
    pub library: Library,
    pub rewriter: ContentRewriter,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, config: &Config) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let source = Self::wikipedia(config)?;
        Ok(Self::from_parts(source, store, config))
    }

    pub fn in_memory(config: &Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let source = Self::wikipedia(config)?;
        Ok(Self::from_parts(source, store, config))
    }

    fn wikipedia(config: &Config) -> Result<Arc<dyn ContentSource>> {
        let fetcher = HttpFetcher::new(&config.source)?;
        Ok(Arc::new(WikipediaSource::new(fetcher, &config.source)?))
    }

    pub fn from_parts(
        source: Arc<dyn ContentSource>,
        store: Arc<dyn Store>,
        config: &Config,
    ) -> Self {
        let feed = FeedQueue::new(
            source.clone(),
            store.clone(),
            config.feed.clone(),
            config.source.max_concurrency,
        );

        Self {
            library: Library::new(store.clone()),
            rewriter: ContentRewriter::new(&config.source.site_base),
            store,
            source,
            feed,
        }
    }

    /// Fetch and rewrite a full article, falling back to a saved offline copy
    /// when the fetch fails.
    pub async fn open_article(&self, title: &str) -> Result<OpenedArticle> {
        match self.source.fetch_full_article(title).await {
            Ok(mut article) => {
                article.sections = self.rewriter.rewrite_sections(&article.sections);
                let saved = self.library.is_saved(article.id()).await?;
                Ok(OpenedArticle {
                    article,
                    saved,
                    offline: false,
                })
            }
            Err(e) => match self.library.find_offline(title).await? {
                Some(article) => {
                    warn!("Showing offline copy of '{}': {}", title, e);
                    Ok(OpenedArticle {
                        article,
                        saved: true,
                        offline: true,
                    })
                }
                None => Err(e),
            },
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = Config::data_dir().map_err(|e| SwipediaError::Config(e.to_string()))?;
        Ok(data_dir.join("swipedia.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArticleSection;
    use crate::testing::{summary, FakeFetcher};

    const API: &str = "https://en.wikipedia.org/api/rest_v1";

    fn context(fetcher: FakeFetcher) -> AppContext {
        let config = Config::default();
        let source = WikipediaSource::new(fetcher, &config.source).unwrap();
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        AppContext::from_parts(Arc::new(source), store, &config)
    }

    #[tokio::test]
    async fn test_open_article_rewrites_sections() {
        let fetcher = FakeFetcher::new();
        fetcher.respond(
            &format!("{}/page/summary/Rust", API),
            r#"{ "pageid": 1, "title": "Rust" }"#,
        );
        fetcher.respond(
            &format!("{}/page/mobile-sections/Rust", API),
            r#"{ "lead": { "text": "<p><a href=\"./Iron\">Iron</a></p>" } }"#,
        );
        let ctx = context(fetcher);

        let opened = ctx.open_article("Rust").await.unwrap();
        assert!(!opened.offline);
        assert!(!opened.saved);
        assert!(opened.article.sections[0]
            .content
            .contains(r#"href="/article/Iron""#));
    }

    #[tokio::test]
    async fn test_open_article_falls_back_to_offline_copy() {
        let ctx = context(FakeFetcher::new());

        let mut saved = summary("7");
        saved.title = "Offline Topic".to_string();
        let sections = vec![ArticleSection {
            id: "lead".to_string(),
            title: "Introduction".to_string(),
            content: "<p>Cached</p>".to_string(),
            level: 1,
        }];
        ctx.library
            .save_full(&ArticleFull::new(saved, sections, Vec::new()))
            .await
            .unwrap();

        let opened = ctx.open_article("Offline Topic").await.unwrap();
        assert!(opened.offline);
        assert!(opened.saved);
        assert_eq!(opened.article.sections[0].content, "<p>Cached</p>");
    }

    #[tokio::test]
    async fn test_open_article_without_copy_fails() {
        let ctx = context(FakeFetcher::new());
        assert!(ctx.open_article("Nowhere").await.is_err());
    }
}

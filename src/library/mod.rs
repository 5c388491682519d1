use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::app::Result;
use crate::domain::{
    ArticleFull, ArticleSummary, PreferencesUpdate, SavedArticle, UserPreferences,
};
use crate::store::Store;

/// Saved articles and preferences, as used by the detail and saved views.
#[derive(Clone)]
pub struct Library {
    store: Arc<dyn Store>,
}

impl Library {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn save(&self, article: &ArticleSummary) -> Result<SavedArticle> {
        let saved = SavedArticle::from_summary(article.clone(), Utc::now());
        self.store.put(&saved).await?;
        info!("Saved article {} ({})", saved.id(), saved.title());
        Ok(saved)
    }

    /// Save with the full article kept for offline reading.
    pub async fn save_full(&self, article: &ArticleFull) -> Result<SavedArticle> {
        let saved = SavedArticle::from_full(article.clone(), Utc::now());
        self.store.put(&saved).await?;
        info!("Saved article {} ({}) for offline reading", saved.id(), saved.title());
        Ok(saved)
    }

    pub async fn unsave(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        info!("Removed saved article {}", id);
        Ok(())
    }

    /// Flip the saved state. Returns whether the article is saved afterwards.
    pub async fn toggle(&self, article: &ArticleFull) -> Result<bool> {
        if self.is_saved(article.id()).await? {
            self.unsave(article.id()).await?;
            Ok(false)
        } else {
            self.save_full(article).await?;
            Ok(true)
        }
    }

    pub async fn is_saved(&self, id: &str) -> Result<bool> {
        self.store.exists(id).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<SavedArticle>> {
        self.store.get(id).await
    }

    pub async fn list_saved(&self) -> Result<Vec<SavedArticle>> {
        self.store.list_all().await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SavedArticle>> {
        self.store.search(query).await
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    pub async fn mark_viewed(&self, id: &str) -> Result<()> {
        debug!("Marking {} as viewed", id);
        self.store.mark_viewed(id, Utc::now()).await
    }

    /// Offline copy of a saved article, looked up by title.
    pub async fn find_offline(&self, title: &str) -> Result<Option<ArticleFull>> {
        let title = title.trim();
        let found = self
            .store
            .list_all()
            .await?
            .into_iter()
            .find(|a| a.title().eq_ignore_ascii_case(title) && a.offline_content.is_some())
            .and_then(|a| a.offline_content);
        Ok(found)
    }

    pub async fn preferences(&self) -> Result<UserPreferences> {
        self.store.get_preferences().await
    }

    pub async fn update_preferences(&self, update: PreferencesUpdate) -> Result<UserPreferences> {
        self.store.update_preferences(update).await
    }
}

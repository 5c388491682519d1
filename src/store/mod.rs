pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{PreferencesUpdate, SavedArticle, UserPreferences};

pub use sqlite::SqliteStore;

/// Local persistence for saved articles and the preferences singleton.
///
/// Every call is atomic on its own. Failures are reported as persistence
/// errors (see [`crate::app::ErrorKind::Persistence`]).
#[async_trait]
pub trait Store: Send + Sync {
    // Saved articles
    async fn put(&self, article: &SavedArticle) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<SavedArticle>>;
    /// Most recently saved first.
    async fn list_all(&self) -> Result<Vec<SavedArticle>>;
    async fn exists(&self, id: &str) -> Result<bool>;
    async fn count(&self) -> Result<usize>;
    async fn search(&self, query: &str) -> Result<Vec<SavedArticle>>;
    async fn mark_viewed(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    // Preferences
    async fn get_preferences(&self) -> Result<UserPreferences>;
    async fn update_preferences(&self, update: PreferencesUpdate) -> Result<UserPreferences>;
    async fn append_skipped(&self, id: &str) -> Result<()>;
    async fn append_liked(&self, id: &str) -> Result<()>;
}

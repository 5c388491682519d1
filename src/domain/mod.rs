pub mod article;
pub mod preferences;
pub mod title;

pub use article::{ArticleFull, ArticleSection, ArticleSummary, FastFact, SavedArticle, Thumbnail};
pub use preferences::{PreferencesUpdate, Theme, UserPreferences};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// The unit shown on a feed card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub extract: String,
    pub thumbnail: Option<Thumbnail>,
    pub page_url: String,
    pub timestamp: Option<String>,
}

impl ArticleSummary {
    pub fn display_extract(&self) -> &str {
        if self.extract.trim().is_empty() {
            "(No summary available)"
        } else {
            &self.extract
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSection {
    pub id: String,
    pub title: String,
    /// Raw markup as delivered by the content source.
    pub content: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastFact {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFull {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub sections: Vec<ArticleSection>,
    pub related: Vec<ArticleSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_facts: Option<Vec<FastFact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl ArticleFull {
    pub fn new(
        summary: ArticleSummary,
        sections: Vec<ArticleSection>,
        related: Vec<ArticleSummary>,
    ) -> Self {
        Self {
            summary,
            sections,
            related,
            fast_facts: None,
            categories: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedArticle {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub saved_at: DateTime<Utc>,
    pub liked: bool,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub offline_content: Option<ArticleFull>,
}

impl SavedArticle {
    /// Promote a feed summary into a saved record stamped at `saved_at`.
    pub fn from_summary(summary: ArticleSummary, saved_at: DateTime<Utc>) -> Self {
        Self {
            summary,
            saved_at,
            liked: true,
            last_viewed_at: None,
            offline_content: None,
        }
    }

    /// Save a fully loaded article, keeping a copy for offline reading.
    pub fn from_full(article: ArticleFull, saved_at: DateTime<Utc>) -> Self {
        let summary = article.summary.clone();
        Self {
            summary,
            saved_at,
            liked: true,
            last_viewed_at: None,
            offline_content: Some(article),
        }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }

    /// Case-insensitive substring match over title and extract.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.summary.title.to_lowercase().contains(&query)
            || self.summary.extract.to_lowercase().contains(&query)
    }
}

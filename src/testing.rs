//! In-memory fakes shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use crate::app::{Result, SwipediaError};
use crate::domain::{
    ArticleSection, ArticleSummary, PreferencesUpdate, SavedArticle, UserPreferences,
};
use crate::fetcher::Fetcher;
use crate::source::ContentSource;
use crate::store::{SqliteStore, Store};

pub fn summary(id: &str) -> ArticleSummary {
    ArticleSummary {
        id: id.to_string(),
        title: format!("Article {}", id),
        extract: format!("Extract of article {}.", id),
        thumbnail: None,
        page_url: format!("https://en.wikipedia.org/wiki/Article_{}", id),
        timestamp: None,
    }
}

enum FakeResponse {
    Body(Vec<u8>),
    NotFound,
    Fail,
}

/// URL-keyed canned responses. Unknown URLs fail as network errors.
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, FakeResponse>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: &str) {
        self.insert(url, FakeResponse::Body(body.as_bytes().to_vec()));
    }

    pub fn not_found(&self, url: &str) {
        self.insert(url, FakeResponse::NotFound);
    }

    pub fn fail(&self, url: &str) {
        self.insert(url, FakeResponse::Fail);
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn insert(&self, url: &str, response: FakeResponse) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url) {
            Some(FakeResponse::Body(body)) => Ok(body.clone()),
            Some(FakeResponse::NotFound) => Err(SwipediaError::NotFound(url.to_string())),
            Some(FakeResponse::Fail) | None => {
                Err(SwipediaError::Network(format!("connection refused: {}", url)))
            }
        }
    }
}

/// Scripted random summaries.
///
/// Queued results are served first; once the script runs out every call
/// succeeds with a fresh `auto-N` article, unless `fail_when_empty` is set.
/// With a gate installed each random fetch waits for one permit.
#[derive(Default)]
pub struct FakeSource {
    script: Mutex<VecDeque<Result<ArticleSummary>>>,
    random_calls: AtomicUsize,
    fail_when_empty: bool,
    gate: Option<Arc<Semaphore>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_when_empty: true,
            ..Self::default()
        }
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn push_ok(&self, article: ArticleSummary) {
        self.script.lock().unwrap().push_back(Ok(article));
    }

    pub fn push_err(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(SwipediaError::Network("timed out".to_string())));
    }

    pub fn random_calls(&self) -> usize {
        self.random_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn fetch_random_summary(&self) -> Result<ArticleSummary> {
        let call = self.random_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None if self.fail_when_empty => Err(SwipediaError::Network("offline".to_string())),
            None => Ok(summary(&format!("auto-{}", call))),
        }
    }

    async fn fetch_summary_by_title(&self, title: &str) -> Result<ArticleSummary> {
        let mut article = summary(&title.replace(' ', "_"));
        article.title = title.to_string();
        Ok(article)
    }

    async fn fetch_sections(&self, _title: &str) -> Result<Vec<ArticleSection>> {
        Ok(Vec::new())
    }

    async fn fetch_raw_content(&self, _title: &str) -> Result<Vec<ArticleSection>> {
        Ok(Vec::new())
    }

    async fn fetch_related(&self, _title: &str) -> Vec<ArticleSummary> {
        Vec::new()
    }
}

/// SQLite store whose writes can be switched to fail.
pub struct FlakyStore {
    inner: SqliteStore,
    failing: std::sync::atomic::AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().unwrap(),
            failing: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(SwipediaError::Storage("quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn put(&self, article: &SavedArticle) -> Result<()> {
        self.check()?;
        self.inner.put(article).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(id).await
    }

    async fn get(&self, id: &str) -> Result<Option<SavedArticle>> {
        self.inner.get(id).await
    }

    async fn list_all(&self) -> Result<Vec<SavedArticle>> {
        self.inner.list_all().await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }

    async fn search(&self, query: &str) -> Result<Vec<SavedArticle>> {
        self.inner.search(query).await
    }

    async fn mark_viewed(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        self.check()?;
        self.inner.mark_viewed(id, at).await
    }

    async fn get_preferences(&self) -> Result<UserPreferences> {
        self.inner.get_preferences().await
    }

    async fn update_preferences(&self, update: PreferencesUpdate) -> Result<UserPreferences> {
        self.check()?;
        self.inner.update_preferences(update).await
    }

    async fn append_skipped(&self, id: &str) -> Result<()> {
        self.check()?;
        self.inner.append_skipped(id).await
    }

    async fn append_liked(&self, id: &str) -> Result<()> {
        self.check()?;
        self.inner.append_liked(id).await
    }
}

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::SwipediaError;
use crate::domain::ArticleSummary;
use crate::source::ContentSource;

pub const DEFAULT_WORKERS: usize = 5;

/// Outcome of a batch: every success in request order, plus the failures.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub articles: Vec<ArticleSummary>,
    pub errors: Vec<SwipediaError>,
}

pub struct ParallelFetcher {
    source: Arc<dyn ContentSource>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self::with_workers(source, DEFAULT_WORKERS)
    }

    pub fn with_workers(source: Arc<dyn ContentSource>, workers: usize) -> Self {
        Self {
            source,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Request `count` random summaries concurrently and wait for all of them
    /// to settle.
    pub async fn fetch_random_batch(&self, count: usize) -> BatchResult {
        let mut handles = Vec::with_capacity(count);

        for _ in 0..count {
            let source = self.source.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| SwipediaError::Other(e.to_string()))?;
                source.fetch_random_summary().await
            });

            handles.push(handle);
        }

        let mut batch = BatchResult::default();
        for handle in handles {
            match handle.await {
                Ok(Ok(article)) => batch.articles.push(article),
                Ok(Err(e)) => {
                    tracing::warn!("Failed to fetch random article: {}", e);
                    batch.errors.push(e);
                }
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    batch.errors.push(SwipediaError::Other(e.to_string()));
                }
            }
        }

        tracing::info!(
            "Fetched {} of {} random articles",
            batch.articles.len(),
            count
        );
        batch
    }
}

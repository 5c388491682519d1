//! The swipe queue.
//!
//! Holds the fetched summaries and a cursor. Articles before the cursor have
//! been liked or skipped and are never shown again. When fewer than
//! `low_watermark` unseen articles remain a background refill is started.

pub mod config;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::SwipediaError;
use crate::domain::{ArticleSummary, SavedArticle};
use crate::fetcher::parallel::ParallelFetcher;
use crate::gesture::SwipeOutcome;
use crate::source::ContentSource;
use crate::store::Store;

pub use config::FeedConfig;

const EVENT_CAPACITY: usize = 64;

/// Read-only view of the queue at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub current_article: Option<ArticleSummary>,
    pub current_index: usize,
    pub queue_len: usize,
    pub remaining: usize,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Liked(String),
    Skipped(String),
    PersistenceFailed { id: String, message: String },
    BatchLoaded { added: usize, failed: usize },
    BatchFailed(String),
    /// A batch finished after a reset and was dropped.
    BatchDiscarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    AlreadyLoading,
    Loaded { added: usize, failed: usize },
    Failed(String),
    Stale,
}

/// Result of a like or skip. The cursor has advanced even when
/// `persist_error` is set.
#[derive(Debug)]
pub struct Decision {
    pub article: ArticleSummary,
    pub persist_error: Option<SwipediaError>,
}

#[derive(Debug)]
pub enum Committed {
    Liked(Decision),
    Skipped(Decision),
    /// Open the detail view for this title.
    DeepDive(String),
    Nothing,
}

#[derive(Debug, Default)]
struct QueueState {
    queue: Vec<ArticleSummary>,
    current_index: usize,
    is_loading: bool,
    error: Option<String>,
    generation: u64,
}

impl QueueState {
    fn remaining(&self) -> usize {
        self.queue.len() - self.current_index
    }

    fn advance(&mut self) -> Option<ArticleSummary> {
        let article = self.queue.get(self.current_index).cloned()?;
        self.current_index += 1;
        Some(article)
    }

    fn begin_load(&mut self) -> Option<u64> {
        if self.is_loading {
            return None;
        }
        self.is_loading = true;
        self.error = None;
        Some(self.generation)
    }
}

struct Inner {
    store: Arc<dyn Store>,
    prefetcher: ParallelFetcher,
    config: FeedConfig,
    state: Mutex<QueueState>,
    refills: Mutex<Vec<JoinHandle<LoadOutcome>>>,
    events: broadcast::Sender<FeedEvent>,
}

/// Cheap to clone; clones share the same queue.
#[derive(Clone)]
pub struct FeedQueue {
    inner: Arc<Inner>,
}

impl FeedQueue {
    pub fn new(
        source: Arc<dyn ContentSource>,
        store: Arc<dyn Store>,
        config: FeedConfig,
        max_concurrency: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                store,
                prefetcher: ParallelFetcher::with_workers(source, max_concurrency),
                config,
                state: Mutex::new(QueueState::default()),
                refills: Mutex::new(Vec::new()),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state();
        FeedSnapshot {
            current_article: state.queue.get(state.current_index).cloned(),
            current_index: state.current_index,
            queue_len: state.queue.len(),
            remaining: state.remaining(),
            is_loading: state.is_loading,
            error: state.error.clone(),
        }
    }

    pub fn current_article(&self) -> Option<ArticleSummary> {
        let state = self.state();
        state.queue.get(state.current_index).cloned()
    }

    /// Fetch one batch and append the successes. Does nothing while another
    /// load is in flight.
    pub async fn load_more(&self) -> LoadOutcome {
        let generation = match self.state().begin_load() {
            Some(generation) => generation,
            None => return LoadOutcome::AlreadyLoading,
        };
        self.run_load(generation).await
    }

    async fn run_load(&self, generation: u64) -> LoadOutcome {
        let requested = self.inner.config.batch_size;
        let batch = self.inner.prefetcher.fetch_random_batch(requested).await;
        let added = batch.articles.len();
        let failed = batch.errors.len();

        let outcome = {
            let mut state = self.state();
            if state.generation != generation {
                LoadOutcome::Stale
            } else {
                state.is_loading = false;
                if added == 0 && requested > 0 {
                    let message = match batch.errors.first() {
                        Some(e) => format!("Failed to load articles: {}", e),
                        None => "Failed to load articles".to_string(),
                    };
                    state.error = Some(message.clone());
                    LoadOutcome::Failed(message)
                } else {
                    state.queue.extend(batch.articles);
                    LoadOutcome::Loaded { added, failed }
                }
            }
        };

        match &outcome {
            LoadOutcome::Stale => {
                info!("Discarding batch from before reset");
                self.emit(FeedEvent::BatchDiscarded);
            }
            LoadOutcome::Failed(message) => {
                warn!("{}", message);
                self.emit(FeedEvent::BatchFailed(message.clone()));
            }
            LoadOutcome::Loaded { added, failed } => {
                info!("Queued {} articles ({} failed)", added, failed);
                self.emit(FeedEvent::BatchLoaded {
                    added: *added,
                    failed: *failed,
                });
            }
            LoadOutcome::AlreadyLoading => {}
        }

        outcome
    }

    /// Save the current article and move past it.
    pub async fn like(&self) -> Option<Decision> {
        let article = self.take_current()?;

        let saved = SavedArticle::from_summary(article.clone(), Utc::now());
        let mut persist_error = self.inner.store.put(&saved).await.err();
        if let Err(e) = self.inner.store.append_liked(&article.id).await {
            persist_error.get_or_insert(e);
        }

        self.finish_decision(&article, persist_error.as_ref());
        self.emit(FeedEvent::Liked(article.id.clone()));
        Some(Decision {
            article,
            persist_error,
        })
    }

    /// Record the current article as skipped and move past it.
    pub async fn skip(&self) -> Option<Decision> {
        let article = self.take_current()?;

        let persist_error = self.inner.store.append_skipped(&article.id).await.err();

        self.finish_decision(&article, persist_error.as_ref());
        self.emit(FeedEvent::Skipped(article.id.clone()));
        Some(Decision {
            article,
            persist_error,
        })
    }

    pub async fn commit(&self, outcome: SwipeOutcome) -> Committed {
        match outcome {
            SwipeOutcome::Like => self.like().await.map_or(Committed::Nothing, Committed::Liked),
            SwipeOutcome::Skip => self.skip().await.map_or(Committed::Nothing, Committed::Skipped),
            SwipeOutcome::DeepDive => self
                .current_article()
                .map_or(Committed::Nothing, |a| Committed::DeepDive(a.title)),
            SwipeOutcome::None => Committed::Nothing,
        }
    }

    /// Empty the queue. Batches still in flight are discarded when they land.
    pub fn reset(&self) {
        let mut state = self.state();
        let generation = state.generation + 1;
        *state = QueueState {
            generation,
            ..QueueState::default()
        };
    }

    /// Wait for every background refill started so far.
    pub async fn wait_idle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.refills());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    error!("Refill task failed: {}", e);
                }
            }
        }
    }

    /// Read the current article and advance past it in one step, starting a
    /// refill if the queue is running low.
    fn take_current(&self) -> Option<ArticleSummary> {
        let (article, refill) = {
            let mut state = self.state();
            let article = state.advance()?;
            let refill = if state.remaining() < self.inner.config.low_watermark {
                state.begin_load()
            } else {
                None
            };
            (article, refill)
        };

        if let Some(generation) = refill {
            self.spawn_refill(generation);
        }
        Some(article)
    }

    fn spawn_refill(&self, generation: u64) {
        let feed = self.clone();
        let handle = tokio::spawn(async move { feed.run_load(generation).await });

        let mut refills = self.refills();
        refills.retain(|h| !h.is_finished());
        refills.push(handle);
    }

    fn finish_decision(&self, article: &ArticleSummary, persist_error: Option<&SwipediaError>) {
        if let Some(e) = persist_error {
            error!("Failed to persist decision for {}: {}", article.id, e);
            self.emit(FeedEvent::PersistenceFailed {
                id: article.id.clone(),
                message: e.to_string(),
            });
        }
    }

    fn emit(&self, event: FeedEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refills(&self) -> MutexGuard<'_, Vec<JoinHandle<LoadOutcome>>> {
        self.inner
            .refills
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::testing::{summary, FakeSource, FlakyStore};
    use tokio::sync::Semaphore;

    fn feed_with(source: Arc<FakeSource>, store: Arc<dyn Store>) -> FeedQueue {
        FeedQueue::new(source, store, FeedConfig::default(), 5)
    }

    fn memory_store() -> Arc<SqliteStore> {
        Arc::new(SqliteStore::in_memory().unwrap())
    }

    async fn wait_until_loading(feed: &FeedQueue) {
        while !feed.snapshot().is_loading {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_load_more_keeps_successes() {
        let source = Arc::new(FakeSource::failing());
        source.push_ok(summary("1"));
        source.push_err();
        source.push_ok(summary("3"));
        source.push_ok(summary("4"));
        source.push_err();
        let feed = feed_with(source.clone(), memory_store());

        let outcome = feed.load_more().await;
        assert_eq!(outcome, LoadOutcome::Loaded { added: 3, failed: 2 });

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.queue_len, 3);
        assert_eq!(snapshot.current_index, 0);
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
        assert_eq!(source.random_calls(), 5);
    }

    #[tokio::test]
    async fn test_whole_batch_failure_sets_error() {
        let source = Arc::new(FakeSource::failing());
        let feed = feed_with(source, memory_store());

        let outcome = feed.load_more().await;
        assert!(matches!(outcome, LoadOutcome::Failed(_)));

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.queue_len, 0);
        assert!(!snapshot.is_loading);
        assert!(snapshot
            .error
            .unwrap()
            .starts_with("Failed to load articles"));
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_load() {
        let source = Arc::new(FakeSource::failing());
        let feed = feed_with(source.clone(), memory_store());
        feed.load_more().await;
        assert!(feed.snapshot().error.is_some());

        source.push_ok(summary("1"));
        feed.load_more().await;
        let snapshot = feed.snapshot();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.queue_len, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_decisions_each_take_a_distinct_article() {
        const N: usize = 30;
        let source = Arc::new(FakeSource::failing());
        for i in 0..N {
            source.push_ok(summary(&i.to_string()));
        }
        let store = memory_store();
        let config = FeedConfig {
            batch_size: N,
            ..FeedConfig::default()
        };
        let feed = FeedQueue::new(source, store.clone(), config, 5);
        assert_eq!(feed.load_more().await, LoadOutcome::Loaded { added: N, failed: 0 });

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let feed = feed.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        feed.like().await
                    } else {
                        feed.skip().await
                    }
                })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            let decision = handle.await.unwrap().expect("every call has an article");
            assert!(decision.persist_error.is_none());
            ids.insert(decision.article.id);
        }
        feed.wait_idle().await;

        assert_eq!(ids.len(), N);
        assert_eq!(feed.snapshot().current_index, N);
        assert_eq!(store.count().await.unwrap(), N / 2);
        let prefs = store.get_preferences().await.unwrap();
        assert_eq!(prefs.liked_ids.len() + prefs.skipped_ids.len(), N);
    }

    #[tokio::test]
    async fn test_like_saves_and_advances() {
        let store = memory_store();
        let feed = feed_with(Arc::new(FakeSource::new()), store.clone());
        feed.load_more().await;
        let first = feed.current_article().unwrap();

        let decision = feed.like().await.unwrap();
        assert_eq!(decision.article, first);
        assert!(decision.persist_error.is_none());
        assert_eq!(feed.snapshot().current_index, 1);

        let saved = store.get(&first.id).await.unwrap().unwrap();
        assert!(saved.liked);
        let prefs = store.get_preferences().await.unwrap();
        assert_eq!(prefs.liked_ids, vec![first.id.clone()]);
    }

    #[tokio::test]
    async fn test_skip_records_without_saving() {
        let store = memory_store();
        let feed = feed_with(Arc::new(FakeSource::new()), store.clone());
        feed.load_more().await;
        let first = feed.current_article().unwrap();

        feed.skip().await.unwrap();
        assert_eq!(feed.snapshot().current_index, 1);
        assert!(!store.exists(&first.id).await.unwrap());
        let prefs = store.get_preferences().await.unwrap();
        assert_eq!(prefs.skipped_ids, vec![first.id]);
    }

    #[tokio::test]
    async fn test_like_without_current_is_noop() {
        let store = memory_store();
        let feed = feed_with(Arc::new(FakeSource::failing()), store.clone());

        assert!(feed.like().await.is_none());
        assert!(feed.skip().await.is_none());
        assert_eq!(feed.snapshot().current_index, 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cursor_never_passes_queue_end() {
        let source = Arc::new(FakeSource::failing());
        source.push_ok(summary("1"));
        source.push_ok(summary("2"));
        let feed = feed_with(source, memory_store());
        feed.load_more().await;

        for _ in 0..5 {
            feed.skip().await;
            feed.wait_idle().await;
            let snapshot = feed.snapshot();
            assert!(snapshot.current_index <= snapshot.queue_len);
        }
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.current_index, 2);
        assert!(snapshot.current_article.is_none());
    }

    #[tokio::test]
    async fn test_refill_below_watermark() {
        let source = Arc::new(FakeSource::new());
        let feed = feed_with(source.clone(), memory_store());
        feed.load_more().await;

        feed.skip().await;
        feed.skip().await;
        feed.wait_idle().await;
        // Three unseen articles remain, which is not below the watermark.
        assert_eq!(feed.snapshot().queue_len, 5);
        assert_eq!(source.random_calls(), 5);

        feed.skip().await;
        feed.wait_idle().await;
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.queue_len, 10);
        assert_eq!(snapshot.current_index, 3);
        assert_eq!(source.random_calls(), 10);
    }

    #[tokio::test]
    async fn test_load_more_while_loading_does_not_fetch() {
        let gate = Arc::new(Semaphore::new(0));
        let source = Arc::new(FakeSource::new().with_gate(gate.clone()));
        let feed = feed_with(source.clone(), memory_store());

        let background = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.load_more().await })
        };
        wait_until_loading(&feed).await;

        assert_eq!(feed.load_more().await, LoadOutcome::AlreadyLoading);
        assert!(source.random_calls() <= 5);

        gate.add_permits(5);
        let outcome = background.await.unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { added: 5, failed: 0 });
        assert_eq!(source.random_calls(), 5);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_batch() {
        let gate = Arc::new(Semaphore::new(0));
        let source = Arc::new(FakeSource::new().with_gate(gate.clone()));
        let feed = feed_with(source, memory_store());
        let mut events = feed.subscribe();

        let background = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.load_more().await })
        };
        wait_until_loading(&feed).await;

        feed.reset();
        assert!(!feed.snapshot().is_loading);

        gate.add_permits(5);
        assert_eq!(background.await.unwrap(), LoadOutcome::Stale);
        assert_eq!(feed.snapshot().queue_len, 0);
        assert_eq!(events.recv().await.unwrap(), FeedEvent::BatchDiscarded);
    }

    #[tokio::test]
    async fn test_reset_clears_state() {
        let feed = feed_with(Arc::new(FakeSource::new()), memory_store());
        feed.load_more().await;
        feed.skip().await;
        feed.wait_idle().await;

        feed.reset();
        let snapshot = feed.snapshot();
        assert_eq!(snapshot.queue_len, 0);
        assert_eq!(snapshot.current_index, 0);
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_persistence_failure_still_advances() {
        let store = Arc::new(FlakyStore::new());
        let feed = feed_with(Arc::new(FakeSource::new()), store.clone());
        feed.load_more().await;
        let mut events = feed.subscribe();

        store.set_failing(true);
        let decision = feed.like().await.unwrap();
        let err = decision.persist_error.unwrap();
        assert!(err.is_persistence());
        assert_eq!(feed.snapshot().current_index, 1);

        match events.recv().await.unwrap() {
            FeedEvent::PersistenceFailed { id, .. } => assert_eq!(id, decision.article.id),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(
            events.recv().await.unwrap(),
            FeedEvent::Liked(decision.article.id.clone())
        );
    }

    #[tokio::test]
    async fn test_commit_dispatches_outcomes() {
        let store = memory_store();
        let feed = feed_with(Arc::new(FakeSource::new()), store.clone());
        feed.load_more().await;
        let first = feed.current_article().unwrap();

        match feed.commit(SwipeOutcome::DeepDive).await {
            Committed::DeepDive(title) => assert_eq!(title, first.title),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            feed.commit(SwipeOutcome::None).await,
            Committed::Nothing
        ));
        assert_eq!(feed.snapshot().current_index, 0);

        assert!(matches!(
            feed.commit(SwipeOutcome::Like).await,
            Committed::Liked(_)
        ));
        assert!(matches!(
            feed.commit(SwipeOutcome::Skip).await,
            Committed::Skipped(_)
        ));
        assert_eq!(feed.snapshot().current_index, 2);
        assert!(store.exists(&first.id).await.unwrap());
    }
}

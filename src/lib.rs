//! # Swipedia
//!
//! A terminal client for swiping through random Wikipedia articles.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → ContentSource → FeedQueue → UI
//!                                            ↓
//!                                          Store
//! ```
//!
//! Swipe right to like (saves the article), left to skip, up or tap to dive
//! into the full article.
//!
//! ## Quick Start
//!
//! ```bash
//! # Swipe through the feed
//! swipedia
//!
//! # Print a few random summaries
//! swipedia random --count 3
//!
//! # Read or save an article
//! swipedia show "Blue whale"
//! swipedia save "Blue whale"
//!
//! # List saved articles
//! swipedia saved --search whale
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the content
/// source, store, feed queue and library.
pub mod app;

/// Command-line interface using clap.
///
/// - `feed` - Launch the TUI (default)
/// - `random [--count N]` - Print random summaries
/// - `show <title>` / `save <title>` / `unsave <id>`
/// - `saved [--search Q]` - List saved articles
/// - `prefs [--theme T] [--haptics B]`
pub mod cli;

/// Configuration loaded from `~/.config/swipedia/config.toml`.
pub mod config;

/// Article markup rewriting and plain-text rendering.
pub mod content;

/// Core domain models: summaries, full articles, saved articles and
/// preferences.
pub mod domain;

/// The swipe queue with background prefetch.
pub mod feed;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for raw byte fetches
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent random batches with semaphore
pub mod fetcher;

/// Drag gesture interpretation.
pub mod gesture;

/// Saved articles and preferences.
pub mod library;

/// Converts Wikipedia API responses into domain models.
pub mod normalizer;

/// Content sources: the Wikipedia REST and action APIs.
pub mod source;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Terminal user interface.
///
/// Feed card, article detail and saved list views built with ratatui. Mouse
/// drags on the card are swipes.
pub mod tui;

#[cfg(test)]
mod testing;

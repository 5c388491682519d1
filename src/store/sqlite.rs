use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, SwipediaError};
use crate::domain::preferences::insert_unique;
use crate::domain::{
    ArticleFull, ArticleSummary, PreferencesUpdate, SavedArticle, Theme, Thumbnail,
    UserPreferences,
};
use crate::store::Store;

const PREFERENCES_ID: &str = "user-preferences";

const SAVED_COLUMNS: &str = "id, title, extract, thumbnail_url, thumbnail_width, thumbnail_height,
     page_url, timestamp, saved_at, liked, last_viewed_at, offline_content";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| SwipediaError::Storage(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SwipediaError::Storage(format!("connection lock poisoned: {}", e)))
    }

    /// Fixed-width UTC form so that lexical order matches chronological order.
    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn row_to_saved(row: &Row<'_>) -> rusqlite::Result<SavedArticle> {
        let thumbnail_url: Option<String> = row.get(3)?;
        let thumbnail = match thumbnail_url {
            Some(url) => Some(Thumbnail {
                url,
                width: row.get::<_, Option<u32>>(4)?.unwrap_or(0),
                height: row.get::<_, Option<u32>>(5)?.unwrap_or(0),
            }),
            None => None,
        };

        let offline_content = match row.get::<_, Option<String>>(11)? {
            Some(json) => Some(serde_json::from_str::<ArticleFull>(&json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e))
            })?),
            None => None,
        };

        let saved_at_raw: String = row.get(8)?;
        let saved_at = Self::parse_datetime(&saved_at_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                Type::Text,
                format!("invalid saved_at: {}", saved_at_raw).into(),
            )
        })?;

        Ok(SavedArticle {
            summary: ArticleSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                extract: row.get(2)?,
                thumbnail,
                page_url: row.get(6)?,
                timestamp: row.get(7)?,
            },
            saved_at,
            liked: row.get::<_, i32>(9)? != 0,
            last_viewed_at: row
                .get::<_, Option<String>>(10)?
                .and_then(|s| Self::parse_datetime(&s)),
            offline_content,
        })
    }

    fn read_preferences(conn: &Connection) -> Result<UserPreferences> {
        let row = conn
            .query_row(
                "SELECT theme, haptics, interests, skipped_ids, liked_ids
                 FROM preferences WHERE id = ?1",
                params![PREFERENCES_ID],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i32>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((theme, haptics, interests, skipped_ids, liked_ids)) = row else {
            return Ok(UserPreferences::default());
        };

        Ok(UserPreferences {
            theme: theme.parse::<Theme>().unwrap_or_default(),
            haptics: haptics != 0,
            interests: serde_json::from_str(&interests)?,
            skipped_ids: serde_json::from_str(&skipped_ids)?,
            liked_ids: serde_json::from_str(&liked_ids)?,
        })
    }

    fn write_preferences(conn: &Connection, prefs: &UserPreferences) -> Result<()> {
        conn.execute(
            "INSERT INTO preferences (id, theme, haptics, interests, skipped_ids, liked_ids)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                theme = ?2, haptics = ?3, interests = ?4, skipped_ids = ?5, liked_ids = ?6",
            params![
                PREFERENCES_ID,
                prefs.theme.to_string(),
                prefs.haptics as i32,
                serde_json::to_string(&prefs.interests)?,
                serde_json::to_string(&prefs.skipped_ids)?,
                serde_json::to_string(&prefs.liked_ids)?,
            ],
        )?;
        Ok(())
    }

    fn append_id(conn: &mut Connection, list: IdList, id: &str) -> Result<()> {
        let tx = conn.transaction()?;

        let mut prefs = Self::read_preferences(&tx)?;
        let ids = match list {
            IdList::Skipped => &mut prefs.skipped_ids,
            IdList::Liked => &mut prefs.liked_ids,
        };
        if insert_unique(ids, id) {
            Self::write_preferences(&tx, &prefs)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking thread pool so SQLite
    /// I/O never stalls a runtime worker.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| SwipediaError::Storage(format!("connection lock poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| SwipediaError::Storage(format!("store task failed: {}", e)))?
    }
}

#[derive(Debug, Clone, Copy)]
enum IdList {
    Skipped,
    Liked,
}

#[async_trait]
impl Store for SqliteStore {
    async fn put(&self, article: &SavedArticle) -> Result<()> {
        let offline_content = article
            .offline_content
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let summary = article.summary.clone();
        let saved_at = Self::format_datetime(&article.saved_at);
        let liked = article.liked as i32;
        let last_viewed_at = article.last_viewed_at.as_ref().map(Self::format_datetime);

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO saved_articles (id, title, extract, thumbnail_url, thumbnail_width,
                    thumbnail_height, page_url, timestamp, saved_at, liked, last_viewed_at,
                    offline_content, seq)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                    (SELECT COALESCE(MAX(seq), 0) + 1 FROM saved_articles))
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    extract = excluded.extract,
                    thumbnail_url = excluded.thumbnail_url,
                    thumbnail_width = excluded.thumbnail_width,
                    thumbnail_height = excluded.thumbnail_height,
                    page_url = excluded.page_url,
                    timestamp = excluded.timestamp,
                    saved_at = excluded.saved_at,
                    liked = excluded.liked,
                    last_viewed_at = excluded.last_viewed_at,
                    offline_content = excluded.offline_content,
                    seq = excluded.seq",
                params![
                    summary.id,
                    summary.title,
                    summary.extract,
                    summary.thumbnail.as_ref().map(|t| t.url.clone()),
                    summary.thumbnail.as_ref().map(|t| t.width),
                    summary.thumbnail.as_ref().map(|t| t.height),
                    summary.page_url,
                    summary.timestamp,
                    saved_at,
                    liked,
                    last_viewed_at,
                    offline_content,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM saved_articles WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<SavedArticle>> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let result = conn
                .query_row(
                    &format!("SELECT {} FROM saved_articles WHERE id = ?1", SAVED_COLUMNS),
                    params![id],
                    Self::row_to_saved,
                )
                .optional()?;
            Ok(result)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<SavedArticle>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM saved_articles ORDER BY saved_at DESC, seq DESC",
                SAVED_COLUMNS
            ))?;

            let articles = stmt
                .query_map([], Self::row_to_saved)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(articles)
        })
        .await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM saved_articles WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM saved_articles", [], |row| row.get(0))?;
            Ok(count.max(0) as usize)
        })
        .await
    }

    async fn search(&self, query: &str) -> Result<Vec<SavedArticle>> {
        let all = self.list_all().await?;
        Ok(all.into_iter().filter(|a| a.matches(query)).collect())
    }

    async fn mark_viewed(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let id = id.to_string();
        let at = Self::format_datetime(&at);
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE saved_articles SET last_viewed_at = ?1 WHERE id = ?2",
                params![at, id],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_preferences(&self) -> Result<UserPreferences> {
        self.with_conn(|conn| Self::read_preferences(conn)).await
    }

    async fn update_preferences(&self, update: PreferencesUpdate) -> Result<UserPreferences> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let mut prefs = Self::read_preferences(&tx)?;
            prefs.merge(update);
            Self::write_preferences(&tx, &prefs)?;

            tx.commit()?;
            Ok(prefs)
        })
        .await
    }

    async fn append_skipped(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| Self::append_id(conn, IdList::Skipped, &id))
            .await
    }

    async fn append_liked(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| Self::append_id(conn, IdList::Liked, &id))
            .await
    }
}

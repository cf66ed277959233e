//! Response caches keyed by request URL.
//!
//! Entries older than the configured time-to-live count as misses and are
//! replaced on the next store.

use crate::config::CacheBackend;
use crate::error::{PtFoodError, Result};
use chrono::{DateTime, Duration, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};
use rusqlite_migration::{M, Migrations};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage for HTTP response bodies.
pub trait ResponseCache {
    /// Fresh body stored for `url`, if any.
    fn get(&self, url: &str) -> Result<Option<String>>;

    /// Store `body` for `url`, replacing any previous entry.
    fn put(&self, url: &str, body: &str) -> Result<()>;
}

fn is_fresh(fetched_at: DateTime<Utc>, ttl: Duration) -> bool {
    Utc::now() - fetched_at < ttl
}

/// Persistent cache backed by an SQLite file.
pub struct SqliteCache {
    pool: Pool<SqliteConnectionManager>,
    ttl: Duration,
}

impl SqliteCache {
    pub fn new(path: &Path, ttl: Duration) -> Result<Self> {
        Self::with_manager(SqliteConnectionManager::file(path), 4, ttl)
    }

    /// Cache that lives only as long as this value.
    pub fn in_memory(ttl: Duration) -> Result<Self> {
        // Every in-memory connection is its own database, so keep exactly one.
        Self::with_manager(SqliteConnectionManager::memory(), 1, ttl)
    }

    fn with_manager(manager: SqliteConnectionManager, max_size: u32, ttl: Duration) -> Result<Self> {
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(PtFoodError::Pool)?;

        let cache = Self { pool, ttl };
        cache.run_migrations()?;
        Ok(cache)
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(PtFoodError::Pool)
    }

    fn run_migrations(&self) -> Result<()> {
        let mut conn = self.connection()?;

        let migrations = Migrations::new(vec![M::up(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                url TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            );
            "#,
        )]);
        migrations.to_latest(&mut conn)?;
        Ok(())
    }

    /// Store a body with an explicit fetch time.
    pub fn put_at(&self, url: &str, body: &str, fetched_at: DateTime<Utc>) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO responses (url, body, fetched_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET
                body = excluded.body,
                fetched_at = excluded.fetched_at",
            params![url, body, fetched_at.timestamp()],
        )?;
        Ok(())
    }

    /// Delete expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let conn = self.connection()?;
        let cutoff = Utc::now()
            .checked_sub_signed(self.ttl)
            .ok_or_else(|| {
                PtFoodError::Config(format!("Cache TTL {} reaches before the earliest date", self.ttl))
            })?
            .timestamp();
        let removed = conn.execute("DELETE FROM responses WHERE fetched_at <= ?1", params![cutoff])?;
        if removed > 0 {
            tracing::debug!("Purged {} expired cache entries", removed);
        }
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl ResponseCache for SqliteCache {
    fn get(&self, url: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT body, fetched_at FROM responses WHERE url = ?1",
                params![url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.and_then(|(body, fetched_at)| {
            let fetched_at = DateTime::from_timestamp(fetched_at, 0)?;
            is_fresh(fetched_at, self.ttl).then_some(body)
        }))
    }

    fn put(&self, url: &str, body: &str) -> Result<()> {
        self.put_at(url, body, Utc::now())
    }
}

/// In-process cache with the same expiry rules as [`SqliteCache`].
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (String, DateTime<Utc>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn put_at(&self, url: &str, body: &str, fetched_at: DateTime<Utc>) -> Result<()> {
        self.lock()
            .insert(url.to_string(), (body.to_string(), fetched_at));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, url: &str) -> Result<Option<String>> {
        Ok(self
            .lock()
            .get(url)
            .filter(|(_, fetched_at)| is_fresh(*fetched_at, self.ttl))
            .map(|(body, _)| body.clone()))
    }

    fn put(&self, url: &str, body: &str) -> Result<()> {
        self.put_at(url, body, Utc::now())
    }
}

/// Open the cache selected by the settings, purging stale SQLite rows.
pub fn open_cache(backend: &CacheBackend, ttl: Duration) -> Result<Box<dyn ResponseCache>> {
    match backend {
        CacheBackend::Memory => {
            tracing::info!("Response cache disabled, keeping responses in memory");
            Ok(Box::new(MemoryCache::new(ttl)))
        }
        CacheBackend::Sqlite(path) => {
            let cache = SqliteCache::new(path, ttl)?;
            cache.purge_expired()?;
            tracing::info!("Using response cache {:?} ({} entries)", path, cache.len()?);
            Ok(Box::new(cache))
        }
    }
}

impl<T: ResponseCache + ?Sized> ResponseCache for Box<T> {
    fn get(&self, url: &str) -> Result<Option<String>> {
        (**self).get(url)
    }

    fn put(&self, url: &str, body: &str) -> Result<()> {
        (**self).put(url, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://www.wowdb.com/api/item/117";

    #[test]
    fn test_sqlite_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteCache::new(&dir.path().join("cache.sqlite"), Duration::hours(4)).unwrap();

        assert_eq!(cache.get(URL).unwrap(), None);
        cache.put(URL, "({\"ID\":117})").unwrap();
        assert_eq!(cache.get(URL).unwrap().as_deref(), Some("({\"ID\":117})"));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_sqlite_cache_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");
        {
            let cache = SqliteCache::new(&path, Duration::hours(4)).unwrap();
            cache.put(URL, "body").unwrap();
        }
        let cache = SqliteCache::new(&path, Duration::hours(4)).unwrap();
        assert_eq!(cache.get(URL).unwrap().as_deref(), Some("body"));
    }

    #[test]
    fn test_sqlite_cache_expiry() {
        let cache = SqliteCache::in_memory(Duration::hours(4)).unwrap();
        cache.put_at(URL, "stale", Utc::now() - Duration::hours(5)).unwrap();
        assert_eq!(cache.get(URL).unwrap(), None);

        cache.put(URL, "fresh").unwrap();
        assert_eq!(cache.get(URL).unwrap().as_deref(), Some("fresh"));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_sqlite_cache_purge() {
        let cache = SqliteCache::in_memory(Duration::hours(4)).unwrap();
        cache.put_at("a", "old", Utc::now() - Duration::hours(10)).unwrap();
        cache.put("b", "new").unwrap();

        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.len().unwrap(), 1);
        assert_eq!(cache.get("b").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_memory_cache_expiry() {
        let cache = MemoryCache::new(Duration::minutes(30));
        assert!(cache.is_empty());

        cache.put_at(URL, "stale", Utc::now() - Duration::hours(1)).unwrap();
        assert_eq!(cache.get(URL).unwrap(), None);

        cache.put(URL, "fresh").unwrap();
        assert_eq!(cache.get(URL).unwrap().as_deref(), Some("fresh"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_purge_with_huge_ttl_is_error() {
        let cache = SqliteCache::in_memory(Duration::days(365 * 1_000_000)).unwrap();
        assert!(matches!(cache.purge_expired(), Err(PtFoodError::Config(_))));
    }

    #[test]
    fn test_open_cache_backends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responses.sqlite");

        let memory = open_cache(&CacheBackend::Memory, Duration::hours(4)).unwrap();
        memory.put(URL, "body").unwrap();
        assert!(!path.exists());

        let sqlite = open_cache(&CacheBackend::Sqlite(path.clone()), Duration::hours(4)).unwrap();
        sqlite.put(URL, "body").unwrap();
        assert!(path.exists());
        assert_eq!(sqlite.get(URL).unwrap().as_deref(), Some("body"));
    }
}

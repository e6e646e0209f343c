//! SQLite-backed credential storage.
//!
//! One key/value table (`session_store`) in the app-data directory. The
//! token/identity pair is written inside a single transaction, so a crash
//! between the two writes cannot leave a torn pair on disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};

use freightline_auth::UserIdentity;

use crate::persistence::{KEY_REFRESH_TOKEN, KEY_TOKEN, KEY_USER, PersistedPair, TokenPersistence};

/// SQLite-backed token persistence.
///
/// Cheap to clone; the pool is initialized lazily on first use.
#[derive(Debug, Clone)]
pub struct SqliteTokenStore {
    pool: Arc<tokio::sync::Mutex<Option<SqlitePool>>>,
    db_path: Option<PathBuf>,
}

impl SqliteTokenStore {
    /// Store backed by the default per-user database
    /// (`{app_data_dir}/freightline/session.db`).
    pub fn new() -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            db_path: None,
        }
    }

    /// Store backed by an explicit database file. Used by tests.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            pool: Arc::new(tokio::sync::Mutex::new(None)),
            db_path: Some(path.into()),
        }
    }

    async fn get_pool(&self) -> anyhow::Result<SqlitePool> {
        let mut pool_guard = self.pool.lock().await;
        if let Some(pool) = pool_guard.as_ref() {
            return Ok(pool.clone());
        }

        let db_path = match &self.db_path {
            Some(path) => path.clone(),
            None => session_db_path()
                .context("failed to determine session DB path - ensure app data directory is accessible")?,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create session directory at {:?}", parent))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            // Concurrent pool connections otherwise surface raw
            // "database is locked" errors under write contention.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("failed to create SQLite pool for session store at {:?}", db_path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_store (
                key    TEXT PRIMARY KEY,
                value  TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create session_store table")?;

        *pool_guard = Some(pool.clone());
        Ok(pool)
    }

    async fn read_key(&self, key: &str) -> anyhow::Result<Option<String>> {
        let pool = self.get_pool().await?;
        let row = sqlx::query("SELECT value FROM session_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .with_context(|| format!("failed to read session key '{key}'"))?;

        Ok(match row {
            Some(row) => Some(row.try_get::<String, _>("value")?),
            None => None,
        })
    }
}

impl Default for SqliteTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenPersistence for SqliteTokenStore {
    async fn read_pair(&self) -> anyhow::Result<Option<PersistedPair>> {
        let pool = self.get_pool().await?;

        // Both halves come from one statement; a write_pair transaction
        // committing between two separate reads would otherwise yield a
        // token from one session attached to another session's identity.
        let rows = sqlx::query("SELECT key, value FROM session_store WHERE key IN (?1, ?2)")
            .bind(KEY_TOKEN)
            .bind(KEY_USER)
            .fetch_all(&pool)
            .await
            .context("failed to read session pair")?;

        let mut token = None;
        let mut user = None;
        for row in rows {
            let key: String = row.try_get("key")?;
            let value: String = row.try_get("value")?;
            match key.as_str() {
                KEY_TOKEN => token = Some(value),
                KEY_USER => user = Some(value),
                _ => {}
            }
        }

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };

        match serde_json::from_str::<UserIdentity>(&user) {
            Ok(identity) => Ok(Some(PersistedPair {
                access_token: token,
                identity,
            })),
            Err(err) => {
                tracing::warn!("malformed persisted identity, treating as no session: {err}");
                Ok(None)
            }
        }
    }

    async fn write_pair(
        &self,
        access_token: &str,
        identity: &UserIdentity,
    ) -> anyhow::Result<()> {
        let user = serde_json::to_string(identity).context("failed to serialize identity")?;
        let pool = self.get_pool().await?;

        // Both halves of the pair commit together or not at all.
        let mut tx = pool.begin().await.context("failed to begin pair write")?;

        sqlx::query("INSERT OR REPLACE INTO session_store (key, value) VALUES (?1, ?2)")
            .bind(KEY_TOKEN)
            .bind(access_token)
            .execute(&mut *tx)
            .await
            .context("failed to write token")?;

        sqlx::query("INSERT OR REPLACE INTO session_store (key, value) VALUES (?1, ?2)")
            .bind(KEY_USER)
            .bind(&user)
            .execute(&mut *tx)
            .await
            .context("failed to write identity")?;

        tx.commit().await.context("failed to commit pair write")?;
        Ok(())
    }

    async fn read_refresh_token(&self) -> anyhow::Result<Option<String>> {
        self.read_key(KEY_REFRESH_TOKEN).await
    }

    async fn write_refresh_token(&self, refresh_token: &str) -> anyhow::Result<()> {
        let pool = self.get_pool().await?;
        sqlx::query("INSERT OR REPLACE INTO session_store (key, value) VALUES (?1, ?2)")
            .bind(KEY_REFRESH_TOKEN)
            .bind(refresh_token)
            .execute(&pool)
            .await
            .context("failed to write refresh token")?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let pool = self.get_pool().await?;
        sqlx::query("DELETE FROM session_store")
            .execute(&pool)
            .await
            .context("failed to clear session store")?;
        Ok(())
    }
}

/// Resolve the path to the session database:
/// `{app_data_dir}/freightline/session.db`.
fn session_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut dir = base;
    dir.push("freightline");
    dir.push("session.db");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightline_core::UserId;

    fn temp_db(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("freightline-test-{}-{}.db", name, uuid_suffix()));
        path
    }

    fn uuid_suffix() -> String {
        // Unique per test run so parallel tests never share a file.
        format!("{}", std::process::id())
    }

    fn company() -> UserIdentity {
        UserIdentity::Company {
            id: UserId::new(),
            email: "ops@acme.example".to_string(),
            company_name: "Acme Logistics".to_string(),
        }
    }

    #[tokio::test]
    async fn pair_round_trips_through_sqlite() {
        let path = temp_db("roundtrip");
        let store = SqliteTokenStore::at_path(&path);
        let identity = company();

        store.write_pair("tok-9", &identity).await.unwrap();
        store.write_refresh_token("refresh-9").await.unwrap();

        let pair = store.read_pair().await.unwrap().unwrap();
        assert_eq!(pair.access_token, "tok-9");
        assert_eq!(pair.identity, identity);
        assert_eq!(
            store.read_refresh_token().await.unwrap(),
            Some("refresh-9".to_string())
        );

        store.clear().await.unwrap();
        assert!(store.read_pair().await.unwrap().is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn concurrent_writes_never_yield_a_mixed_pair() {
        let path = temp_db("mixed-pair");
        let store = SqliteTokenStore::at_path(&path);

        let alpha = company();
        let beta = UserIdentity::Company {
            id: UserId::new(),
            email: "ops@beta.example".to_string(),
            company_name: "Beta Cargo".to_string(),
        };
        store.write_pair("tok-alpha", &alpha).await.unwrap();

        let writer_store = store.clone();
        let (write_alpha, write_beta) = (alpha.clone(), beta.clone());
        let writer = tokio::spawn(async move {
            for i in 0..200 {
                if i % 2 == 0 {
                    writer_store.write_pair("tok-beta", &write_beta).await.unwrap();
                } else {
                    writer_store.write_pair("tok-alpha", &write_alpha).await.unwrap();
                }
            }
        });

        // Every read must observe a token with its own identity, never a
        // token from one write and the identity from another.
        for _ in 0..200 {
            let pair = store.read_pair().await.unwrap().unwrap();
            match pair.access_token.as_str() {
                "tok-alpha" => assert_eq!(pair.identity, alpha),
                "tok-beta" => assert_eq!(pair.identity, beta),
                other => panic!("unexpected token '{other}'"),
            }
        }

        writer.await.unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn empty_database_reads_as_none() {
        let path = temp_db("empty");
        let store = SqliteTokenStore::at_path(&path);
        assert!(store.read_pair().await.unwrap().is_none());
        assert!(store.read_refresh_token().await.unwrap().is_none());

        let _ = std::fs::remove_file(&path);
    }
}

//! Durable key/value storage for the credential pair.
//!
//! Storage keys are fixed: `token` and `user` form the atomic pair that
//! rehydration depends on; `refresh_token` is persisted alongside but sits
//! outside the pair invariant (a missing refresh token never invalidates a
//! stored pair).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use freightline_auth::UserIdentity;

/// Storage key for the access token (one half of the atomic pair).
pub const KEY_TOKEN: &str = "token";
/// Storage key for the refresh token (outside the pair invariant).
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";
/// Storage key for the serialized identity (the other half of the pair).
pub const KEY_USER: &str = "user";

/// The credential pair restored at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedPair {
    pub access_token: String,
    pub identity: UserIdentity,
}

/// Durable storage for session credentials.
///
/// Contract:
/// - `write_pair` is atomic with respect to both values: a crash or a
///   concurrent reader never observes one written and the other not.
/// - `read_pair` returns `Ok(None)` for absent **or malformed** content; it
///   does not distinguish the two. The caller treats `None` as "no session"
///   and calls `clear` to self-heal.
/// - Errors are infrastructure failures (IO, pool setup). The session store
///   swallows them; they must never crash the application.
#[async_trait]
pub trait TokenPersistence: Send + Sync {
    async fn read_pair(&self) -> anyhow::Result<Option<PersistedPair>>;

    async fn write_pair(
        &self,
        access_token: &str,
        identity: &UserIdentity,
    ) -> anyhow::Result<()>;

    async fn read_refresh_token(&self) -> anyhow::Result<Option<String>>;

    async fn write_refresh_token(&self, refresh_token: &str) -> anyhow::Result<()>;

    /// Remove all stored credentials.
    async fn clear(&self) -> anyhow::Result<()>;
}

/// In-memory persistence.
///
/// Used by tests and for sessions that should not outlive the process.
/// Values are stored as raw strings, exactly like the durable backends, so
/// malformed-content handling is exercised the same way.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw value under a storage key, bypassing serialization.
    /// Lets tests plant corrupted blobs.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    /// Raw value under a storage key, if any.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .expect("memory store lock poisoned")
            .is_empty()
    }
}

#[async_trait]
impl TokenPersistence for MemoryTokenStore {
    async fn read_pair(&self) -> anyhow::Result<Option<PersistedPair>> {
        let entries = self.entries.lock().expect("memory store lock poisoned");
        let (Some(token), Some(user)) = (entries.get(KEY_TOKEN), entries.get(KEY_USER)) else {
            return Ok(None);
        };

        match serde_json::from_str::<UserIdentity>(user) {
            Ok(identity) => Ok(Some(PersistedPair {
                access_token: token.clone(),
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
        let user = serde_json::to_string(identity)?;
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        // Both inserts happen under one lock; readers see neither or both.
        entries.insert(KEY_TOKEN.to_string(), access_token.to_string());
        entries.insert(KEY_USER.to_string(), user);
        Ok(())
    }

    async fn read_refresh_token(&self) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().expect("memory store lock poisoned");
        Ok(entries.get(KEY_REFRESH_TOKEN).cloned())
    }

    async fn write_refresh_token(&self, refresh_token: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        entries.insert(KEY_REFRESH_TOKEN.to_string(), refresh_token.to_string());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        entries.clear();
        Ok(())
    }
}

//! Process-wide session store.
//!
//! `SessionStore` is the **single writer** of session state: only
//! `initialize`, `login` and `logout` mutate it. Every other component reads
//! immutable snapshots via `current_session` or reacts to committed
//! mutations through subscribers. Persistence failures are swallowed here:
//! losing a stored session must never crash the client, only force
//! re-authentication.

use std::sync::{Arc, Mutex};

use freightline_auth::{Session, UserIdentity};

use crate::persistence::TokenPersistence;

type Subscriber = Box<dyn Fn(&Session) + Send + Sync>;

/// Single-writer session state with subscriber notification.
pub struct SessionStore {
    session: Mutex<Session>,
    persistence: Arc<dyn TokenPersistence>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl SessionStore {
    /// Construct a store over the given persistence backend.
    ///
    /// The store starts empty and un-rehydrated; call [`initialize`] once at
    /// startup before evaluating any route gate.
    ///
    /// [`initialize`]: SessionStore::initialize
    pub fn new(persistence: Arc<dyn TokenPersistence>) -> Self {
        Self {
            session: Mutex::new(Session::empty()),
            persistence,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Rehydrate the session from durable storage.
    ///
    /// Absent or malformed stored credentials leave the session empty and
    /// clear persistence (silent self-heal). Whatever the outcome,
    /// `rehydrated` is set exactly once at the end and subscribers are
    /// notified of the committed state. Calling this a second time is a
    /// no-op.
    pub async fn initialize(&self) {
        if self.current_session().rehydrated() {
            tracing::warn!("session store initialized twice; ignoring");
            return;
        }

        let restored = match self.persistence.read_pair().await {
            Ok(Some(pair)) => Some(pair),
            Ok(None) => {
                // Covers both "nothing stored" and "malformed blob". Clearing
                // an already-empty store is harmless, so self-heal both ways.
                if let Err(err) = self.persistence.clear().await {
                    tracing::warn!("failed to clear session storage during rehydration: {err:?}");
                }
                None
            }
            Err(err) => {
                tracing::warn!("failed to read persisted session, starting empty: {err:?}");
                None
            }
        };

        let refresh_token = match self.persistence.read_refresh_token().await {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!("failed to read refresh token: {err:?}");
                None
            }
        };

        let snapshot = {
            let mut session = self.session.lock().expect("session lock poisoned");
            if let Some(pair) = restored {
                tracing::info!(role = %pair.identity.role(), "session restored from storage");
                session.set_authenticated(pair.identity, pair.access_token, refresh_token);
            }
            session.mark_rehydrated();
            session.clone()
        };

        self.notify(&snapshot);
    }

    /// Establish a new authenticated session.
    ///
    /// All four fields are committed under one lock before anything else can
    /// observe the session, subscribers run synchronously at that commit,
    /// then the pair is persisted. Notifying before the persistence awaits
    /// keeps notifications in commit order even when mutators overlap.
    pub async fn login(
        &self,
        identity: UserIdentity,
        access_token: String,
        refresh_token: Option<String>,
    ) {
        let snapshot = {
            let mut session = self.session.lock().expect("session lock poisoned");
            session.set_authenticated(identity, access_token, refresh_token);
            session.clone()
        };
        self.notify(&snapshot);

        // Persist after the in-memory commit; storage failure degrades
        // durability, not the live session.
        if let (Some(identity), Some(token)) = (snapshot.identity(), snapshot.access_token()) {
            if let Err(err) = self.persistence.write_pair(token, identity).await {
                tracing::warn!("failed to persist session: {err:?}");
            }
        }
        if let Some(refresh) = snapshot.refresh_token() {
            if let Err(err) = self.persistence.write_refresh_token(refresh).await {
                tracing::warn!("failed to persist refresh token: {err:?}");
            }
        }
    }

    /// Drop the current session and its persisted copy.
    pub async fn logout(&self) {
        let snapshot = {
            let mut session = self.session.lock().expect("session lock poisoned");
            session.clear();
            session.clone()
        };
        self.notify(&snapshot);

        if let Err(err) = self.persistence.clear().await {
            tracing::warn!("failed to clear persisted session: {err:?}");
        }
    }

    /// Immutable snapshot of the current session.
    pub fn current_session(&self) -> Session {
        self.session.lock().expect("session lock poisoned").clone()
    }

    /// Register an observer called synchronously after each committed
    /// mutation, in registration order.
    pub fn subscribe(&self, subscriber: impl Fn(&Session) + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(Box::new(subscriber));
    }

    fn notify(&self, snapshot: &Session) {
        let subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        for subscriber in subscribers.iter() {
            subscriber(snapshot);
        }
    }
}

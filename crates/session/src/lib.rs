//! `freightline-session`
//!
//! **Responsibility:** durable credential storage and the process-wide
//! session store.
//!
//! This crate provides:
//! - The [`TokenPersistence`] contract (atomic token/identity pair storage)
//! - A SQLite-backed implementation for desktop installs
//! - An in-memory implementation for tests and ephemeral sessions
//! - [`SessionStore`], the single writer of session state, with subscriber
//!   notification and startup rehydration

pub mod persistence;
pub mod sqlite;
pub mod store;

pub use persistence::{MemoryTokenStore, PersistedPair, TokenPersistence};
pub use sqlite::SqliteTokenStore;
pub use store::SessionStore;

//! Client error model.
//!
//! One taxonomy for the whole client. Each variant carries a distinct
//! propagation policy: `Validation` from persistence is recovered locally,
//! `Network`/`Domain` are contained per data source, `Auth` invalidates the
//! session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the client.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientError {
    /// The server was unreachable or the request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The credential was rejected or has expired (HTTP 401).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Locally held data was malformed (e.g. a corrupted persisted session).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server reported a business failure (envelope `success == false`).
    #[error("{0}")]
    Domain(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("not found")]
    NotFound,
}

impl ClientError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Whether this error must invalidate the current session.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

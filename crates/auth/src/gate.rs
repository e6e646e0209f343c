//! Route access gate.
//!
//! The single place where "may this navigation proceed?" is answered. The
//! decision is computed fresh on every evaluation from a session snapshot;
//! nothing here is cached, and nothing here does IO.

use serde::Serialize;

use crate::{Role, Session};

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthDecision {
    /// Rehydration has not completed; no decision can be made yet.
    Pending,
    /// No identity present; the caller should route toward login.
    Unauthenticated,
    /// Authenticated, but the session's role does not match the requirement.
    Forbidden,
    /// The navigation may proceed.
    Authorized,
}

/// Decide route access from a session snapshot and the route's requirement.
///
/// `required` of `None` means "any authenticated role".
///
/// The rehydration check comes first and is unconditional: before the
/// persisted session has been restored, *no* authorization decision is made.
/// This is what prevents the startup flicker where a returning user is
/// briefly redirected to login.
///
/// - No IO
/// - No panics
/// - Deterministic in its inputs
pub fn decide(session: &Session, required: Option<Role>) -> AuthDecision {
    if !session.rehydrated() {
        return AuthDecision::Pending;
    }

    let Some(identity) = session.identity() else {
        return AuthDecision::Unauthenticated;
    };

    match required {
        Some(role) if identity.role() != role => AuthDecision::Forbidden,
        _ => AuthDecision::Authorized,
    }
}

//! Navigation glue: one gate evaluation per navigation attempt.

use freightline_auth::{AuthDecision, Session, decide, route_requirement};

/// What the shell should do with a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Rehydration in flight: render a neutral waiting state, navigate
    /// nowhere.
    Wait,
    /// Render the requested view.
    Render,
    /// Send the user to the login view.
    RedirectToLogin,
    /// Send the user to a safe default for their role.
    RedirectTo(&'static str),
}

/// Evaluate a navigation attempt against the current session snapshot.
///
/// The gate runs exactly once per attempt; the decision is never cached
/// across session changes.
pub fn navigate(session: &Session, path: &str) -> Navigation {
    let Some(required) = route_requirement(path) else {
        // Public route.
        return Navigation::Render;
    };

    match decide(session, required) {
        AuthDecision::Pending => Navigation::Wait,
        AuthDecision::Unauthenticated => Navigation::RedirectToLogin,
        AuthDecision::Forbidden => match session.role() {
            Some(role) => Navigation::RedirectTo(role.home_path()),
            // Forbidden always carries an identity; a missing role leaves
            // login as the only safe target.
            None => Navigation::RedirectToLogin,
        },
        AuthDecision::Authorized => Navigation::Render,
    }
}

use crate::{Role, UserIdentity};

/// Process-wide record of the current authenticated identity and credentials.
///
/// # Invariants
/// - `identity` and `access_token` are either both present or both absent;
///   there is no partial session. Fields are private and only the mutators
///   below exist, so a torn state is unrepresentable from outside.
/// - `rehydrated` transitions false→true exactly once per process lifetime
///   and never back.
///
/// The store hands out clones as immutable snapshots; only the session store
/// mutates the live value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<UserIdentity>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    rehydrated: bool,
}

impl Session {
    /// The empty, not-yet-rehydrated session a process starts with.
    pub fn empty() -> Self {
        Self {
            identity: None,
            access_token: None,
            refresh_token: None,
            rehydrated: false,
        }
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// Role derived from the identity tag. Never stored separately, so it
    /// cannot drift from the identity.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(UserIdentity::role)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn rehydrated(&self) -> bool {
        self.rehydrated
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Populate all credential fields at once (login or rehydration).
    pub fn set_authenticated(
        &mut self,
        identity: UserIdentity,
        access_token: String,
        refresh_token: Option<String>,
    ) {
        self.identity = Some(identity);
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
    }

    /// Clear all credential fields at once (logout or irrecoverable
    /// rehydration failure). The rehydration flag is untouched.
    pub fn clear(&mut self) {
        self.identity = None;
        self.access_token = None;
        self.refresh_token = None;
    }

    /// Mark rehydration as complete. Monotone: once set, stays set.
    pub fn mark_rehydrated(&mut self) {
        self.rehydrated = true;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use freightline_core::ClientError;

/// Role of an authenticated account.
///
/// The role set is closed: every account is exactly one of these, and the
/// role tag on [`crate::UserIdentity`] is authoritative. Nothing in the
/// client ever infers a role from which fields happen to be populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Company,
    Driver,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Company => "company",
            Role::Driver => "driver",
            Role::Admin => "admin",
        }
    }

    /// The default landing path for this role, used when a navigation is
    /// rejected and the user is sent back somewhere safe.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Company => "/company/dashboard",
            Role::Driver => "/driver/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "company" => Ok(Role::Company),
            "driver" => Ok(Role::Driver),
            "admin" => Ok(Role::Admin),
            other => Err(ClientError::validation(format!("unknown role '{other}'"))),
        }
    }
}

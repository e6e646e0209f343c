use serde::{Deserialize, Serialize};

use freightline_core::{UserId, VehicleId};

use crate::Role;

/// Identity of the authenticated account, tagged by role.
///
/// The `role` tag in the serialized form is authoritative; role-specific
/// fields are only reachable after narrowing on the variant. This is the
/// wire shape of the `user` object returned by the login endpoint and of
/// the persisted `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum UserIdentity {
    Company {
        id: UserId,
        email: String,
        company_name: String,
    },
    Driver {
        id: UserId,
        email: String,
        name: String,
        /// Vehicles registered to this driver. Interest submission requires
        /// picking one of these explicitly.
        #[serde(default)]
        vehicles: Vec<VehicleId>,
    },
    Admin {
        id: UserId,
        email: String,
        name: String,
    },
}

impl UserIdentity {
    pub fn role(&self) -> Role {
        match self {
            UserIdentity::Company { .. } => Role::Company,
            UserIdentity::Driver { .. } => Role::Driver,
            UserIdentity::Admin { .. } => Role::Admin,
        }
    }

    pub fn id(&self) -> UserId {
        match self {
            UserIdentity::Company { id, .. }
            | UserIdentity::Driver { id, .. }
            | UserIdentity::Admin { id, .. } => *id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            UserIdentity::Company { email, .. }
            | UserIdentity::Driver { email, .. }
            | UserIdentity::Admin { email, .. } => email,
        }
    }

    /// Role-appropriate display name (company name for companies, personal
    /// name otherwise).
    pub fn display_name(&self) -> &str {
        match self {
            UserIdentity::Company { company_name, .. } => company_name,
            UserIdentity::Driver { name, .. } | UserIdentity::Admin { name, .. } => name,
        }
    }
}

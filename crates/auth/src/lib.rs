//! `freightline-auth`: pure session/authorization model.
//!
//! This crate is intentionally decoupled from HTTP and storage: it holds the
//! session value type, the role-tagged identity union and the route gate.
//! Everything here is deterministic and side-effect-free.

pub mod gate;
pub mod identity;
pub mod role;
pub mod routes;
pub mod session;

pub use gate::{AuthDecision, decide};
pub use identity::UserIdentity;
pub use role::Role;
pub use routes::route_requirement;
pub use session::Session;

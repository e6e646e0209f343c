//! Static routing table: path → access requirement.

use crate::Role;

/// Look up the access requirement for a path.
///
/// - `None`: the route is public (login, registration, landing page).
/// - `Some(None)`: any authenticated role may enter.
/// - `Some(Some(role))`: only the given role may enter.
pub fn route_requirement(path: &str) -> Option<Option<Role>> {
    match path {
        p if in_subtree(p, "/company") => Some(Some(Role::Company)),
        p if in_subtree(p, "/driver") => Some(Some(Role::Driver)),
        p if in_subtree(p, "/admin") => Some(Some(Role::Admin)),
        p if p.starts_with("/freights/") => Some(None),
        "/profile" => Some(None),
        _ => None,
    }
}

/// Matches the subtree root itself and everything under it.
fn in_subtree(path: &str, root: &str) -> bool {
    path == root || (path.starts_with(root) && path.as_bytes()[root.len()] == b'/')
}

//! API-side authorization guard.
//!
//! Enforces RBAC at the route boundary, keeping the domain crates
//! auth-agnostic. Tokens carry roles only; the role→permission expansion
//! lives here until a real policy source exists.

use libris_auth::{AuthzError, Membership, Permission, Principal, Role, authorize};

use crate::context::PrincipalContext;

/// Check that the request's principal holds `permission`.
pub fn require(principal: &PrincipalContext, permission: &str) -> Result<(), AuthzError> {
    let membership = Membership {
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };

    let principal = Principal {
        principal_id: principal.principal_id(),
        membership,
    };

    authorize(&principal, &Permission::new(permission.to_string()))
}

/// Static role→permission mapping.
///
/// - `admin`: everything.
/// - `librarian`: full catalog, member, circulation, and taxonomy
///   management, plus the dashboard.
/// - `reader`: read access plus borrow/return/pay on their own loans.
fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    let mut permissions = Vec::new();

    for role in roles {
        match role.as_str() {
            "admin" => return vec![Permission::new("*")],
            "librarian" => permissions.extend([
                Permission::new("catalog.read"),
                Permission::new("catalog.manage"),
                Permission::new("members.read"),
                Permission::new("members.manage"),
                Permission::new("circulation.read"),
                Permission::new("circulation.borrow"),
                Permission::new("circulation.manage"),
                Permission::new("taxonomy.read"),
                Permission::new("taxonomy.manage"),
                Permission::new("dashboard.read"),
            ]),
            "reader" => permissions.extend([
                Permission::new("catalog.read"),
                Permission::new("taxonomy.read"),
                Permission::new("circulation.read"),
                Permission::new("circulation.borrow"),
            ]),
            _ => {}
        }
    }

    permissions
}

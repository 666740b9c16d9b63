use thiserror::Error;

use crate::{Membership, Permission, PrincipalId};

/// An authenticated principal with its granted roles/permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub membership: Membership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission `{required}`")]
    Forbidden { required: Permission },
}

/// Pure RBAC check: does the principal hold `required`?
///
/// A wildcard permission (`"*"`) grants everything.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = &principal.membership.permissions;

    if granted.iter().any(|p| p.is_wildcard() || p == required) {
        return Ok(());
    }

    Err(AuthzError::Forbidden {
        required: required.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn principal(permissions: Vec<Permission>) -> Principal {
        Principal {
            principal_id: PrincipalId::new(),
            membership: Membership {
                roles: vec![Role::new("librarian")],
                permissions,
            },
        }
    }

    #[test]
    fn explicit_permission_is_allowed() {
        let p = principal(vec![Permission::new("circulation.borrow")]);
        assert!(authorize(&p, &Permission::new("circulation.borrow")).is_ok());
    }

    #[test]
    fn wildcard_grants_everything() {
        let p = principal(vec![Permission::new("*")]);
        assert!(authorize(&p, &Permission::new("catalog.manage")).is_ok());
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let p = principal(vec![Permission::new("catalog.read")]);
        let err = authorize(&p, &Permission::new("catalog.manage")).unwrap_err();
        assert_eq!(
            err,
            AuthzError::Forbidden {
                required: Permission::new("catalog.manage")
            }
        );
    }

    #[test]
    fn empty_grant_set_is_forbidden() {
        let p = principal(vec![]);
        assert!(authorize(&p, &Permission::new("catalog.read")).is_err());
    }
}

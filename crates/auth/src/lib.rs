//! `libris-auth` — authentication/authorization boundary.
//!
//! Claims validation and the RBAC check are pure functions of their inputs;
//! only [`jwt`] touches token encoding, and nothing here touches HTTP or
//! storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError, Principal};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator, encode_hs256};
pub use permissions::Permission;
pub use principal::{Membership, PrincipalId};
pub use roles::Role;

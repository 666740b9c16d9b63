//! Members domain module.
//!
//! Library members are the borrower side of every circulation operation.
//! The circulation service only needs existence and standing checks from
//! this crate; credentials and token issuance live outside the core.

pub mod member;

pub use member::{Member, MemberRole, MemberStatus, NewMember};

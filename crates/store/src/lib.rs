//! `libris-store` — transactional persistence boundary.
//!
//! The in-memory implementation here is the dev/test backend; a persistent
//! backend would implement the same commit/rollback contract. Storage
//! failures are reported as [`StoreError`], kept separate from the domain's
//! business-rule errors.

pub mod memory;
pub mod state;

pub use memory::{MemoryStore, StoreError};
pub use state::LibraryState;

//! Catalog domain module.
//!
//! This crate contains business rules for book copies and their availability,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage).

pub mod book;

pub use book::{Book, BookDetails, BookStatus, NewBook};

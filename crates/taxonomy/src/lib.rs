//! Taxonomy domain module.
//!
//! The category tree and the maintenance rules for its derived `level`
//! field. Operations take the full category map from the caller's unit of
//! work and mutate it in place, so a reparent and the level propagation over
//! its descendants commit (or roll back) together.

pub mod category;
pub mod hierarchy;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use hierarchy::{CategoryNode, MAX_DEPTH, create, delete, tree, update};

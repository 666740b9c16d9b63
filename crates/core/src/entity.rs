//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities mutate in place and bump `version()` by one per applied state
/// change, so stale reads and audit trails can be reasoned about uniformly.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the entity's state.
    fn version(&self) -> u64;
}

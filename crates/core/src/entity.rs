//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Records held by the entity store are looked up by this identity, never by
/// position.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

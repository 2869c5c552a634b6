//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Artists, creations, parties and utilisations are entities: two records with
/// the same identifier are the same thing even if their fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

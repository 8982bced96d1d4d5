//! Entity trait: records with a stable identity whose attributes change.

/// Entity marker + minimal interface.
///
/// Catalog entries and per-SKU inventory states are both keyed by their SKU;
/// two records are "the same thing" when their ids match, whatever the counts.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Identity comparison, ignoring every other attribute.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

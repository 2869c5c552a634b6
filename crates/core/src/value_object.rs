//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// [`Currency`](crate::Currency) or a split policy is a value object; an artist
/// is not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity: two instances with the same attributes are
/// the same value (`MoneyAmount::of(100) == MoneyAmount::of(100)`). They are
/// immutable; "changing" one means building a new one, which is why the
/// arithmetic on `MoneyAmount` returns fresh values.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two amounts of
/// `12.50` are the same amount, while two accounts with equal balances are
/// still different accounts (see [`crate::Entity`]).
///
/// ```ignore
/// let a = Amount::new(12.5)?;
/// let b = Amount::new(12.5)?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Copy + PartialEq + core::fmt::Debug {}

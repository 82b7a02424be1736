//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two probability
/// distributions with the same three numbers are the same distribution. To
/// "modify" one, build a new one.
///
/// Every value object in this crate is validated on construction, so holding
/// one is proof that its invariants hold.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {
    /// Re-check the invariants of an already constructed value.
    fn validate(&self) -> crate::DomainResult<()>;
}

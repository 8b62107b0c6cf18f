//! Entity trait: identity that survives state changes.

/// Something with a stable identity (an account keeps its id while its
/// balance moves).
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}

//! Query descriptors.
//!
//! A [`QueryDescriptor`] names the set of component kinds an entity must hold
//! to match. Systems build one at setup time and exchange it for a
//! [`QueryHandle`] that the world uses to track matches incrementally.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentTypeId};

/// The component kinds an entity must hold to match a query.
///
/// Descriptors compare equal when they name the same kinds, regardless of the
/// order the kinds were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryDescriptor {
    kinds: BTreeSet<ComponentTypeId>,
}

impl QueryDescriptor {
    /// Create a new empty query descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require component kind `T`.
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.with_id(T::component_type_id())
    }

    /// Require a component kind by id.
    #[must_use]
    pub fn with_id(mut self, type_id: ComponentTypeId) -> Self {
        self.kinds.insert(type_id);
        self
    }

    /// The required kinds, in ascending id order.
    #[must_use]
    pub fn kinds(&self) -> &BTreeSet<ComponentTypeId> {
        &self.kinds
    }

    /// Returns `true` if this query requires `type_id`.
    #[must_use]
    pub fn requires(&self, type_id: ComponentTypeId) -> bool {
        self.kinds.contains(&type_id)
    }

    /// Returns `true` if no kinds are required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Match an entity given a predicate telling which kinds it holds.
    pub fn matches(&self, mut holds: impl FnMut(ComponentTypeId) -> bool) -> bool {
        !self.kinds.is_empty() && self.kinds.iter().all(|&kind| holds(kind))
    }
}

/// Opaque handle to a query registered with a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryHandle(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_is_order_independent() {
        let a = ComponentTypeId(1);
        let b = ComponentTypeId(2);
        let q1 = QueryDescriptor::new().with_id(a).with_id(b);
        let q2 = QueryDescriptor::new().with_id(b).with_id(a);
        assert_eq!(q1, q2);
    }

    #[test]
    fn test_requires() {
        let q = QueryDescriptor::new().with_id(ComponentTypeId(1));
        assert!(q.requires(ComponentTypeId(1)));
        assert!(!q.requires(ComponentTypeId(2)));
    }

    #[test]
    fn test_matches_requires_every_kind() {
        let q = QueryDescriptor::new()
            .with_id(ComponentTypeId(1))
            .with_id(ComponentTypeId(2));
        assert!(q.matches(|_| true));
        assert!(!q.matches(|kind| kind == ComponentTypeId(1)));
    }

    #[test]
    fn test_empty_descriptor_matches_nothing() {
        let q = QueryDescriptor::new();
        assert!(q.is_empty());
        assert!(!q.matches(|_| true));
    }
}

//! Sparse-set component storage.
//!
//! Each component kind gets one [`ComponentStorage`]: values and their owning
//! entities live in two parallel dense arrays, and a sparse array indexed by
//! entity index points into them. Lookup, insertion and removal are O(1)
//! amortized; iterating a kind walks contiguous memory.

use std::any::Any;

use crate::component::{Component, ComponentTypeId};
use crate::entity::Entity;
use crate::error::EcsError;

/// Dense rows owned by one entity.
#[derive(Debug, Clone)]
enum Slots {
    One(usize),
    Many(Vec<usize>),
}

impl Slots {
    fn first(&self) -> Option<usize> {
        match self {
            Slots::One(row) => Some(*row),
            Slots::Many(rows) => rows.first().copied(),
        }
    }

    fn rows(&self) -> &[usize] {
        match self {
            Slots::One(row) => std::slice::from_ref(row),
            Slots::Many(rows) => rows,
        }
    }

    fn relocate(&mut self, from: usize, to: usize) {
        match self {
            Slots::One(row) => {
                if *row == from {
                    *row = to;
                }
            }
            Slots::Many(rows) => {
                if let Some(row) = rows.iter_mut().find(|row| **row == from) {
                    *row = to;
                }
            }
        }
    }
}

/// Typed storage for a single component kind.
#[derive(Debug)]
pub struct ComponentStorage<T: Component> {
    values: Vec<T>,
    /// `owners[i]` owns `values[i]`.
    owners: Vec<Entity>,
    /// Indexed by [`Entity::index`].
    sparse: Vec<Option<Slots>>,
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            owners: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Attach `value` to `entity`.
    ///
    /// Singleton kinds fail with [`EcsError::DuplicateComponent`] when the
    /// entity already holds one; multi-instance kinds append.
    pub fn insert(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        let slot = entity.index() as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize_with(slot + 1, || None);
        }

        if self.sparse[slot].is_some() && !self.contains(entity) {
            // Rows left behind by a previous occupant of this index.
            if let Some(stale) = self.sparse[slot].take() {
                self.drop_rows(&stale);
            }
        }

        if self.sparse[slot].is_some() && !T::multi_instance() {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: T::type_name(),
            });
        }

        let row = self.values.len();
        let slots = match self.sparse[slot].take() {
            None => Slots::One(row),
            Some(Slots::One(first)) => Slots::Many(vec![first, row]),
            Some(Slots::Many(mut rows)) => {
                rows.push(row);
                Slots::Many(rows)
            }
        };
        self.sparse[slot] = Some(slots);

        self.values.push(value);
        self.owners.push(entity);
        Ok(())
    }

    fn slots(&self, entity: Entity) -> Option<&Slots> {
        let slots = self.sparse.get(entity.index() as usize)?.as_ref()?;
        // A recycled index must not see the previous occupant's rows.
        let first = slots.first()?;
        (self.owners[first] == entity).then_some(slots)
    }

    /// Returns `true` if `entity` holds at least one instance.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slots(entity).is_some()
    }

    /// The entity's (first) instance.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let row = self.slots(entity)?.first()?;
        self.values.get(row)
    }

    /// Mutable access to the entity's (first) instance.
    #[must_use]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let row = self.slots(entity)?.first()?;
        self.values.get_mut(row)
    }

    /// Every instance the entity holds, in insertion order.
    pub fn get_all(&self, entity: Entity) -> impl Iterator<Item = &T> + '_ {
        self.slots(entity)
            .map(Slots::rows)
            .unwrap_or_default()
            .iter()
            .map(|&row| &self.values[row])
    }

    /// Detach every instance held by `entity`. Returns `true` if anything was
    /// removed.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }
        let Some(slots) = self.sparse[entity.index() as usize].take() else {
            return false;
        };
        self.drop_rows(&slots);
        true
    }

    /// Swap-remove `slots`' rows, which must already be unlinked from `sparse`.
    fn drop_rows(&mut self, slots: &Slots) {
        let mut rows = slots.rows().to_vec();
        // Highest row first: the element swapped into `row` is never one of ours.
        rows.sort_unstable_by(|a, b| b.cmp(a));
        for row in rows {
            let last = self.values.len() - 1;
            self.values.swap_remove(row);
            self.owners.swap_remove(row);
            if row != last {
                let moved = self.owners[row];
                if let Some(Some(slots)) = self.sparse.get_mut(moved.index() as usize) {
                    slots.relocate(last, row);
                }
            }
        }
    }

    /// Iterate `(owner, value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.owners.iter().copied().zip(self.values.iter())
    }

    /// Mutable variant of [`ComponentStorage::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.owners.iter().copied().zip(self.values.iter_mut())
    }

    /// Number of stored instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no instances are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Object-safe view of a [`ComponentStorage`] so a world can hold storages of
/// every kind in one map.
pub trait ErasedStorage: Any {
    /// The stored component kind.
    fn component_type_id(&self) -> ComponentTypeId;

    /// The stored component kind's name.
    fn type_name(&self) -> &'static str;

    /// See [`ComponentStorage::contains`].
    fn contains_entity(&self, entity: Entity) -> bool;

    /// See [`ComponentStorage::remove`].
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Owners in dense order; an entity holding several instances repeats.
    fn owners(&self) -> &[Entity];

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStorage for ComponentStorage<T> {
    fn component_type_id(&self) -> ComponentTypeId {
        T::component_type_id()
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity)
    }

    fn owners(&self) -> &[Entity] {
        &self.owners
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

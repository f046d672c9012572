//! Entity handles and the generational allocator.
//!
//! An [`Entity`] is a lightweight index plus generation with no inherent
//! data. Indices are recycled after an entity is destroyed; the generation is
//! bumped on every release so handles to the previous occupant go stale.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::EcsError;

/// A generational entity handle.
///
/// Entities are pure identifiers; they carry no data of their own. Components
/// are attached to entities to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// The null / invalid entity sentinel. Index 0 is never allocated.
    pub const INVALID: Entity = Entity {
        index: 0,
        generation: 0,
    };

    /// Create a handle from its raw parts.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index, shared by every generation that occupies it.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// How many times the slot had been released when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Pack the handle into a single `u64` (generation in the high half).
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Inverse of [`Entity::to_bits`].
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }

    /// Returns `true` unless this is [`Entity::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index != 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

/// Allocates entity handles and recycles released indices.
///
/// Released indices are reused in FIFO order so a freshly destroyed slot is
/// not immediately handed back out.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Current generation per slot. Slot 0 is reserved.
    generations: Vec<u32>,
    /// Whether the slot's current generation is live.
    alive: Vec<bool>,
    free: VecDeque<u32>,
    live: usize,
}

impl EntityAllocator {
    /// Creates a new allocator. Indices start at 1 (0 is reserved for [`Entity::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: vec![0],
            alive: vec![false],
            free: VecDeque::new(),
            live: 0,
        }
    }

    /// Allocates a handle, recycling a released index when one is available.
    pub fn allocate(&mut self) -> Entity {
        self.live += 1;
        if let Some(index) = self.free.pop_front() {
            let slot = index as usize;
            self.alive[slot] = true;
            return Entity::new(index, self.generations[slot]);
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.alive.push(true);
        Entity::new(index, 0)
    }

    /// Releases a live handle. Its index becomes available with the next
    /// generation.
    pub fn release(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.is_alive(entity) {
            return Err(EcsError::StaleHandle(entity));
        }
        let slot = entity.index as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push_back(entity.index);
        self.live -= 1;
        Ok(())
    }

    /// Returns `true` if `entity` is the current, live occupant of its slot.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        entity.is_valid()
            && slot < self.alive.len()
            && self.alive[slot]
            && self.generations[slot] == entity.generation
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.live
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_invalid() {
        assert!(!Entity::INVALID.is_valid());
        assert_eq!(Entity::INVALID.index(), 0);
    }

    #[test]
    fn test_entity_bits_roundtrip() {
        let e = Entity::new(42, 7);
        assert_eq!(Entity::from_bits(e.to_bits()), e);
        assert_eq!(e.to_bits() >> 32, 7);
    }

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        let e3 = alloc.allocate();
        assert_eq!(e1.index(), 1);
        assert_eq!(e2.index(), 2);
        assert_eq!(e3.index(), 3);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_recycled_index_gets_new_generation() {
        let mut alloc = EntityAllocator::new();
        let old = alloc.allocate();
        alloc.release(old).unwrap();

        let new = alloc.allocate();
        assert_eq!(new.index(), old.index());
        assert_eq!(new.generation(), old.generation() + 1);
        assert!(alloc.is_alive(new));
        assert!(!alloc.is_alive(old));
    }

    #[test]
    fn test_release_stale_handle_fails() {
        let mut alloc = EntityAllocator::new();
        let old = alloc.allocate();
        alloc.release(old).unwrap();
        let _new = alloc.allocate();

        assert_eq!(alloc.release(old), Err(EcsError::StaleHandle(old)));
        assert_eq!(alloc.count(), 1);
    }

    #[test]
    fn test_release_invalid_fails() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(
            alloc.release(Entity::INVALID),
            Err(EcsError::StaleHandle(Entity::INVALID))
        );
    }

    #[test]
    fn test_free_list_is_fifo() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        alloc.release(a).unwrap();
        alloc.release(b).unwrap();
        assert_eq!(alloc.allocate().index(), a.index());
        assert_eq!(alloc.allocate().index(), b.index());
    }
}

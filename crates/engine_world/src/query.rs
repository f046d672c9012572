//! Reactive query state.
//!
//! A [`QueryState`] keeps the live set of entities matching its descriptor,
//! updated as components are added and removed. Every entity touched since
//! the last tick boundary is remembered together with whether it matched at
//! that boundary; [`QueryState::flush`] turns those records into the tick's
//! `enter` and `exit` lists. Cost is proportional to the number of changes,
//! not the number of entities.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use engine_component::{Entity, QueryDescriptor};

/// Live match tracking for one query.
#[derive(Debug)]
pub struct QueryState {
    descriptor: QueryDescriptor,
    /// Live matches keyed by insertion sequence, for stable iteration order.
    live: BTreeMap<u64, Entity>,
    live_seq: HashMap<Entity, u64>,
    next_seq: u64,
    /// Entities touched since the last boundary, in first-touch order.
    dirty: Vec<Entity>,
    /// Match state of each dirty entity at the last boundary.
    was_matching: HashMap<Entity, bool>,
    entered: Vec<Entity>,
    exited: Vec<Entity>,
}

impl QueryState {
    pub(crate) fn new(descriptor: QueryDescriptor) -> Self {
        Self {
            descriptor,
            live: BTreeMap::new(),
            live_seq: HashMap::new(),
            next_seq: 0,
            dirty: Vec::new(),
            was_matching: HashMap::new(),
            entered: Vec::new(),
            exited: Vec::new(),
        }
    }

    /// The component kinds this query requires.
    #[must_use]
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Entities currently matching, in the order they started matching.
    ///
    /// Reflects every add/remove made so far, including ones made earlier in
    /// the current tick.
    pub fn matching(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.values().copied()
    }

    /// Entities that started matching between the previous two tick
    /// boundaries. Replaced at every boundary.
    #[must_use]
    pub fn enter(&self) -> &[Entity] {
        &self.entered
    }

    /// Entities that stopped matching between the previous two tick
    /// boundaries. Replaced at every boundary.
    #[must_use]
    pub fn exit(&self) -> &[Entity] {
        &self.exited
    }

    /// Returns `true` if `entity` currently matches.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.live_seq.contains_key(&entity)
    }

    /// Number of live matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if nothing matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Record that `entity` now does (or does not) match.
    pub(crate) fn record(&mut self, entity: Entity, matches: bool) {
        let was = self.contains(entity);
        if let Entry::Vacant(slot) = self.was_matching.entry(entity) {
            slot.insert(was);
            self.dirty.push(entity);
        }

        match (was, matches) {
            (false, true) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.live.insert(seq, entity);
                self.live_seq.insert(entity, seq);
            }
            (true, false) => {
                if let Some(seq) = self.live_seq.remove(&entity) {
                    self.live.remove(&seq);
                }
            }
            _ => {}
        }
    }

    /// Close the current tick: compute `enter`/`exit` from the dirty set.
    /// Both lists are ordered by when each entity was first touched.
    ///
    /// An entity whose match state is the same as at the previous boundary
    /// (e.g. it gained and lost a kind within the tick) appears in neither.
    pub(crate) fn flush(&mut self) {
        self.entered.clear();
        self.exited.clear();

        let dirty = std::mem::take(&mut self.dirty);
        for entity in dirty {
            let was = self.was_matching.remove(&entity).unwrap_or(false);
            match (was, self.contains(entity)) {
                (false, true) => self.entered.push(entity),
                (true, false) => self.exited.push(entity),
                _ => {}
            }
        }
    }
}

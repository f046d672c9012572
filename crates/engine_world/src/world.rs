//! World state: entities, component storages and registered queries.
//!
//! The [`World`] is the single source of truth for entity and component data.
//! Every add/remove is forwarded to the queries interested in that component
//! kind, so query matches are always current and enter/exit diffs are
//! computed from changes only.

use std::collections::HashMap;

use engine_component::{
    Component, ComponentStorage, ComponentTypeId, EcsError, Entity, EntityAllocator,
    ErasedStorage, QueryDescriptor, QueryHandle,
};
use tracing::trace;

use crate::query::QueryState;

/// Entity registry, component store and query engine.
#[derive(Default)]
pub struct World {
    /// Entity ID allocator.
    entities: EntityAllocator,
    /// One storage per component kind.
    storages: HashMap<ComponentTypeId, Box<dyn ErasedStorage>>,
    /// Registered queries, indexed by [`QueryHandle`].
    queries: Vec<QueryState>,
    /// Deduplicates identical descriptors.
    query_lookup: HashMap<QueryDescriptor, QueryHandle>,
    /// Queries that require each component kind.
    interest: HashMap<ComponentTypeId, Vec<QueryHandle>>,
}

impl World {
    /// Create a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Entity lifecycle --

    /// Allocate a new entity without any components.
    pub fn create(&mut self) -> Entity {
        let entity = self.entities.allocate();
        trace!(%entity, "entity created");
        entity
    }

    /// Destroy an entity and every component attached to it.
    ///
    /// Queries see the removal immediately.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.ensure_alive(entity)?;

        let removed: Vec<ComponentTypeId> = self
            .storages
            .iter_mut()
            .filter_map(|(&kind, storage)| storage.remove_entity(entity).then_some(kind))
            .collect();
        for kind in removed {
            self.notify(kind, entity);
        }

        self.entities.release(entity)?;
        trace!(%entity, "entity destroyed");
        Ok(())
    }

    /// Returns `true` if `entity` is live.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    fn ensure_alive(&self, entity: Entity) -> Result<(), EcsError> {
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::StaleHandle(entity))
        }
    }

    // -- Component operations --

    /// Attach a component to an entity.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        self.ensure_alive(entity)?;
        let kind = T::component_type_id();
        self.storages
            .entry(kind)
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .ok_or(EcsError::KindCollision(T::type_name()))?
            .insert(entity, value)?;
        trace!(%entity, component = T::type_name(), "component added");
        self.notify(kind, entity);
        Ok(())
    }

    /// Borrow an entity's component.
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.ensure_alive(entity)?;
        self.storage::<T>()
            .and_then(|storage| storage.get(entity))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: T::type_name(),
            })
    }

    /// Mutably borrow an entity's component.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.ensure_alive(entity)?;
        self.storage_mut::<T>()
            .and_then(|storage| storage.get_mut(entity))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: T::type_name(),
            })
    }

    /// Every instance of a multi-instance kind held by `entity`. Empty for
    /// dead handles.
    pub fn get_all<T: Component>(&self, entity: Entity) -> impl Iterator<Item = &T> + '_ {
        self.storage::<T>()
            .into_iter()
            .flat_map(move |storage| storage.get_all(entity))
    }

    /// Returns `true` if `entity` is live and holds a `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
            && self
                .storage::<T>()
                .is_some_and(|storage| storage.contains(entity))
    }

    /// Detach `T` from an entity. Absent components are not an error; the
    /// return value says whether anything was removed.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<bool, EcsError> {
        self.ensure_alive(entity)?;
        let kind = T::component_type_id();
        let removed = self
            .storages
            .get_mut(&kind)
            .is_some_and(|storage| storage.remove_entity(entity));
        if removed {
            trace!(%entity, component = T::type_name(), "component removed");
            self.notify(kind, entity);
        }
        Ok(removed)
    }

    /// Bulk iteration over every `(owner, value)` of kind `T`.
    pub fn components<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.storage::<T>().into_iter().flat_map(ComponentStorage::iter)
    }

    /// The typed storage for `T`, if any `T` was ever added.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&T::component_type_id())?
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(&T::component_type_id())?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    // -- Queries --

    /// Register a query, or return the existing handle for an identical one.
    ///
    /// Entities that already match are reported by `enter()` after the next
    /// tick boundary.
    pub fn define_query(&mut self, descriptor: QueryDescriptor) -> Result<QueryHandle, EcsError> {
        if descriptor.is_empty() {
            return Err(EcsError::EmptyQuery);
        }
        if let Some(&handle) = self.query_lookup.get(&descriptor) {
            return Ok(handle);
        }

        let handle = QueryHandle(self.queries.len());
        let mut state = QueryState::new(descriptor.clone());

        // Seed from the smallest required storage.
        let seed = descriptor
            .kinds()
            .iter()
            .map(|kind| self.storages.get(kind).map_or(&[][..], |s| s.owners()))
            .min_by_key(|owners| owners.len())
            .unwrap_or_default();
        for &entity in seed {
            if !state.contains(entity) && entity_matches(&self.storages, &descriptor, entity) {
                state.record(entity, true);
            }
        }

        for &kind in descriptor.kinds() {
            self.interest.entry(kind).or_default().push(handle);
        }
        self.queries.push(state);
        self.query_lookup.insert(descriptor, handle);
        Ok(handle)
    }

    /// Access a registered query's matches and enter/exit lists.
    pub fn query(&self, handle: QueryHandle) -> Result<&QueryState, EcsError> {
        self.queries
            .get(handle.0)
            .ok_or(EcsError::UnknownQuery(handle.0))
    }

    /// Tick boundary: compute every query's `enter`/`exit` for the tick that
    /// is about to run.
    pub fn maintain(&mut self) {
        for query in &mut self.queries {
            query.flush();
        }
    }

    /// Re-evaluate `entity` for every query that requires `kind`.
    fn notify(&mut self, kind: ComponentTypeId, entity: Entity) {
        let Some(handles) = self.interest.get(&kind) else {
            return;
        };
        for handle in handles {
            let query = &mut self.queries[handle.0];
            let matches = entity_matches(&self.storages, query.descriptor(), entity);
            query.record(entity, matches);
        }
    }
}

fn entity_matches(
    storages: &HashMap<ComponentTypeId, Box<dyn ErasedStorage>>,
    descriptor: &QueryDescriptor,
    entity: Entity,
) -> bool {
    descriptor.matches(|kind| {
        storages
            .get(&kind)
            .is_some_and(|storage| storage.contains_entity(entity))
    })
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<&'static str> = self.storages.values().map(|s| s.type_name()).collect();
        f.debug_struct("World")
            .field("entities", &self.entities.count())
            .field("components", &kinds)
            .field("queries", &self.queries.len())
            .finish()
    }
}

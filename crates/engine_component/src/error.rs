//! Errors raised by entity and component operations.

use crate::entity::Entity;

/// Errors that can occur when manipulating entities, components and queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The handle's generation no longer matches its slot (use-after-destroy).
    #[error("stale entity handle: {0}")]
    StaleHandle(Entity),

    /// A singleton component kind was added to an entity that already has one.
    #[error("{entity} already has a `{component}` component")]
    DuplicateComponent {
        entity: Entity,
        component: &'static str,
    },

    /// A required component is not attached to the entity.
    #[error("{entity} has no `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    /// A query was defined over no component kinds.
    #[error("a query must name at least one component kind")]
    EmptyQuery,

    /// Two component types share the same kind name.
    #[error("component kind `{0}` is already registered by a different type")]
    KindCollision(&'static str),

    /// The query handle was not issued by this world.
    #[error("unknown query handle {0}")]
    UnknownQuery(usize),
}

//! # engine_component
//!
//! The "E" and "C" in ECS: entity handles, the component contract and typed
//! component storage.
//!
//! This crate provides:
//!
//! - [`Component`] trait: the contract all ECS data must satisfy.
//! - [`Entity`]: generational entity handles.
//! - [`EntityAllocator`]: allocates and recycles entity handles.
//! - [`ComponentStorage`]: sparse-set storage for one component kind.
//! - [`QueryDescriptor`]: the component kinds a query requires.
//! - [`EcsError`]: failures of the above.

pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod storage;

pub use component::{Component, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use error::EcsError;
pub use query::{QueryDescriptor, QueryHandle};
pub use storage::{ComponentStorage, ErasedStorage};

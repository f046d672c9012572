//! # engine_world
//!
//! The runtime half of the ECS: the [`World`] that owns entities, component
//! storages and reactive queries, and the [`TickLoop`] that runs an ordered
//! [`Schedule`] of systems against it once per frame.
//!
//! ```text
//! tick(dt)
//!   ├─ world.maintain()      close the query window: enter/exit now current
//!   └─ schedule.run()        each system, in registration order, fail fast
//! ```

pub mod context;
pub mod error;
pub mod query;
pub mod scheduler;
pub mod tick;
pub mod world;

pub use context::SystemContext;
pub use error::TickError;
pub use query::QueryState;
pub use scheduler::{RegisteredSystem, Schedule, SystemUpdate};
pub use tick::{TickConfig, TickLoop};
pub use world::World;

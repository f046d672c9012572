//! System schedule: ordered, synchronous system execution.
//!
//! Systems run one after another in registration order, once per tick. Data
//! dependencies between systems (movement writing velocity before animation
//! reads it) are expressed purely by that order, so it is never changed
//! implicitly.

use tracing::{debug, error};

use crate::context::SystemContext;
use crate::error::TickError;
use crate::world::World;

/// A system's per-tick update closure.
pub type SystemUpdate = Box<dyn FnMut(&mut World, &SystemContext) -> anyhow::Result<()>>;

/// A registered system: a name plus the update closure its setup produced.
pub struct RegisteredSystem {
    /// The system name (e.g. `"animation"`).
    pub name: String,
    update: SystemUpdate,
}

impl std::fmt::Debug for RegisteredSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredSystem")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The ordered list of systems run each tick.
#[derive(Debug, Default)]
pub struct Schedule {
    systems: Vec<RegisteredSystem>,
}

impl Schedule {
    /// Create a new empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system at the end of the schedule.
    ///
    /// `setup` runs once, immediately, with access to the world (typically to
    /// define the queries the system will use) and returns the update closure
    /// that runs every tick.
    pub fn add_system<S, U>(
        &mut self,
        world: &mut World,
        name: impl Into<String>,
        setup: S,
    ) -> Result<(), TickError>
    where
        S: FnOnce(&mut World) -> anyhow::Result<U>,
        U: FnMut(&mut World, &SystemContext) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(TickError::DuplicateSystem(name));
        }

        let update = setup(world).map_err(|source| TickError::Setup {
            system: name.clone(),
            source,
        })?;

        debug!(system = %name, position = self.systems.len(), "system registered");
        self.systems.push(RegisteredSystem {
            name,
            update: Box::new(update),
        });
        Ok(())
    }

    /// Remove a system by name. Returns `true` if it was registered.
    pub fn remove_system(&mut self, name: &str) -> bool {
        let before = self.systems.len();
        self.systems.retain(|system| system.name != name);
        self.systems.len() != before
    }

    /// Returns `true` if a system with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.systems.iter().any(|system| system.name == name)
    }

    /// System names in execution order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|system| system.name.as_str())
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Run every system once, in order. The first failure aborts the rest of
    /// the tick.
    pub fn run(&mut self, world: &mut World, ctx: &SystemContext) -> Result<(), TickError> {
        for system in &mut self.systems {
            if let Err(source) = (system.update)(world, ctx) {
                error!(
                    tick_id = ctx.tick_id,
                    system = %system.name,
                    error = %source,
                    "system failed, aborting tick"
                );
                return Err(TickError::System {
                    system: system.name.clone(),
                    tick_id: ctx.tick_id,
                    source,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(schedule: &mut Schedule, world: &mut World, name: &str, log: &Log) {
        let log = Rc::clone(log);
        let label = name.to_string();
        schedule
            .add_system(world, name, move |_| {
                Ok(move |_: &mut World, _: &SystemContext| -> anyhow::Result<()> {
                    log.borrow_mut().push(label.clone());
                    Ok(())
                })
            })
            .unwrap();
    }

    #[test]
    fn test_systems_run_in_registration_order() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        let log: Log = Rc::default();
        for name in ["input", "physics", "animation"] {
            recorder(&mut schedule, &mut world, name, &log);
        }

        schedule.run(&mut world, &SystemContext::new(1, 0.1)).unwrap();
        schedule.run(&mut world, &SystemContext::new(2, 0.1)).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["input", "physics", "animation", "input", "physics", "animation"]
        );
        assert_eq!(
            schedule.system_names().collect::<Vec<_>>(),
            vec!["input", "physics", "animation"]
        );
    }

    #[test]
    fn test_failure_aborts_rest_of_tick() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        let log: Log = Rc::default();
        recorder(&mut schedule, &mut world, "first", &log);
        schedule
            .add_system(&mut world, "broken", |_| {
                Ok(|_: &mut World, _: &SystemContext| -> anyhow::Result<()> {
                    anyhow::bail!("boom")
                })
            })
            .unwrap();
        recorder(&mut schedule, &mut world, "last", &log);

        let err = schedule
            .run(&mut world, &SystemContext::new(4, 0.1))
            .unwrap_err();
        match err {
            TickError::System {
                system, tick_id, ..
            } => {
                assert_eq!(system, "broken");
                assert_eq!(tick_id, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*log.borrow(), vec!["first"]);
    }

    fn failing_setup(_: &mut World) -> anyhow::Result<fn(&mut World, &SystemContext) -> anyhow::Result<()>> {
        anyhow::bail!("no clips")
    }

    #[test]
    fn test_setup_failure_does_not_register() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        let result = schedule.add_system(&mut world, "bad", failing_setup);
        assert!(matches!(result, Err(TickError::Setup { .. })));
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_duplicate_and_removal() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        let log: Log = Rc::default();
        recorder(&mut schedule, &mut world, "a", &log);
        let dup = schedule.add_system(&mut world, "a", |_| {
            Ok(|_: &mut World, _: &SystemContext| -> anyhow::Result<()> { Ok(()) })
        });
        assert!(matches!(dup, Err(TickError::DuplicateSystem(_))));

        assert!(schedule.remove_system("a"));
        assert!(!schedule.remove_system("a"));
        assert_eq!(schedule.len(), 0);
    }
}

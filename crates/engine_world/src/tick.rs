//! Fixed-timestep tick loop.
//!
//! Each tick:
//!
//! 1. Advance the tick counter.
//! 2. Close the previous tick's query window so `enter`/`exit` are current.
//! 3. Run every system once, in registration order.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::context::SystemContext;
use crate::error::TickError;
use crate::scheduler::Schedule;
use crate::world::World;

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Sleep between ticks to hold `tick_rate` in wall-clock time.
    pub realtime: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
            realtime: false,
        }
    }
}

impl TickConfig {
    /// Fixed duration of one tick.
    ///
    /// Fails with [`TickError::InvalidConfig`] unless `tick_rate` is finite
    /// and positive.
    pub fn tick_duration(&self) -> Result<Duration, TickError> {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(TickError::InvalidConfig(format!(
                "tick rate must be finite and positive, got {}",
                self.tick_rate
            )));
        }
        Duration::try_from_secs_f64(1.0 / self.tick_rate)
            .map_err(|err| TickError::InvalidConfig(format!("tick rate {}: {err}", self.tick_rate)))
    }
}

/// The tick loop: owns the world and the system schedule.
#[derive(Debug)]
pub struct TickLoop {
    /// Current tick counter.
    tick_id: u64,
    config: TickConfig,
    world: World,
    schedule: Schedule,
}

impl TickLoop {
    /// Create a new tick loop over an empty world.
    #[must_use]
    pub fn new(config: TickConfig) -> Self {
        Self::with_world(config, World::new())
    }

    /// Create a tick loop over an existing world.
    #[must_use]
    pub fn with_world(config: TickConfig, world: World) -> Self {
        Self {
            tick_id: 0,
            config,
            world,
            schedule: Schedule::new(),
        }
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Returns a reference to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns a mutable reference to the world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the system schedule.
    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Register a system at the end of the schedule. See
    /// [`Schedule::add_system`].
    pub fn add_system<S, U>(&mut self, name: impl Into<String>, setup: S) -> Result<(), TickError>
    where
        S: FnOnce(&mut World) -> anyhow::Result<U>,
        U: FnMut(&mut World, &SystemContext) -> anyhow::Result<()> + 'static,
    {
        self.schedule.add_system(&mut self.world, name, setup)
    }

    /// Remove a system by name.
    pub fn remove_system(&mut self, name: &str) -> bool {
        self.schedule.remove_system(name)
    }

    /// Run one tick with the given delta time in seconds.
    pub fn tick(&mut self, dt: f32) -> Result<(), TickError> {
        self.tick_id += 1;
        self.world.maintain();

        debug!(
            tick_id = self.tick_id,
            dt,
            systems = self.schedule.len(),
            entities = self.world.entity_count(),
            "tick start"
        );

        let ctx = SystemContext::new(self.tick_id, dt);
        self.schedule.run(&mut self.world, &ctx)
    }

    /// Run the loop for the configured number of ticks, or until a system
    /// fails.
    pub fn run(&mut self) -> Result<(), TickError> {
        let tick_duration = self.config.tick_duration()?;
        let dt = tick_duration.as_secs_f32();
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            realtime = self.config.realtime,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();
            self.tick(dt)?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(ticks = tick_count, "tick loop complete");
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed > tick_duration {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            } else if self.config.realtime {
                std::thread::sleep(tick_duration - elapsed);
            }
        }
    }
}

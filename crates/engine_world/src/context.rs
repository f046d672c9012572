//! Per-tick execution context provided to systems.

/// Tick metadata handed to every system update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemContext {
    /// The current tick ID (the first tick is 1).
    pub tick_id: u64,
    /// Delta time since the last tick, in seconds.
    pub dt: f32,
}

impl SystemContext {
    /// Create a new context for a tick.
    #[must_use]
    pub fn new(tick_id: u64, dt: f32) -> Self {
        Self { tick_id, dt }
    }
}

//! Scheduler error types.

/// Errors raised while registering or running systems.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A system's one-time setup failed; the system was not registered.
    #[error("setup of system `{system}` failed")]
    Setup {
        system: String,
        #[source]
        source: anyhow::Error,
    },

    /// A system failed during a tick. Systems after it did not run.
    #[error("system `{system}` failed on tick {tick_id}")]
    System {
        system: String,
        tick_id: u64,
        #[source]
        source: anyhow::Error,
    },

    /// A system with this name is already registered.
    #[error("system `{0}` is already registered")]
    DuplicateSystem(String),

    /// The tick loop configuration cannot be run.
    #[error("invalid tick configuration: {0}")]
    InvalidConfig(String),
}

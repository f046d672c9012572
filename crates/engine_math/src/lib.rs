//! # engine_math
//!
//! Math types for the ECS runtime. Re-exports [`glam`] for linear algebra and
//! defines the engine's spatial data: the [`Velocity`] component and sampled
//! [`DistanceCurve`]s used for distance-matched animation playback.

pub mod curve;
pub mod velocity;

// Re-export glam types for convenience.
pub use glam::{Quat, Vec2, Vec3};

pub use curve::{CurveError, DistanceCurve};
pub use velocity::Velocity;

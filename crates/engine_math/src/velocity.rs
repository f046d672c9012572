//! Linear velocity component.
//!
//! [`Velocity`] is written by the movement/physics systems each tick and read
//! by everything downstream of them (animation, debug helpers).

use engine_component::Component;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear velocity in world units per second, expressed in the owner's local
/// frame (+Z forward, +X right).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self { linear: Vec3::ZERO };

    /// Create a new velocity.
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            linear: Vec3::new(x, y, z),
        }
    }

    /// Magnitude of the full velocity vector.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.linear.length()
    }

    /// The velocity with its vertical (Y) component dropped.
    #[must_use]
    pub fn horizontal(&self) -> Vec3 {
        Vec3::new(self.linear.x, 0.0, self.linear.z)
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_velocity() {
        assert_eq!(Velocity::default(), Velocity::ZERO);
        assert_eq!(Velocity::ZERO.speed(), 0.0);
    }

    #[test]
    fn test_speed_and_horizontal() {
        let v = Velocity::new(3.0, 5.0, 4.0);
        assert!((v.horizontal().length() - 5.0).abs() < f32::EPSILON);
        assert_eq!(v.horizontal().y, 0.0);
        assert!(v.speed() > v.horizontal().length());
    }
}

//! Core [`Component`] trait and component kind identity.
//!
//! Every piece of data stored in the ECS must implement [`Component`]. The
//! trait requires `Serialize + Deserialize` so any component can be dumped by
//! name for debugging.
//!
//! ## Kind identity
//!
//! [`ComponentTypeId`] is derived from the component's **string name** using
//! the FNV-1a 64-bit hash algorithm. It is deterministic across runs and
//! builds, unlike `std::any::TypeId`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A unique identifier for a component kind, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use engine_component::Component;
///
/// // One footstep sound per planted foot; an entity can hold several.
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Footstep(u8);
///
/// impl Component for Footstep {
///     fn type_name() -> &'static str { "Footstep" }
///     fn multi_instance() -> bool { true }
/// }
/// ```
pub trait Component: Send + Sync + 'static + Serialize + DeserializeOwned {
    /// A human-readable name for this component kind.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Whether an entity may hold more than one instance of this kind.
    ///
    /// Singleton kinds (the default) reject a second `add` with
    /// [`EcsError::DuplicateComponent`](crate::EcsError::DuplicateComponent).
    fn multi_instance() -> bool {
        false
    }
}

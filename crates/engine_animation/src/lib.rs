//! # engine_animation
//!
//! Skeletal animation state graph for avatars.
//!
//! - [`AnimationMixer`] owns per-clip [`AnimationAction`]s and their clocks.
//! - [`BlendSpace1D`] spreads weight across actions along one parameter.
//! - [`DistanceMatchingAction`] drives root-motion clips by travelled
//!   distance instead of time.
//! - [`TransitionRule`] is the closed set of predicates a state may leave on.
//! - [`AnimationGraph`] holds the states and rules and switches between them.
//! - [`initialize_avatar_graph`] builds the reference avatar graph, and
//!   [`animation_system`] runs it for every avatar in a [`World`].
//!
//! [`World`]: engine_world::World

pub mod avatar;
pub mod blend_space;
pub mod clip;
pub mod components;
pub mod distance;
pub mod error;
pub mod graph;
pub mod mixer;
pub mod rule;
pub mod settings;
pub mod state;
pub mod system;

pub use avatar::{initialize_avatar_graph, synthetic_clip_set};
pub use blend_space::{BlendNode, BlendSpace1D};
pub use clip::{AnimationClip, ClipLibrary, ClipSet};
pub use components::{AvatarAnimation, AvatarController};
pub use distance::DistanceMatchingAction;
pub use error::AnimationError;
pub use graph::{AnimationFrame, AnimationGraph, AnimationGraphBuilder, StateId};
pub use mixer::{ActionId, AnimationAction, AnimationMixer, LoopMode};
pub use rule::{
    DEFAULT_MOVEMENT_EPSILON, LogicOp, Motion, MotionFlag, MotionVector, Transition,
    TransitionRule,
};
pub use settings::{AvatarSettings, SettingsError};
pub use state::{AnimationState, LocomotionState, SingleAnimationState, StateKind};
pub use system::{ANIMATION_SYSTEM, animation_system};

//! Avatar components.

use engine_component::Component;
use serde::{Deserialize, Serialize};

use crate::avatar::initialize_avatar_graph;
use crate::clip::ClipLibrary;
use crate::error::AnimationError;
use crate::graph::{AnimationFrame, AnimationGraph};
use crate::mixer::AnimationMixer;
use crate::rule::Motion;
use crate::settings::AvatarSettings;

/// Movement state written by the character controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvatarController {
    pub is_grounded: bool,
}

impl Default for AvatarController {
    fn default() -> Self {
        Self { is_grounded: true }
    }
}

impl Component for AvatarController {
    fn type_name() -> &'static str {
        "AvatarController"
    }
}

/// An avatar's mixer together with the graph that drives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarAnimation {
    pub mixer: AnimationMixer,
    pub graph: AnimationGraph,
}

impl AvatarAnimation {
    /// Build the avatar graph over a fresh mixer.
    pub fn new<L: ClipLibrary + ?Sized>(
        library: &L,
        settings: &AvatarSettings,
    ) -> Result<Self, AnimationError> {
        let mut mixer = AnimationMixer::new();
        let graph = initialize_avatar_graph(&mut mixer, library, settings)?;
        Ok(Self { mixer, graph })
    }

    /// Tick the graph, then advance the mixer clock. Returns `true` if the
    /// graph changed state.
    pub fn tick(&mut self, motion: Motion, dt: f32) -> Result<bool, AnimationError> {
        let switched = self.graph.tick(AnimationFrame {
            mixer: &mut self.mixer,
            motion,
            dt,
        })?;
        self.mixer.update(dt);
        Ok(switched)
    }

    #[must_use]
    pub fn current_state(&self) -> &str {
        self.graph.current_state()
    }

    /// Play an emote or dance (or restart the current state).
    pub fn force_state(&mut self, name: &str) -> Result<(), AnimationError> {
        self.graph.force_state(name, &mut self.mixer)
    }
}

impl Component for AvatarAnimation {
    fn type_name() -> &'static str {
        "AvatarAnimation"
    }
}

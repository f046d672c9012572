//! Animation states.
//!
//! A state knows which mixer actions it drives and what to do with them on
//! entry, on exit and every frame while it is current.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blend_space::BlendSpace1D;
use crate::error::AnimationError;
use crate::mixer::{ActionId, AnimationMixer, LoopMode};
use crate::rule::Motion;

/// Idle plus two axis blend spaces, mixed by how the speed splits between
/// the forward (Z) and sideways (X) axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocomotionState {
    pub idle: ActionId,
    pub z_axis: BlendSpace1D,
    pub x_axis: BlendSpace1D,
}

impl LocomotionState {
    fn actions(&self) -> impl Iterator<Item = ActionId> + '_ {
        std::iter::once(self.idle)
            .chain(self.z_axis.actions())
            .chain(self.x_axis.actions())
    }

    /// Target weight of every action for `motion`.
    pub fn weights(&self, motion: &Motion) -> Result<BTreeMap<ActionId, f32>, AnimationError> {
        let mut weights: BTreeMap<ActionId, f32> =
            self.actions().map(|action| (action, 0.0)).collect();

        let vz = motion.velocity.z;
        let vx = motion.velocity.x;
        let speed = vz.abs() + vx.abs();
        if !speed.is_finite() || speed <= f32::EPSILON {
            weights.insert(self.idle, 1.0);
            return Ok(weights);
        }

        for (space, parameter) in [(&self.z_axis, vz), (&self.x_axis, vx)] {
            let share = parameter.abs() / speed;
            for (node, weight) in space.nodes().iter().zip(space.evaluate(parameter)?) {
                *weights.entry(node.action).or_default() += weight * share;
            }
        }
        Ok(weights)
    }

    fn update(&mut self, mixer: &mut AnimationMixer, motion: &Motion, dt: f32) -> Result<(), AnimationError> {
        for (action, weight) in self.weights(motion)? {
            mixer.action_mut(action)?.weight = weight;
        }
        self.z_axis
            .advance_matchers(mixer, motion.velocity.z.abs() * dt)?;
        self.x_axis
            .advance_matchers(mixer, motion.velocity.x.abs() * dt)?;
        Ok(())
    }
}

/// One action, played looping or once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleAnimationState {
    pub action: ActionId,
    pub looping: bool,
    pub clamp_when_finished: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateKind {
    Locomotion(LocomotionState),
    Single(SingleAnimationState),
}

/// A named node of the animation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    name: String,
    kind: StateKind,
}

impl AnimationState {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn locomotion(name: impl Into<String>, state: LocomotionState) -> Self {
        Self::new(name, StateKind::Locomotion(state))
    }

    #[must_use]
    pub fn single(name: impl Into<String>, state: SingleAnimationState) -> Self {
        Self::new(name, StateKind::Single(state))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    /// Every action this state drives.
    #[must_use]
    pub fn actions(&self) -> Vec<ActionId> {
        match &self.kind {
            StateKind::Locomotion(state) => state.actions().collect(),
            StateKind::Single(state) => vec![state.action],
        }
    }

    /// Check the state can be evaluated.
    pub fn validate(&self) -> Result<(), AnimationError> {
        if let StateKind::Locomotion(state) = &self.kind {
            if state.z_axis.is_empty() || state.x_axis.is_empty() {
                return Err(AnimationError::config(format!(
                    "locomotion state `{}` has an empty blend space",
                    self.name
                )));
            }
        }
        Ok(())
    }

    pub fn enter(&mut self, mixer: &mut AnimationMixer) -> Result<(), AnimationError> {
        match &self.kind {
            StateKind::Locomotion(state) => {
                for id in state.actions() {
                    let action = mixer.action_mut(id)?;
                    action.loop_mode = LoopMode::Repeat;
                    action.weight = if id == state.idle { 1.0 } else { 0.0 };
                    action.play();
                }
            }
            StateKind::Single(state) => {
                let action = mixer.action_mut(state.action)?;
                action.loop_mode = if state.looping {
                    LoopMode::Repeat
                } else {
                    LoopMode::Once
                };
                action.clamp_when_finished = state.clamp_when_finished;
                action.weight = 1.0;
                action.reset();
            }
        }
        Ok(())
    }

    pub fn exit(&mut self, mixer: &mut AnimationMixer) -> Result<(), AnimationError> {
        match &self.kind {
            StateKind::Locomotion(state) => {
                for id in state.actions() {
                    mixer.action_mut(id)?.weight = 0.0;
                }
            }
            StateKind::Single(state) => {
                let action = mixer.action_mut(state.action)?;
                action.weight = 0.0;
                action.stop();
            }
        }
        Ok(())
    }

    /// Per-frame work while this state is current.
    pub fn update(
        &mut self,
        mixer: &mut AnimationMixer,
        motion: &Motion,
        dt: f32,
    ) -> Result<(), AnimationError> {
        match &mut self.kind {
            StateKind::Locomotion(state) => state.update(mixer, motion, dt),
            // The mixer advances the clip.
            StateKind::Single(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use engine_math::Vec3;

    use super::*;
    use crate::clip::AnimationClip;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn locomotion(mixer: &mut AnimationMixer) -> AnimationState {
        let mut action = |name: &str| mixer.clip_action(&AnimationClip::new(name, 1.0));
        let idle = action("Idle");
        let (fwd, back, left, right) = (action("Fwd"), action("Back"), action("Left"), action("Right"));

        let mut z_axis = BlendSpace1D::new();
        z_axis.add_node(idle, 0.0, None).unwrap();
        z_axis.add_node(fwd, 2.0, None).unwrap();
        z_axis.add_node(back, -2.0, None).unwrap();
        let mut x_axis = BlendSpace1D::new();
        x_axis.add_node(idle, 0.0, None).unwrap();
        x_axis.add_node(left, -2.0, None).unwrap();
        x_axis.add_node(right, 2.0, None).unwrap();

        AnimationState::locomotion(
            "LOCOMOTION",
            LocomotionState {
                idle,
                z_axis,
                x_axis,
            },
        )
    }

    #[test]
    fn test_locomotion_idle_when_still() {
        let mut mixer = AnimationMixer::new();
        let mut state = locomotion(&mut mixer);
        state.enter(&mut mixer).unwrap();
        state.update(&mut mixer, &Motion::new(Vec3::ZERO, true), 0.1).unwrap();
        assert_eq!(mixer.clip_weight("Idle"), 1.0);
        assert_eq!(mixer.clip_weight("Fwd"), 0.0);
    }

    #[test]
    fn test_locomotion_splits_by_axis_share() {
        let mut mixer = AnimationMixer::new();
        let mut state = locomotion(&mut mixer);
        state.enter(&mut mixer).unwrap();
        // Diagonal at full speed on both axes: half forward, half right.
        state
            .update(&mut mixer, &Motion::new(Vec3::new(2.0, 0.0, 2.0), true), 0.1)
            .unwrap();
        assert!(approx(mixer.clip_weight("Fwd"), 0.5));
        assert!(approx(mixer.clip_weight("Right"), 0.5));
        assert!(approx(mixer.clip_weight("Idle"), 0.0));

        // Slow forward: idle and forward share the Z weight.
        state
            .update(&mut mixer, &Motion::new(Vec3::new(0.0, 0.0, 1.0), true), 0.1)
            .unwrap();
        assert!(approx(mixer.clip_weight("Fwd"), 0.5));
        assert!(approx(mixer.clip_weight("Idle"), 0.5));
        assert_eq!(mixer.clip_weight("Right"), 0.0);
    }

    #[test]
    fn test_single_enter_and_exit() {
        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(&AnimationClip::new("Wave", 2.0));
        let mut state = AnimationState::single(
            "WAVE",
            SingleAnimationState {
                action,
                looping: false,
                clamp_when_finished: true,
            },
        );

        mixer.action_mut(action).unwrap().time = 1.5;
        state.enter(&mut mixer).unwrap();
        let wave = mixer.action(action).unwrap();
        assert_eq!(wave.time, 0.0);
        assert_eq!(wave.weight, 1.0);
        assert_eq!(wave.loop_mode, LoopMode::Once);
        assert!(wave.playing);

        state.exit(&mut mixer).unwrap();
        let wave = mixer.action(action).unwrap();
        assert_eq!(wave.weight, 0.0);
        assert!(!wave.playing);
    }

    #[test]
    fn test_validate_rejects_empty_blend_space() {
        let mut mixer = AnimationMixer::new();
        let idle = mixer.clip_action(&AnimationClip::new("Idle", 1.0));
        let state = AnimationState::locomotion(
            "LOCOMOTION",
            LocomotionState {
                idle,
                z_axis: BlendSpace1D::new(),
                x_axis: BlendSpace1D::new(),
            },
        );
        assert!(matches!(
            state.validate(),
            Err(AnimationError::Configuration(_))
        ));
    }
}

//! Animation mixer.
//!
//! The mixer owns one [`AnimationAction`] per clip and advances their playback
//! clocks every frame. States and blend spaces never own actions; they refer
//! to them by [`ActionId`] and write weights and times through the mixer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clip::AnimationClip;
use crate::error::AnimationError;

/// Index of an action inside its [`AnimationMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub usize);

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// What happens when playback reaches the end of the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Wrap back to the start.
    #[default]
    Repeat,
    /// Play once and stop at the end.
    Once,
}

/// Playback state of one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationAction {
    clip: String,
    duration: f32,
    /// Playback position in seconds.
    pub time: f32,
    /// Blend weight in `[0, 1]`.
    pub weight: f32,
    pub loop_mode: LoopMode,
    /// Hold the last frame (and keep the weight) after a `Once` clip ends.
    pub clamp_when_finished: bool,
    pub playing: bool,
    /// Time is set by a distance matcher; [`AnimationMixer::update`] leaves
    /// it alone.
    pub distance_driven: bool,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: &AnimationClip) -> Self {
        Self {
            clip: clip.name.clone(),
            duration: clip.duration.max(0.0),
            time: 0.0,
            weight: 0.0,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
            playing: false,
            distance_driven: false,
        }
    }

    /// Name of the clip this action plays.
    #[must_use]
    pub fn clip(&self) -> &str {
        &self.clip
    }

    /// Clip length in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Playback position as a fraction of the clip length (0 for empty clips).
    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        if self.duration > 0.0 {
            self.time / self.duration
        } else {
            0.0
        }
    }

    /// Returns `true` once a `Once` action has reached its end.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.loop_mode == LoopMode::Once && self.time >= self.duration
    }

    /// Rewind to the start and resume playback.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.playing = true;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop playback and rewind.
    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
    }

    /// Jump to `time`, clamped to the clip.
    pub fn seek(&mut self, time: f32) {
        self.time = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.duration)
        };
    }

    /// Advance the playback clock by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing || self.distance_driven || !dt.is_finite() {
            return;
        }

        self.time += dt;
        match self.loop_mode {
            LoopMode::Repeat => {
                if self.duration > 0.0 {
                    self.time = self.time.rem_euclid(self.duration);
                } else {
                    self.time = 0.0;
                }
            }
            LoopMode::Once => {
                if self.time >= self.duration {
                    self.time = self.duration;
                    self.playing = false;
                    if !self.clamp_when_finished {
                        self.weight = 0.0;
                    }
                }
            }
        }
    }
}

/// Flat table of actions, at most one per clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    by_clip: BTreeMap<String, ActionId>,
    /// Total time advanced through [`update`](Self::update).
    time: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The action playing `clip`, created on first request.
    pub fn clip_action(&mut self, clip: &AnimationClip) -> ActionId {
        if let Some(&id) = self.by_clip.get(&clip.name) {
            return id;
        }
        let id = ActionId(self.actions.len());
        self.actions.push(AnimationAction::new(clip));
        self.by_clip.insert(clip.name.clone(), id);
        id
    }

    /// The action for a clip name, if one was created.
    #[must_use]
    pub fn find(&self, clip: &str) -> Option<ActionId> {
        self.by_clip.get(clip).copied()
    }

    pub fn action(&self, id: ActionId) -> Result<&AnimationAction, AnimationError> {
        self.actions
            .get(id.0)
            .ok_or_else(|| AnimationError::config(format!("{id} does not exist in this mixer")))
    }

    pub fn action_mut(&mut self, id: ActionId) -> Result<&mut AnimationAction, AnimationError> {
        self.actions
            .get_mut(id.0)
            .ok_or_else(|| AnimationError::config(format!("{id} does not exist in this mixer")))
    }

    /// Current weight of an action (0 for unknown ids).
    #[must_use]
    pub fn weight(&self, id: ActionId) -> f32 {
        self.actions.get(id.0).map_or(0.0, |action| action.weight)
    }

    /// Current weight of the action playing `clip` (0 if none).
    #[must_use]
    pub fn clip_weight(&self, clip: &str) -> f32 {
        self.find(clip).map_or(0.0, |id| self.weight(id))
    }

    /// Advance every time-driven action by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for action in &mut self.actions {
            action.advance(dt);
        }
        self.time += dt;
    }

    /// Total time advanced so far.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Iterate `(id, action)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ActionId, &AnimationAction)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, action)| (ActionId(i), action))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_clip_action_is_reused() {
        let mut mixer = AnimationMixer::new();
        let walk = AnimationClip::new("Walk", 1.0);
        let a = mixer.clip_action(&walk);
        let b = mixer.clip_action(&walk);
        assert_eq!(a, b);
        assert_eq!(mixer.len(), 1);
        assert_eq!(mixer.find("Walk"), Some(a));
        assert!(mixer.action(ActionId(7)).is_err());
    }

    #[test]
    fn test_repeat_wraps() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(&AnimationClip::new("Idle", 1.0));
        mixer.action_mut(id).unwrap().play();
        mixer.update(0.75);
        mixer.update(0.5);
        assert!(approx(mixer.action(id).unwrap().time, 0.25));
        assert!(approx(mixer.time(), 1.25));
    }

    #[test]
    fn test_once_clamps_or_drops_weight() {
        let mut mixer = AnimationMixer::new();
        let clamped = mixer.clip_action(&AnimationClip::new("Wave", 1.0));
        let dropped = mixer.clip_action(&AnimationClip::new("Clap", 1.0));
        for (id, clamp) in [(clamped, true), (dropped, false)] {
            let action = mixer.action_mut(id).unwrap();
            action.loop_mode = LoopMode::Once;
            action.clamp_when_finished = clamp;
            action.weight = 1.0;
            action.reset();
        }

        mixer.update(1.5);
        let wave = mixer.action(clamped).unwrap();
        assert!(wave.is_finished());
        assert!(approx(wave.normalized_time(), 1.0));
        assert!(approx(wave.weight, 1.0));
        assert!(!wave.playing);
        assert!(approx(mixer.weight(dropped), 0.0));
    }

    #[test]
    fn test_distance_driven_actions_ignore_update() {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(&AnimationClip::new("Run", 1.0));
        let action = mixer.action_mut(id).unwrap();
        action.distance_driven = true;
        action.reset();
        action.seek(0.4);
        mixer.update(0.3);
        assert!(approx(mixer.action(id).unwrap().time, 0.4));
    }

    #[test]
    fn test_normalized_time_of_empty_clip() {
        let action = AnimationAction::new(&AnimationClip::new("Pose", 0.0));
        assert_eq!(action.normalized_time(), 0.0);
    }
}

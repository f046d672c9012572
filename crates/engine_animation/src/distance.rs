//! Distance-matched playback.
//!
//! Root-motion clips look wrong when their playback rate disagrees with how
//! fast the character actually moves. A [`DistanceMatchingAction`] drives an
//! action's time from the distance travelled instead of from the clock: it
//! accumulates distance and seeks the action to the time at which the clip's
//! own root motion had covered that distance.

use engine_math::DistanceCurve;
use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::mixer::{ActionId, AnimationMixer, LoopMode};

/// An action whose phase follows travelled distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatchingAction {
    action: ActionId,
    curve: DistanceCurve,
    /// Accumulated distance, in curve units.
    distance: f32,
}

impl DistanceMatchingAction {
    /// Wrap `action`, handing control of its time to the curve.
    pub fn new(
        mixer: &mut AnimationMixer,
        action: ActionId,
        curve: DistanceCurve,
    ) -> Result<Self, AnimationError> {
        let target = mixer.action_mut(action)?;
        target.distance_driven = true;
        target.seek(curve.start_time());
        Ok(Self {
            action,
            distance: curve.start_distance(),
            curve,
        })
    }

    #[must_use]
    pub fn action(&self) -> ActionId {
        self.action
    }

    #[must_use]
    pub fn curve(&self) -> &DistanceCurve {
        &self.curve
    }

    /// Accumulated distance.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Travel `distance_delta` further and seek the action to match.
    ///
    /// Only the magnitude of the delta counts. Looping actions wrap the
    /// accumulated distance around the curve's total distance; others clamp
    /// at the end of the curve.
    pub fn advance(
        &mut self,
        mixer: &mut AnimationMixer,
        distance_delta: f32,
    ) -> Result<(), AnimationError> {
        let action = mixer.action_mut(self.action)?;
        if !distance_delta.is_finite() {
            return Ok(());
        }

        self.distance += distance_delta.abs();
        let start = self.curve.start_distance();
        let total = self.curve.total_distance();
        if action.loop_mode == LoopMode::Repeat && total > 0.0 {
            self.distance = start + (self.distance - start).rem_euclid(total);
        } else {
            self.distance = self.distance.min(start + total);
        }

        action.seek(self.curve.time_at(self.distance));
        Ok(())
    }

    /// Return to the start of the curve.
    pub fn reset(&mut self, mixer: &mut AnimationMixer) -> Result<(), AnimationError> {
        self.distance = self.curve.start_distance();
        mixer.action_mut(self.action)?.seek(self.curve.start_time());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::AnimationClip;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn walk(mixer: &mut AnimationMixer) -> DistanceMatchingAction {
        let id = mixer.clip_action(&AnimationClip::new("Walk", 1.0));
        // Two strides: the foot plants between 0.4s and 0.6s.
        let curve =
            DistanceCurve::new(vec![0.0, 0.4, 0.6, 1.0], vec![0.0, 0.8, 0.8, 1.6]).unwrap();
        DistanceMatchingAction::new(mixer, id, curve).unwrap()
    }

    #[test]
    fn test_seeks_by_distance() {
        let mut mixer = AnimationMixer::new();
        let mut matcher = walk(&mut mixer);
        assert!(mixer.action(matcher.action()).unwrap().distance_driven);

        matcher.advance(&mut mixer, 0.4).unwrap();
        assert!(approx(mixer.action(matcher.action()).unwrap().time, 0.2));
        matcher.advance(&mut mixer, 0.4).unwrap();
        assert!(approx(mixer.action(matcher.action()).unwrap().time, 0.4));
        matcher.advance(&mut mixer, 0.4).unwrap();
        assert!(approx(mixer.action(matcher.action()).unwrap().time, 0.8));
    }

    #[test]
    fn test_negative_delta_moves_forward() {
        let mut mixer = AnimationMixer::new();
        let mut matcher = walk(&mut mixer);
        matcher.advance(&mut mixer, -0.4).unwrap();
        assert!(approx(matcher.distance(), 0.4));
    }

    #[test]
    fn test_looping_wraps_and_once_clamps() {
        let mut mixer = AnimationMixer::new();
        let mut matcher = walk(&mut mixer);
        matcher.advance(&mut mixer, 2.0).unwrap();
        assert!(approx(matcher.distance(), 0.4));
        assert!(approx(mixer.action(matcher.action()).unwrap().time, 0.2));

        mixer.action_mut(matcher.action()).unwrap().loop_mode = LoopMode::Once;
        matcher.advance(&mut mixer, 5.0).unwrap();
        assert!(approx(matcher.distance(), 1.6));
        assert!(approx(mixer.action(matcher.action()).unwrap().time, 1.0));

        matcher.reset(&mut mixer).unwrap();
        assert_eq!(matcher.distance(), 0.0);
        assert_eq!(mixer.action(matcher.action()).unwrap().time, 0.0);
    }
}

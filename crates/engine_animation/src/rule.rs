//! Transition rules.
//!
//! A rule is a predicate over the frame's [`Motion`] and the mixer's action
//! state. Rules are plain data: a closed enum evaluated by `match`, so a
//! graph's rule table can be inspected and serialised.

use engine_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::mixer::{ActionId, AnimationMixer};

/// Speeds at or below this are treated as standing still.
pub const DEFAULT_MOVEMENT_EPSILON: f32 = 0.001;

/// Movement data sampled by the animation system each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub velocity: Vec3,
    pub is_grounded: bool,
}

impl Motion {
    #[must_use]
    pub fn new(velocity: Vec3, is_grounded: bool) -> Self {
        Self {
            velocity,
            is_grounded,
        }
    }

    #[must_use]
    pub fn flag(&self, flag: MotionFlag) -> bool {
        match flag {
            MotionFlag::Grounded => self.is_grounded,
        }
    }

    #[must_use]
    pub fn vector(&self, vector: MotionVector) -> Vec3 {
        match vector {
            MotionVector::Velocity => self.velocity,
            MotionVector::HorizontalVelocity => Vec3::new(self.velocity.x, 0.0, self.velocity.z),
        }
    }
}

/// Boolean inputs a rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionFlag {
    Grounded,
}

/// Vector inputs a rule can measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionVector {
    Velocity,
    HorizontalVelocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
}

/// A transition predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitionRule {
    /// `motion[flag] == expected`.
    Boolean { flag: MotionFlag, expected: bool },
    /// The action's normalized time has reached `threshold`.
    AnimationTime { action: ActionId, threshold: f32 },
    /// `|motion[vector]| > epsilon`.
    VectorLength { vector: MotionVector, epsilon: f32 },
    /// Both operands are always evaluated.
    Composite {
        op: LogicOp,
        lhs: Box<TransitionRule>,
        rhs: Box<TransitionRule>,
    },
}

impl TransitionRule {
    #[must_use]
    pub fn boolean(flag: MotionFlag, expected: bool) -> Self {
        Self::Boolean { flag, expected }
    }

    /// True when the grounded flag equals `expected`.
    #[must_use]
    pub fn grounded(expected: bool) -> Self {
        Self::boolean(MotionFlag::Grounded, expected)
    }

    #[must_use]
    pub fn animation_time(action: ActionId, threshold: f32) -> Self {
        Self::AnimationTime { action, threshold }
    }

    #[must_use]
    pub fn vector_length(vector: MotionVector, epsilon: f32) -> Self {
        Self::VectorLength { vector, epsilon }
    }

    /// True when the velocity exceeds [`DEFAULT_MOVEMENT_EPSILON`].
    #[must_use]
    pub fn moving() -> Self {
        Self::vector_length(MotionVector::Velocity, DEFAULT_MOVEMENT_EPSILON)
    }

    #[must_use]
    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::Composite {
            op: LogicOp::And,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    #[must_use]
    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Composite {
            op: LogicOp::Or,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Actions whose playback the rule reads.
    #[must_use]
    pub fn actions(&self) -> Vec<ActionId> {
        match self {
            Self::AnimationTime { action, .. } => vec![*action],
            Self::Composite { lhs, rhs, .. } => {
                let mut actions = lhs.actions();
                actions.extend(rhs.actions());
                actions
            }
            Self::Boolean { .. } | Self::VectorLength { .. } => Vec::new(),
        }
    }

    pub fn evaluate(&self, motion: &Motion, mixer: &AnimationMixer) -> Result<bool, AnimationError> {
        Ok(match self {
            Self::Boolean { flag, expected } => motion.flag(*flag) == *expected,
            Self::AnimationTime { action, threshold } => {
                mixer.action(*action)?.normalized_time() >= *threshold
            }
            Self::VectorLength { vector, epsilon } => motion.vector(*vector).length() > *epsilon,
            Self::Composite { op, lhs, rhs } => {
                let lhs = lhs.evaluate(motion, mixer)?;
                let rhs = rhs.evaluate(motion, mixer)?;
                match op {
                    LogicOp::And => lhs && rhs,
                    LogicOp::Or => lhs || rhs,
                }
            }
        })
    }
}

/// A rule bound to the state it leads to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub target: String,
    pub rule: TransitionRule,
}

impl Transition {
    #[must_use]
    pub fn new(target: impl Into<String>, rule: TransitionRule) -> Self {
        Self {
            target: target.into(),
            rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::AnimationClip;

    fn mixer_with_wave(time: f32) -> (AnimationMixer, ActionId) {
        let mut mixer = AnimationMixer::new();
        let id = mixer.clip_action(&AnimationClip::new("Wave", 2.0));
        mixer.action_mut(id).unwrap().seek(time);
        (mixer, id)
    }

    #[test]
    fn test_boolean_rule() {
        let mixer = AnimationMixer::new();
        let airborne = TransitionRule::grounded(false);
        assert!(airborne.evaluate(&Motion::new(Vec3::ZERO, false), &mixer).unwrap());
        assert!(!airborne.evaluate(&Motion::new(Vec3::ZERO, true), &mixer).unwrap());
    }

    #[test]
    fn test_animation_time_rule() {
        let (mixer, id) = mixer_with_wave(1.7);
        let motion = Motion::default();
        assert!(!TransitionRule::animation_time(id, 0.9).evaluate(&motion, &mixer).unwrap());
        let (mixer, id) = mixer_with_wave(1.85);
        assert!(TransitionRule::animation_time(id, 0.9).evaluate(&motion, &mixer).unwrap());

        let unknown = TransitionRule::animation_time(ActionId(9), 0.9);
        assert!(unknown.evaluate(&motion, &mixer).is_err());
    }

    #[test]
    fn test_vector_length_rule_is_strict() {
        let mixer = AnimationMixer::new();
        let rule = TransitionRule::vector_length(MotionVector::Velocity, 1.0);
        assert!(!rule.evaluate(&Motion::new(Vec3::new(0.0, 0.0, 1.0), true), &mixer).unwrap());
        assert!(rule.evaluate(&Motion::new(Vec3::new(0.0, 0.0, 1.01), true), &mixer).unwrap());

        let horizontal = TransitionRule::vector_length(MotionVector::HorizontalVelocity, 0.5);
        let falling = Motion::new(Vec3::new(0.0, -9.0, 0.0), false);
        assert!(!horizontal.evaluate(&falling, &mixer).unwrap());
        assert!(TransitionRule::moving().evaluate(&falling, &mixer).unwrap());
    }

    #[test]
    fn test_composite_rules() {
        let (mixer, id) = mixer_with_wave(0.2);
        let still = Motion::new(Vec3::ZERO, true);
        let walking = Motion::new(Vec3::new(0.0, 0.0, 1.6), true);

        let rule = TransitionRule::or(TransitionRule::moving(), TransitionRule::animation_time(id, 0.9));
        assert!(!rule.evaluate(&still, &mixer).unwrap());
        assert!(rule.evaluate(&walking, &mixer).unwrap());

        let rule = TransitionRule::and(TransitionRule::grounded(true), TransitionRule::animation_time(id, 0.9));
        assert!(!rule.evaluate(&walking, &mixer).unwrap());
    }

    #[test]
    fn test_composite_evaluates_both_operands() {
        // The right-hand side refers to a missing action; short-circuiting
        // would hide the error.
        let mixer = AnimationMixer::new();
        let rule = TransitionRule::or(
            TransitionRule::grounded(true),
            TransitionRule::animation_time(ActionId(0), 0.9),
        );
        assert!(rule.evaluate(&Motion::new(Vec3::ZERO, true), &mixer).is_err());
    }

    #[test]
    fn test_rule_actions_walk_composites() {
        let rule = TransitionRule::and(
            TransitionRule::grounded(true),
            TransitionRule::or(TransitionRule::moving(), TransitionRule::animation_time(ActionId(3), 0.9)),
        );
        assert_eq!(rule.actions(), vec![ActionId(3)]);
        assert!(TransitionRule::moving().actions().is_empty());
    }

    #[test]
    fn test_rules_serialize() {
        let rule = TransitionRule::and(TransitionRule::grounded(true), TransitionRule::moving());
        let json = serde_json::to_string(&rule).unwrap();
        let back: TransitionRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}

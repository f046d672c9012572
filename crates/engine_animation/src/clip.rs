//! Clip metadata and the clip library contract.
//!
//! Clip import is somebody else's job; the animation graph only needs to know
//! a clip's name and duration, plus the root-motion distance curve for clips
//! that are played back by distance.

use std::collections::BTreeMap;

use engine_math::DistanceCurve;
use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// A named animation clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Length in seconds.
    pub duration: f32,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Read access to loaded clips and their distance curves.
pub trait ClipLibrary {
    /// Look up a clip by name.
    fn find_clip(&self, name: &str) -> Option<&AnimationClip>;

    /// Look up the root-motion distance curve recorded for a clip.
    fn distance_curve(&self, name: &str) -> Option<&DistanceCurve>;

    /// Like [`find_clip`](Self::find_clip), failing with
    /// [`AnimationError::ClipLookup`].
    fn clip(&self, name: &str) -> Result<&AnimationClip, AnimationError> {
        self.find_clip(name).ok_or_else(|| AnimationError::ClipLookup {
            clip: name.to_string(),
            asset: "animation clip",
        })
    }

    /// Like [`distance_curve`](Self::distance_curve), failing with
    /// [`AnimationError::ClipLookup`].
    fn curve(&self, name: &str) -> Result<&DistanceCurve, AnimationError> {
        self.distance_curve(name)
            .ok_or_else(|| AnimationError::ClipLookup {
                clip: name.to_string(),
                asset: "distance curve",
            })
    }
}

/// In-memory clip library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipSet {
    #[serde(default)]
    clips: BTreeMap<String, AnimationClip>,
    #[serde(default)]
    curves: BTreeMap<String, DistanceCurve>,
}

impl ClipSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a clip.
    pub fn insert_clip(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Add (or replace) the distance curve for a clip.
    pub fn insert_curve(&mut self, clip: impl Into<String>, curve: DistanceCurve) {
        self.curves.insert(clip.into(), curve);
    }

    /// Builder form of [`insert_clip`](Self::insert_clip).
    #[must_use]
    pub fn with_clip(mut self, name: &str, duration: f32) -> Self {
        self.insert_clip(AnimationClip::new(name, duration));
        self
    }

    /// Builder form of [`insert_curve`](Self::insert_curve).
    #[must_use]
    pub fn with_curve(mut self, name: &str, curve: DistanceCurve) -> Self {
        self.insert_curve(name, curve);
        self
    }

    /// Clip names in sorted order.
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl ClipLibrary for ClipSet {
    fn find_clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name)
    }

    fn distance_curve(&self, name: &str) -> Option<&DistanceCurve> {
        self.curves.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_errors_name_the_clip() {
        let set = ClipSet::new().with_clip("Idle", 2.0);
        assert_eq!(set.clip("Idle").unwrap().duration, 2.0);

        match set.clip("Jump") {
            Err(AnimationError::ClipLookup { clip, asset }) => {
                assert_eq!(clip, "Jump");
                assert_eq!(asset, "animation clip");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            set.curve("Idle"),
            Err(AnimationError::ClipLookup {
                asset: "distance curve",
                ..
            })
        ));
    }

    #[test]
    fn test_deserialize_clip_set() {
        let json = r#"{
            "clips": { "Walk": { "name": "Walk", "duration": 1.0 } },
            "curves": { "Walk": { "times": [0.0, 1.0], "distances": [0.0, 1.6] } }
        }"#;
        let set: ClipSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.clip_names().collect::<Vec<_>>(), vec!["Walk"]);
        assert!((set.curve("Walk").unwrap().total_distance() - 1.6).abs() < f32::EPSILON);
    }
}

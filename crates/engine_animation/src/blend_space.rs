//! One-dimensional blend spaces.
//!
//! Nodes sit at parameter values along one axis (e.g. forward speed). A
//! parameter between two neighbouring nodes splits the weight linearly
//! between them; outside the node range it clamps to the end node.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMatchingAction;
use crate::error::AnimationError;
use crate::mixer::{ActionId, AnimationMixer};

/// One sample point of a blend space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendNode {
    pub value: f32,
    pub action: ActionId,
    /// Drives the action's phase from travelled distance, if present.
    pub matcher: Option<DistanceMatchingAction>,
}

/// Nodes sorted ascending by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlendSpace1D {
    nodes: Vec<BlendNode>,
}

impl BlendSpace1D {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, keeping nodes sorted. Equal values keep insertion order.
    pub fn add_node(
        &mut self,
        action: ActionId,
        value: f32,
        matcher: Option<DistanceMatchingAction>,
    ) -> Result<(), AnimationError> {
        if value.is_nan() {
            return Err(AnimationError::config(format!(
                "blend node for {action} has a NaN value"
            )));
        }
        let at = self.nodes.partition_point(|node| node.value <= value);
        self.nodes.insert(
            at,
            BlendNode {
                value,
                action,
                matcher,
            },
        );
        Ok(())
    }

    pub fn nodes(&self) -> &[BlendNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Smallest and largest node values.
    #[must_use]
    pub fn range(&self) -> Option<(f32, f32)> {
        Some((self.nodes.first()?.value, self.nodes.last()?.value))
    }

    /// Weight of every node (in node order) for `parameter`.
    ///
    /// At most two weights are non-zero and they sum to 1. A NaN parameter
    /// clamps to the lowest node.
    pub fn evaluate(&self, parameter: f32) -> Result<Vec<f32>, AnimationError> {
        let (min, max) = self
            .range()
            .ok_or_else(|| AnimationError::config("blend space has no nodes"))?;

        let mut weights = vec![0.0; self.nodes.len()];
        if parameter.is_nan() || parameter <= min {
            weights[0] = 1.0;
            return Ok(weights);
        }
        if parameter >= max {
            weights[self.nodes.len() - 1] = 1.0;
            return Ok(weights);
        }

        // nodes[lo].value <= parameter < nodes[hi].value
        let hi = self.nodes.partition_point(|node| node.value <= parameter);
        let lo = hi - 1;
        let span = self.nodes[hi].value - self.nodes[lo].value;
        let t = if span > 0.0 {
            (parameter - self.nodes[lo].value) / span
        } else {
            0.0
        };
        weights[lo] = 1.0 - t;
        weights[hi] = t;
        Ok(weights)
    }

    /// Evaluate and write the weights into the mixer.
    pub fn apply(&self, mixer: &mut AnimationMixer, parameter: f32) -> Result<(), AnimationError> {
        let weights = self.evaluate(parameter)?;
        for (node, weight) in self.nodes.iter().zip(weights) {
            mixer.action_mut(node.action)?.weight = weight;
        }
        Ok(())
    }

    /// Advance every node's distance matcher by `distance_delta`.
    pub fn advance_matchers(
        &mut self,
        mixer: &mut AnimationMixer,
        distance_delta: f32,
    ) -> Result<(), AnimationError> {
        for matcher in self.nodes.iter_mut().filter_map(|node| node.matcher.as_mut()) {
            matcher.advance(mixer, distance_delta)?;
        }
        Ok(())
    }

    /// All actions referenced by the nodes, in node order.
    pub fn actions(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.nodes.iter().map(|node| node.action)
    }
}

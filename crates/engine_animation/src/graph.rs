//! Animation state graph.
//!
//! States live in a flat table indexed by [`StateId`] and are looked up by
//! name. Each state has an ordered list of outgoing transitions; every tick
//! the first rule that holds wins. The graph is fully cyclic and has no
//! terminal state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnimationError;
use crate::mixer::AnimationMixer;
use crate::rule::{Motion, Transition, TransitionRule};
use crate::state::AnimationState;

/// Index of a state inside its [`AnimationGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub usize);

/// Inputs for one graph tick.
#[derive(Debug)]
pub struct AnimationFrame<'a> {
    pub mixer: &'a mut AnimationMixer,
    pub motion: Motion,
    /// Seconds since the previous tick.
    pub dt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CompiledTransition {
    target: StateId,
    rule: TransitionRule,
}

/// Collects states and transitions, then validates them in
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct AnimationGraphBuilder {
    states: Vec<AnimationState>,
    transitions: Vec<(String, Transition)>,
}

impl AnimationGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(mut self, state: AnimationState) -> Self {
        self.states.push(state);
        self
    }

    /// Append a transition to `from`'s rule list. Order is priority.
    #[must_use]
    pub fn transition(mut self, from: impl Into<String>, transition: Transition) -> Self {
        self.transitions.push((from.into(), transition));
        self
    }

    /// Validate the graph against `mixer` and enter `initial`.
    ///
    /// Every action referenced by a state or a rule must exist in `mixer`.
    pub fn build(
        self,
        initial: &str,
        mixer: &mut AnimationMixer,
    ) -> Result<AnimationGraph, AnimationError> {
        let mut lookup = BTreeMap::new();
        for (index, state) in self.states.iter().enumerate() {
            state.validate()?;
            for id in state.actions() {
                mixer.action(id).map_err(|_| {
                    AnimationError::config(format!("state `{}` refers to missing {id}", state.name()))
                })?;
            }
            if lookup.insert(state.name().to_string(), StateId(index)).is_some() {
                return Err(AnimationError::config(format!(
                    "state `{}` is defined twice",
                    state.name()
                )));
            }
        }

        let resolve = |name: &str, role: &str| {
            lookup.get(name).copied().ok_or_else(|| {
                AnimationError::config(format!("{role} state `{name}` is not defined"))
            })
        };

        let mut rules = vec![Vec::new(); self.states.len()];
        for (from, transition) in self.transitions {
            let source = resolve(&from, "transition source")?;
            let target = resolve(&transition.target, "transition target")?;
            for id in transition.rule.actions() {
                mixer.action(id).map_err(|_| {
                    AnimationError::config(format!(
                        "rule `{from}` -> `{}` reads missing {id}",
                        transition.target
                    ))
                })?;
            }
            rules[source.0].push(CompiledTransition {
                target,
                rule: transition.rule,
            });
        }
        let current = resolve(initial, "initial")?;

        let mut graph = AnimationGraph {
            states: self.states,
            lookup,
            rules,
            current,
        };
        graph.states[current.0].enter(mixer)?;
        debug!(state = initial, states = graph.states.len(), "animation graph ready");
        Ok(graph)
    }
}

/// A built, running state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationGraph {
    states: Vec<AnimationState>,
    lookup: BTreeMap<String, StateId>,
    rules: Vec<Vec<CompiledTransition>>,
    current: StateId,
}

impl AnimationGraph {
    #[must_use]
    pub fn builder() -> AnimationGraphBuilder {
        AnimationGraphBuilder::new()
    }

    /// Name of the current state.
    #[must_use]
    pub fn current_state(&self) -> &str {
        self.states[self.current.0].name()
    }

    #[must_use]
    pub fn current_id(&self) -> StateId {
        self.current
    }

    #[must_use]
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.lookup.get(name).copied()
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&AnimationState> {
        self.states.get(id.0)
    }

    /// State names in definition order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(AnimationState::name)
    }

    /// Targets of the rules leaving `name`, in priority order.
    #[must_use]
    pub fn targets_of(&self, name: &str) -> Vec<&str> {
        self.state_id(name)
            .map(|id| {
                self.rules[id.0]
                    .iter()
                    .map(|t| self.states[t.target.0].name())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Evaluate the current state's rules, switch state if one holds, then
    /// drive the (possibly new) current state. Returns `true` on a
    /// transition.
    pub fn tick(&mut self, frame: AnimationFrame<'_>) -> Result<bool, AnimationError> {
        let AnimationFrame { mixer, motion, dt } = frame;

        let mut next = None;
        for transition in &self.rules[self.current.0] {
            if transition.rule.evaluate(&motion, mixer)? {
                next = Some(transition.target);
                break;
            }
        }

        let switched = match next {
            Some(target) if target != self.current => {
                self.switch_to(target, mixer)?;
                true
            }
            _ => false,
        };

        self.states[self.current.0].update(mixer, &motion, dt)?;
        Ok(switched)
    }

    /// Switch to `name` regardless of rules. Forcing the current state
    /// restarts it.
    pub fn force_state(&mut self, name: &str, mixer: &mut AnimationMixer) -> Result<(), AnimationError> {
        let target = self
            .state_id(name)
            .ok_or_else(|| AnimationError::config(format!("cannot force unknown state `{name}`")))?;
        self.switch_to(target, mixer)
    }

    fn switch_to(&mut self, target: StateId, mixer: &mut AnimationMixer) -> Result<(), AnimationError> {
        debug!(
            from = self.current_state(),
            to = self.states[target.0].name(),
            "animation state transition"
        );
        self.states[self.current.0].exit(mixer)?;
        self.current = target;
        self.states[self.current.0].enter(mixer)
    }
}

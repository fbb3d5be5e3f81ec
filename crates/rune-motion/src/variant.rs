//! Variants: named keyframe states plus the transitions between them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MotionError, Result};
use crate::registry::VariantName;
use crate::transition::TransitionSpec;
use crate::types::{KeyframeSet, StateName};

/// Duration reduced-motion variants collapse to.
pub const REDUCED_DURATION_MS: f32 = 10.0;

/// Immutable named set of visual states.
///
/// Every variant declares `hidden` and `visible`; interactive variants add
/// `hover` and `pressed`, and slide variants add `exit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: VariantName,
    states: BTreeMap<StateName, KeyframeSet>,
    /// Transition used when no per-state override exists.
    pub transition: TransitionSpec,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    state_transitions: BTreeMap<StateName, TransitionSpec>,
}

impl Variant {
    pub fn new(name: VariantName, transition: TransitionSpec) -> Self {
        Self {
            name,
            states: BTreeMap::new(),
            transition,
            state_transitions: BTreeMap::new(),
        }
    }

    /// Shorthand for the common hidden → visible pair.
    pub fn entrance(
        name: VariantName,
        hidden: KeyframeSet,
        visible: KeyframeSet,
        transition: TransitionSpec,
    ) -> Self {
        Self::new(name, transition)
            .with_state(StateName::Hidden, hidden)
            .with_state(StateName::Visible, visible)
    }

    pub fn with_state(mut self, state: StateName, keyframes: KeyframeSet) -> Self {
        self.states.insert(state, keyframes);
        self
    }

    /// Override the transition used when moving into `state`.
    pub fn with_state_transition(mut self, state: StateName, spec: TransitionSpec) -> Self {
        self.state_transitions.insert(state, spec);
        self
    }

    /// Parse a variant from JSON and check it declares `hidden` and `visible`.
    pub fn from_json(json: &str) -> Result<Self> {
        let variant: Variant = serde_json::from_str(json)?;
        variant.require(&[StateName::Hidden, StateName::Visible])?;
        Ok(variant)
    }

    pub fn has_state(&self, state: StateName) -> bool {
        self.states.contains_key(&state)
    }

    /// Keyframes for `state`; missing states are a configuration error.
    pub fn state(&self, state: StateName) -> Result<&KeyframeSet> {
        self.states
            .get(&state)
            .ok_or_else(|| MotionError::MissingState {
                variant: self.name.to_string(),
                state,
            })
    }

    /// Fail with `MissingState` on the first required state that is absent.
    pub fn require(&self, states: &[StateName]) -> Result<()> {
        for state in states {
            self.state(*state)?;
        }
        Ok(())
    }

    pub fn states(&self) -> impl Iterator<Item = (StateName, &KeyframeSet)> + '_ {
        self.states.iter().map(|(s, k)| (*s, k))
    }

    /// Transition for moving into `state`.
    pub fn transition_into(&self, state: StateName) -> &TransitionSpec {
        self.state_transitions.get(&state).unwrap_or(&self.transition)
    }

    /// Copy the interaction states (`hover`, `pressed`) of `other` onto this
    /// variant, along with their transitions.
    pub fn overlay(mut self, other: &Variant) -> Self {
        for state in [StateName::Hover, StateName::Pressed] {
            if let Some(keyframes) = other.states.get(&state) {
                self.states.insert(state, keyframes.clone());
                self.state_transitions
                    .insert(state, other.transition_into(state).clone());
            }
        }
        self
    }

    /// The reduced-motion equivalent of this variant.
    ///
    /// Every state keeps only its opacity, translation and scale fall back to
    /// identity, and every transition becomes a linear fade of at most
    /// `duration_ms`.
    pub fn reduced(&self, duration_ms: f32) -> Self {
        Self {
            name: self.name,
            states: self
                .states
                .iter()
                .map(|(state, keyframes)| (*state, keyframes.opacity_only()))
                .collect(),
            transition: self.transition.collapsed(duration_ms),
            state_transitions: self
                .state_transitions
                .iter()
                .map(|(state, spec)| (*state, spec.collapsed(duration_ms)))
                .collect(),
        }
    }
}

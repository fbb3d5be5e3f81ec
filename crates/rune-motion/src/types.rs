//! Core motion types and data structures.
//!
//! This module defines the fundamental types shared by the orchestration layer:
//! - `VisualProperty`: the properties a variant may animate
//! - `KeyframeSet`: an ordered property → value mapping for one state
//! - `StateName`: the named states a variant can declare
//! - `MotionState`: the observable phase of one orchestrator
//! - `ComponentId` / `ElementId`: handles for mounted components and host elements

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a mounted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl ComponentId {
    /// Generate a new unique component ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// Host-supplied reference to a laid-out element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Visual property a variant can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisualProperty {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
}

impl VisualProperty {
    pub const ALL: [VisualProperty; 4] = [
        Self::Opacity,
        Self::TranslateX,
        Self::TranslateY,
        Self::Scale,
    ];

    /// Value the property has when no keyframe sets it.
    pub fn identity(&self) -> f32 {
        match self {
            Self::Opacity | Self::Scale => 1.0,
            Self::TranslateX | Self::TranslateY => 0.0,
        }
    }

    /// Whether the property moves or resizes the element.
    pub fn is_motion(&self) -> bool {
        !matches!(self, Self::Opacity)
    }
}

/// Target values for one state of a variant.
///
/// Properties not present resolve to their identity value, so an empty set
/// describes the element at rest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyframeSet {
    values: BTreeMap<VisualProperty, f32>,
}

impl KeyframeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, property: VisualProperty, value: f32) -> Self {
        self.values.insert(property, value);
        self
    }

    pub fn opacity(self, value: f32) -> Self {
        self.with(VisualProperty::Opacity, value)
    }

    pub fn x(self, value: f32) -> Self {
        self.with(VisualProperty::TranslateX, value)
    }

    pub fn y(self, value: f32) -> Self {
        self.with(VisualProperty::TranslateY, value)
    }

    pub fn scale(self, value: f32) -> Self {
        self.with(VisualProperty::Scale, value)
    }

    pub fn set(&mut self, property: VisualProperty, value: f32) {
        self.values.insert(property, value);
    }

    /// Explicitly declared value, if any.
    pub fn get(&self, property: VisualProperty) -> Option<f32> {
        self.values.get(&property).copied()
    }

    /// Declared value or the property's identity.
    pub fn resolve(&self, property: VisualProperty) -> f32 {
        self.get(property).unwrap_or_else(|| property.identity())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VisualProperty, f32)> + '_ {
        self.values.iter().map(|(p, v)| (*p, *v))
    }

    /// Keep only the cross-fade part of this set.
    pub fn opacity_only(&self) -> Self {
        let mut out = Self::new();
        if let Some(opacity) = self.get(VisualProperty::Opacity) {
            out.set(VisualProperty::Opacity, opacity);
        }
        out
    }
}

/// Named state a variant can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateName {
    Hidden,
    Visible,
    Hover,
    Pressed,
    Exit,
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
            Self::Hover => "hover",
            Self::Pressed => "pressed",
            Self::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// Observable animation phase of one orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    #[default]
    Hidden,
    Entering,
    Visible,
    Hovered,
    Pressed,
}

impl MotionState {
    /// The variant state whose keyframes this phase animates towards.
    pub fn target(&self) -> StateName {
        match self {
            Self::Hidden => StateName::Hidden,
            Self::Entering | Self::Visible => StateName::Visible,
            Self::Hovered => StateName::Hover,
            Self::Pressed => StateName::Pressed,
        }
    }

    /// Whether the entrance has completed and the content is on screen.
    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Visible | Self::Hovered | Self::Pressed)
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

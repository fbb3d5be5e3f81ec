//! Events emitted by the motion runtime.
//!
//! The runtime pushes events while it handles host callbacks; the host
//! drains them afterwards to re-render the affected components.

use std::collections::VecDeque;

use crate::orchestrator::OrchestratorId;
use crate::types::{ComponentId, ElementId, MotionState};

#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    /// An orchestrator of `component` changed state.
    StateChanged {
        component: ComponentId,
        orchestrator: OrchestratorId,
        from: MotionState,
        to: MotionState,
    },
    /// The session's reduced-motion preference changed.
    PreferenceChanged { reduced: bool },
    /// Visibility could not be observed; the component was revealed as is.
    Degraded {
        component: ComponentId,
        element: ElementId,
        reason: String,
    },
}

impl MotionEvent {
    pub fn component(&self) -> Option<ComponentId> {
        match self {
            Self::StateChanged { component, .. } | Self::Degraded { component, .. } => {
                Some(*component)
            }
            Self::PreferenceChanged { .. } => None,
        }
    }

    /// Target state of a state change.
    pub fn entered_state(&self) -> Option<MotionState> {
        match self {
            Self::StateChanged { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// FIFO of pending [`MotionEvent`]s.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<MotionEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MotionEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Pending events for one component.
    pub fn for_component(&self, component: ComponentId) -> Vec<&MotionEvent> {
        self.events
            .iter()
            .filter(|e| e.component() == Some(component))
            .collect()
    }
}

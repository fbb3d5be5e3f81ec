//! Sequenced entrances for groups of siblings.
//!
//! A [`StaggerCoordinator`] owns a container orchestrator and an ordered list
//! of child orchestrators. When the container's observer reports `Entered`,
//! every child is started with an offset of `index * step` on top of its own
//! delay, so the children animate in one after another.

use crate::observer::VisibilityEvent;
use crate::orchestrator::{Orchestrator, OrchestratorId, StateChange};
use crate::preference::MotionPreference;
use crate::timer::{FiredTimer, TimerQueue};

#[derive(Debug)]
struct StaggerChild {
    orchestrator: Orchestrator,
    launched: bool,
}

/// Parent orchestrator that gates and sequences its children.
#[derive(Debug)]
pub struct StaggerCoordinator {
    container: Orchestrator,
    step_ms: f32,
    children: Vec<StaggerChild>,
    started: bool,
}

impl StaggerCoordinator {
    pub fn new(container: Orchestrator, step_ms: f32) -> Self {
        Self {
            container,
            step_ms: step_ms.max(0.0),
            children: Vec::new(),
            started: false,
        }
    }

    /// Build with the step carried by the container variant's transition.
    pub fn from_container(container: Orchestrator) -> Self {
        let step = container
            .declared_variant()
            .transition
            .stagger_children_ms
            .unwrap_or(0.0);
        Self::new(container, step)
    }

    pub fn container(&self) -> &Orchestrator {
        &self.container
    }

    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&Orchestrator> {
        self.children.get(index).map(|c| &c.orchestrator)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Orchestrator> {
        self.children.get_mut(index).map(|c| &mut c.orchestrator)
    }

    pub fn children(&self) -> impl Iterator<Item = &Orchestrator> + '_ {
        self.children.iter().map(|c| &c.orchestrator)
    }

    pub fn index_of(&self, id: OrchestratorId) -> Option<usize> {
        self.children.iter().position(|c| c.orchestrator.id() == id)
    }

    /// Whether `id` is the container or one of the children.
    pub fn owns(&self, id: OrchestratorId) -> bool {
        self.container.id() == id || self.index_of(id).is_some()
    }

    /// Entrance delay child `index` is (or will be) scheduled with.
    pub fn scheduled_delay_ms(&self, index: usize) -> Option<f32> {
        self.child(index).map(Orchestrator::entrance_delay_ms)
    }

    /// Append a child and return its index.
    ///
    /// If the coordinator already started, call [`start_pending`](Self::start_pending)
    /// to launch it.
    pub fn add(&mut self, mut child: Orchestrator) -> usize {
        let index = self.children.len();
        child.set_stagger_offset(index as f32 * self.step_ms);
        self.children.push(StaggerChild {
            orchestrator: child,
            launched: false,
        });
        index
    }

    /// Remove the child at `index`, unmounting it. Later children move up one
    /// slot and take the offset of their new index.
    pub fn remove(&mut self, index: usize, timers: &mut TimerQueue) -> Option<Orchestrator> {
        if index >= self.children.len() {
            return None;
        }
        let mut removed = self.children.remove(index);
        removed.orchestrator.unmount(timers);
        self.reindex();
        Some(removed.orchestrator)
    }

    /// Start the container and every child. Runs once per entrance.
    pub fn start(&mut self, timers: &mut TimerQueue) -> Vec<StateChange> {
        if self.started {
            return Vec::new();
        }
        self.started = true;
        tracing::debug!(
            container = %self.container.id(),
            children = self.children.len(),
            step_ms = self.step_ms,
            "stagger started"
        );

        let mut changes = Vec::new();
        changes.extend(self.container.begin_entrance(timers));
        changes.extend(self.start_pending(timers));
        changes
    }

    /// Launch children added since the last start. No-op before `start`.
    pub fn start_pending(&mut self, timers: &mut TimerQueue) -> Vec<StateChange> {
        if !self.started {
            return Vec::new();
        }
        let mut changes = Vec::new();
        for child in self.children.iter_mut().filter(|c| !c.launched) {
            child.launched = true;
            changes.extend(child.orchestrator.begin_entrance(timers));
        }
        changes
    }

    /// Feed the container's visibility crossing.
    ///
    /// `Entered` starts the sequence. `Left` only matters for a repeating
    /// container: everything returns to hidden and the next `Entered` replays.
    pub fn on_visibility(&mut self, event: VisibilityEvent, timers: &mut TimerQueue) -> Vec<StateChange> {
        match event {
            VisibilityEvent::Entered => self.start(timers),
            VisibilityEvent::Left => {
                if self.container.options().once || !self.started {
                    return Vec::new();
                }
                self.started = false;
                let mut changes = Vec::new();
                changes.extend(self.container.on_visibility(VisibilityEvent::Left, timers));
                for child in &mut self.children {
                    child.launched = false;
                    changes.extend(child.orchestrator.on_visibility(VisibilityEvent::Left, timers));
                }
                changes
            }
        }
    }

    /// Route a fired timer to the orchestrator that owns it.
    pub fn on_timer(&mut self, fired: &FiredTimer, timers: &mut TimerQueue) -> Option<StateChange> {
        if self.container.id() == fired.owner {
            return self.container.on_timer(fired, timers);
        }
        let index = self.index_of(fired.owner)?;
        self.children[index].orchestrator.on_timer(fired, timers)
    }

    pub fn on_preference(&mut self, preference: MotionPreference, timers: &mut TimerQueue) -> Vec<StateChange> {
        let mut changes = Vec::new();
        changes.extend(self.container.on_preference(preference, timers));
        for child in &mut self.children {
            changes.extend(child.orchestrator.on_preference(preference, timers));
        }
        changes
    }

    /// Show everything immediately.
    pub fn reveal(&mut self, timers: &mut TimerQueue) -> Vec<StateChange> {
        self.started = true;
        let mut changes = Vec::new();
        changes.extend(self.container.reveal(timers));
        for child in &mut self.children {
            child.launched = true;
            changes.extend(child.orchestrator.reveal(timers));
        }
        changes
    }

    pub fn unmount(&mut self, timers: &mut TimerQueue) {
        self.container.unmount(timers);
        for child in &mut self.children {
            child.orchestrator.unmount(timers);
        }
    }

    fn reindex(&mut self) {
        for (index, child) in self.children.iter_mut().enumerate() {
            child
                .orchestrator
                .set_stagger_offset(index as f32 * self.step_ms);
        }
    }
}

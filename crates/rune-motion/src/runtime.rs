//! Motion runtime: owns every live orchestrator and routes host callbacks.
//!
//! The host mounts components from [`PresetSpec`]s, forwards intersection
//! entries, pointer input and the reduced-motion environment signal, and
//! advances the clock once per frame. After each call it drains the
//! [`MotionEvent`]s and re-renders what changed.
//!
//! # Usage
//!
//! ```
//! use rune_motion::{ElementId, MotionRuntime, MotionState, PresetSpec, Rect, SimulatedViewport};
//!
//! let mut viewport = SimulatedViewport::new(800.0, 600.0);
//! let hero = ElementId(1);
//! viewport.place(hero, Rect::new(0.0, 0.0, 800.0, 400.0));
//!
//! let mut runtime = MotionRuntime::default();
//! let id = runtime.mount(&PresetSpec::animated_section(), hero, &mut viewport)?;
//! assert_eq!(runtime.state(id), Some(MotionState::Entering));
//!
//! runtime.advance(1000.0);
//! assert_eq!(runtime.state(id), Some(MotionState::Visible));
//! # Ok::<(), rune_motion::MotionError>(())
//! ```

use std::collections::HashMap;

use rune_config::MotionSettings;

use crate::error::{MotionError, Result};
use crate::events::{EventQueue, MotionEvent};
use crate::observer::{IntersectionHost, ObserverOptions, VisibilityEvent, VisibilityObserver};
use crate::orchestrator::{Orchestrator, OrchestratorId, OrchestratorOptions, PointerInput, StateChange};
use crate::preference::{MotionPreference, MotionPreferenceResolver, ReducedMotionQuery, StaticQuery};
use crate::presets::{PresetSpec, Trigger};
use crate::registry::{StaggerSteps, VariantRegistry};
use crate::stagger::StaggerCoordinator;
use crate::timer::{FiredTimer, TimerQueue};
use crate::types::{ComponentId, ElementId, KeyframeSet, MotionState};
use crate::variant::REDUCED_DURATION_MS;

#[derive(Debug)]
enum Body {
    Single(Orchestrator),
    Group(StaggerCoordinator),
    /// Orchestrator lives in the parent's coordinator.
    Member {
        parent: ComponentId,
        orchestrator: OrchestratorId,
    },
}

#[derive(Debug)]
struct Component {
    element: ElementId,
    observer: Option<VisibilityObserver>,
    body: Body,
    payload: Option<Orchestrator>,
    children: Vec<ComponentId>,
}

impl Component {
    fn on_visibility(&mut self, event: VisibilityEvent, timers: &mut TimerQueue) -> Vec<StateChange> {
        match &mut self.body {
            Body::Single(o) => o.on_visibility(event, timers).into_iter().collect(),
            Body::Group(c) => c.on_visibility(event, timers),
            Body::Member { .. } => Vec::new(),
        }
    }

    fn on_timer(&mut self, fired: &FiredTimer, timers: &mut TimerQueue) -> Option<StateChange> {
        if let Some(payload) = self.payload.as_mut().filter(|p| p.id() == fired.owner) {
            return payload.on_timer(fired, timers);
        }
        match &mut self.body {
            Body::Single(o) => o.on_timer(fired, timers),
            Body::Group(c) => c.on_timer(fired, timers),
            Body::Member { .. } => None,
        }
    }

    fn on_preference(&mut self, preference: MotionPreference, timers: &mut TimerQueue) -> Vec<StateChange> {
        let mut changes = match &mut self.body {
            Body::Single(o) => o.on_preference(preference, timers).into_iter().collect(),
            Body::Group(c) => c.on_preference(preference, timers),
            Body::Member { .. } => Vec::new(),
        };
        if let Some(payload) = self.payload.as_mut() {
            changes.extend(payload.on_preference(preference, timers));
        }
        changes
    }

    fn reveal(&mut self, timers: &mut TimerQueue) -> Vec<StateChange> {
        match &mut self.body {
            Body::Single(o) => o.reveal(timers).into_iter().collect(),
            Body::Group(c) => c.reveal(timers),
            Body::Member { .. } => Vec::new(),
        }
    }

    fn single_mut(&mut self) -> Option<&mut Orchestrator> {
        match &mut self.body {
            Body::Single(o) => Some(o),
            _ => None,
        }
    }
}

/// Orchestrator that receives pointer input for `id`. Stagger members
/// resolve to their child in the parent's coordinator.
fn interactive_mut(
    components: &mut HashMap<ComponentId, Component>,
    id: ComponentId,
) -> Option<&mut Orchestrator> {
    let member = match &components.get(&id)?.body {
        Body::Member { parent, orchestrator } => Some((*parent, *orchestrator)),
        _ => None,
    };
    match member {
        Some((parent, orchestrator)) => match &mut components.get_mut(&parent)?.body {
            Body::Group(coordinator) => {
                let index = coordinator.index_of(orchestrator)?;
                coordinator.child_mut(index)
            }
            _ => None,
        },
        None => components.get_mut(&id)?.single_mut(),
    }
}

/// Which component reports an orchestrator's changes, and which one holds it.
#[derive(Debug, Clone, Copy)]
struct Slot {
    component: ComponentId,
    holder: ComponentId,
}

/// Single-threaded owner of all live motion state.
#[derive(Debug)]
pub struct MotionRuntime {
    registry: VariantRegistry,
    resolver: MotionPreferenceResolver,
    timers: TimerQueue,
    observer_defaults: ObserverOptions,
    reduced_duration_ms: f32,
    components: HashMap<ComponentId, Component>,
    element_index: HashMap<ElementId, ComponentId>,
    slots: HashMap<OrchestratorId, Slot>,
    events: EventQueue,
}

impl Default for MotionRuntime {
    fn default() -> Self {
        Self::new(
            VariantRegistry::default(),
            MotionPreferenceResolver::system(StaticQuery(None)),
        )
    }
}

impl MotionRuntime {
    /// Create a runtime and resolve the session preference.
    pub fn new(registry: VariantRegistry, mut resolver: MotionPreferenceResolver) -> Self {
        resolver.resolve();
        Self {
            registry,
            resolver,
            timers: TimerQueue::new(),
            observer_defaults: ObserverOptions::default(),
            reduced_duration_ms: REDUCED_DURATION_MS,
            components: HashMap::new(),
            element_index: HashMap::new(),
            slots: HashMap::new(),
            events: EventQueue::new(),
        }
    }

    /// Create a runtime from loaded settings.
    pub fn with_settings(settings: &MotionSettings, query: Box<dyn ReducedMotionQuery>) -> Self {
        let steps = StaggerSteps {
            fast_ms: settings.stagger.fast_ms,
            normal_ms: settings.stagger.normal_ms,
            slow_ms: settings.stagger.slow_ms,
        };
        let resolver = MotionPreferenceResolver::new(query, settings.preference.reduced_motion);
        let mut runtime = Self::new(VariantRegistry::with_catalogue(steps), resolver);
        runtime.observer_defaults = ObserverOptions::new(settings.observer.threshold, settings.observer.once);
        runtime.reduced_duration_ms = settings.preference.reduced_duration_ms.max(0.0);
        runtime
    }

    /// Mount a component bound to `element`.
    ///
    /// Configuration errors (`UnknownVariant`, `MissingState`) are returned.
    /// If the element cannot be observed the component is mounted anyway and
    /// revealed immediately.
    pub fn mount(
        &mut self,
        spec: &PresetSpec,
        element: ElementId,
        host: &mut dyn IntersectionHost,
    ) -> Result<ComponentId> {
        let preference = self.resolver.current();
        let options = spec.orchestrator_options(self.observer_defaults.once, self.reduced_duration_ms);
        let orchestrator = Orchestrator::new(spec.build_variant(&self.registry)?, options, preference)?;
        let payload = self.build_payload(spec, preference)?;

        let id = ComponentId::new();
        self.track(orchestrator.id(), id, id);
        if let Some(payload) = &payload {
            self.track(payload.id(), id, id);
        }
        let body = if spec.is_stagger() {
            Body::Group(StaggerCoordinator::from_container(orchestrator))
        } else {
            Body::Single(orchestrator)
        };
        self.components.insert(
            id,
            Component {
                element,
                observer: None,
                body,
                payload,
                children: Vec::new(),
            },
        );
        tracing::debug!(component = %id, %element, variant = %spec.variant, "component mounted");

        // a stagger item mounted on its own watches its own element
        let trigger = match spec.trigger {
            Trigger::Parent => Trigger::VIEWPORT,
            trigger => trigger,
        };
        match trigger.observer_options(self.observer_defaults) {
            None => self.dispatch_visibility(id, VisibilityEvent::Entered),
            Some(options) => match VisibilityObserver::observe(element, options, host) {
                Ok(mut observer) => {
                    let initial: Vec<_> = observer.events().collect();
                    self.element_index.insert(element, id);
                    if let Some(component) = self.components.get_mut(&id) {
                        component.observer = Some(observer);
                    }
                    for event in initial {
                        self.dispatch_visibility(id, event);
                    }
                    self.release_exhausted(id, host);
                }
                Err(err) => self.degrade(id, element, err),
            },
        }
        Ok(id)
    }

    /// Mount a stagger child under `parent`, which must be a stagger container.
    pub fn mount_child(&mut self, parent: ComponentId, spec: &PresetSpec) -> Result<ComponentId> {
        let preference = self.resolver.current();
        let variant = spec.build_variant(&self.registry)?;
        let payload = self.build_payload(spec, preference)?;

        let Some(Component {
            element,
            body: Body::Group(coordinator),
            children,
            ..
        }) = self.components.get_mut(&parent)
        else {
            return Err(MotionError::InvalidComponent {
                component: parent,
                expected: "a stagger container",
            });
        };

        let once = coordinator.container().options().once;
        let options = spec
            .orchestrator_options(once, self.reduced_duration_ms)
            .once(once);
        let orchestrator = Orchestrator::new(variant, options, preference)?;
        let orchestrator_id = orchestrator.id();
        let element = *element;

        let payload_id = payload.as_ref().map(Orchestrator::id);

        let id = ComponentId::new();
        coordinator.add(orchestrator);
        let changes = coordinator.start_pending(&mut self.timers);
        children.push(id);

        self.components.insert(
            id,
            Component {
                element,
                observer: None,
                body: Body::Member {
                    parent,
                    orchestrator: orchestrator_id,
                },
                payload,
                children: Vec::new(),
            },
        );
        self.track(orchestrator_id, id, parent);
        if let Some(payload_id) = payload_id {
            self.track(payload_id, id, id);
        }
        self.record(changes);
        Ok(id)
    }

    /// Unmount a component: cancel its timers and stop observing its element.
    ///
    /// Unmounting a stagger container unmounts its children too.
    pub fn unmount(&mut self, id: ComponentId, host: &mut dyn IntersectionHost) -> bool {
        let Some(mut component) = self.components.remove(&id) else {
            return false;
        };
        if let Some(observer) = component.observer.as_mut() {
            observer.disconnect(host);
        }
        if self.element_index.get(&component.element) == Some(&id) {
            self.element_index.remove(&component.element);
        }

        let mut released = vec![id];
        match &mut component.body {
            Body::Single(o) => o.unmount(&mut self.timers),
            Body::Group(c) => {
                c.unmount(&mut self.timers);
                for child in &component.children {
                    if let Some(mut member) = self.components.remove(child) {
                        if let Some(payload) = member.payload.as_mut() {
                            payload.unmount(&mut self.timers);
                        }
                    }
                    released.push(*child);
                }
            }
            Body::Member { parent, orchestrator } => {
                let (parent, orchestrator) = (*parent, *orchestrator);
                if let Some(group) = self.components.get_mut(&parent) {
                    group.children.retain(|c| *c != id);
                    if let Body::Group(c) = &mut group.body {
                        if let Some(index) = c.index_of(orchestrator) {
                            c.remove(index, &mut self.timers);
                        }
                    }
                }
            }
        }
        if let Some(payload) = component.payload.as_mut() {
            payload.unmount(&mut self.timers);
        }

        self.slots
            .retain(|_, slot| !released.contains(&slot.component) && !released.contains(&slot.holder));
        tracing::debug!(component = %id, "component unmounted");
        true
    }

    /// Forward intersection entries reported by the host.
    pub fn intersections(&mut self, entries: &[(ElementId, f32)], host: &mut dyn IntersectionHost) {
        for (element, ratio) in entries {
            let Some(&id) = self.element_index.get(element) else {
                continue;
            };
            let events: Vec<_> = match self
                .components
                .get_mut(&id)
                .and_then(|c| c.observer.as_mut())
            {
                Some(observer) => {
                    observer.on_intersection(*ratio);
                    observer.events().collect()
                }
                None => continue,
            };
            for event in events {
                self.dispatch_visibility(id, event);
            }
            self.release_exhausted(id, host);
        }
    }

    /// Forward pointer or focus input for an interactive component.
    pub fn pointer(&mut self, id: ComponentId, input: PointerInput) {
        let change = interactive_mut(&mut self.components, id)
            .and_then(|o| o.on_pointer(input, &mut self.timers));
        self.record(change);
    }

    pub fn set_disabled(&mut self, id: ComponentId, disabled: bool) {
        let change = interactive_mut(&mut self.components, id)
            .and_then(|o| o.set_disabled(disabled, &mut self.timers));
        self.record(change);
    }

    /// Start the payload timeline of an image component.
    pub fn payload_ready(&mut self, id: ComponentId) -> Result<()> {
        let payload = self
            .components
            .get_mut(&id)
            .and_then(|c| c.payload.as_mut())
            .ok_or(MotionError::InvalidComponent {
                component: id,
                expected: "a component with a payload",
            })?;
        let change = payload.begin_entrance(&mut self.timers);
        self.record(change);
        Ok(())
    }

    /// Advance the clock by `delta_ms`, firing due timers in order.
    pub fn advance(&mut self, delta_ms: f32) {
        let until = self.timers.now_ms() + f64::from(delta_ms.max(0.0));
        while let Some(fired) = self.timers.pop_due(until) {
            let Some(slot) = self.slots.get(&fired.owner).copied() else {
                continue;
            };
            let change = self
                .components
                .get_mut(&slot.holder)
                .and_then(|c| c.on_timer(&fired, &mut self.timers));
            self.record(change);
        }
        self.timers.settle(until);
    }

    /// The host reported a change of the reduced-motion signal.
    ///
    /// Every live orchestrator has been re-evaluated when this returns.
    pub fn environment_changed(&mut self) -> Option<MotionPreference> {
        let preference = self.resolver.environment_changed()?;
        self.events.push(MotionEvent::PreferenceChanged {
            reduced: preference.reduced,
        });

        let mut ids: Vec<_> = self.components.keys().copied().collect();
        ids.sort();
        for id in ids {
            let changes = match self.components.get_mut(&id) {
                Some(component) => component.on_preference(preference, &mut self.timers),
                None => continue,
            };
            self.record(changes);
        }
        Some(preference)
    }

    pub fn state(&self, id: ComponentId) -> Option<MotionState> {
        self.orchestrator(id).map(Orchestrator::state)
    }

    pub fn payload_state(&self, id: ComponentId) -> Option<MotionState> {
        self.components.get(&id)?.payload.as_ref().map(Orchestrator::state)
    }

    /// Current visual frame of a component.
    pub fn sample(&self, id: ComponentId) -> Option<KeyframeSet> {
        self.orchestrator(id).map(|o| o.sample(self.timers.now_ms()))
    }

    pub fn sample_payload(&self, id: ComponentId) -> Option<KeyframeSet> {
        let payload = self.components.get(&id)?.payload.as_ref()?;
        Some(payload.sample(self.timers.now_ms()))
    }

    /// The orchestrator driving a component (the container for a stagger group).
    pub fn orchestrator(&self, id: ComponentId) -> Option<&Orchestrator> {
        match &self.components.get(&id)?.body {
            Body::Single(o) => Some(o),
            Body::Group(c) => Some(c.container()),
            Body::Member { parent, orchestrator } => {
                let coordinator = self.coordinator(*parent)?;
                coordinator.child(coordinator.index_of(*orchestrator)?)
            }
        }
    }

    pub fn coordinator(&self, id: ComponentId) -> Option<&StaggerCoordinator> {
        match &self.components.get(&id)?.body {
            Body::Group(c) => Some(c),
            _ => None,
        }
    }

    /// Children of a stagger container, in stagger order.
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        self.components
            .get(&id)
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_mounted(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    /// Whether the component still listens for visibility changes.
    pub fn is_observing(&self, id: ComponentId) -> bool {
        self.components
            .get(&id)
            .and_then(|c| c.observer.as_ref())
            .is_some_and(VisibilityObserver::is_attached)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Drain all events emitted since the last drain.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.events.drain()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    pub fn now_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    pub fn preference(&self) -> MotionPreference {
        self.resolver.peek()
    }

    pub fn resolver_mut(&mut self) -> &mut MotionPreferenceResolver {
        &mut self.resolver
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Register replacement variants; affects components mounted afterwards.
    pub fn registry_mut(&mut self) -> &mut VariantRegistry {
        &mut self.registry
    }

    fn build_payload(&self, spec: &PresetSpec, preference: MotionPreference) -> Result<Option<Orchestrator>> {
        let Some(name) = spec.payload else {
            return Ok(None);
        };
        let payload = Orchestrator::new(
            self.registry.get(name)?.clone(),
            OrchestratorOptions::default().with_reduced_duration(self.reduced_duration_ms),
            preference,
        )?;
        Ok(Some(payload))
    }

    fn track(&mut self, orchestrator: OrchestratorId, component: ComponentId, holder: ComponentId) {
        self.slots.insert(orchestrator, Slot { component, holder });
    }

    fn dispatch_visibility(&mut self, id: ComponentId, event: VisibilityEvent) {
        let changes = match self.components.get_mut(&id) {
            Some(component) => component.on_visibility(event, &mut self.timers),
            None => return,
        };
        tracing::trace!(component = %id, ?event, "visibility");
        self.record(changes);
    }

    /// Stop observing once an observer can no longer report anything.
    fn release_exhausted(&mut self, id: ComponentId, host: &mut dyn IntersectionHost) {
        let Some(component) = self.components.get_mut(&id) else {
            return;
        };
        if let Some(observer) = component.observer.as_mut().filter(|o| o.is_exhausted()) {
            observer.disconnect(host);
            self.element_index.remove(&component.element);
        }
    }

    fn degrade(&mut self, id: ComponentId, element: ElementId, err: MotionError) {
        tracing::warn!(component = %id, %element, error = %err, "cannot observe element, revealing content");
        self.events.push(MotionEvent::Degraded {
            component: id,
            element,
            reason: err.to_string(),
        });
        let changes = match self.components.get_mut(&id) {
            Some(component) => component.reveal(&mut self.timers),
            None => return,
        };
        self.record(changes);
    }

    fn record(&mut self, changes: impl IntoIterator<Item = StateChange>) {
        for change in changes {
            let Some(slot) = self.slots.get(&change.orchestrator) else {
                continue;
            };
            self.events.push(MotionEvent::StateChanged {
                component: slot.component,
                orchestrator: change.orchestrator,
                from: change.from,
                to: change.to,
            });
        }
    }
}

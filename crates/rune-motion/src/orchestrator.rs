//! Per-component motion state machine.
//!
//! ```text
//! Hidden ──entered (+delay)──▶ Entering ──duration──▶ Visible ⇄ Hovered ⇄ Pressed
//!   ▲                             │                      │
//!   └────────── left (once = false only) ◀───────────────┘
//! ```
//!
//! All waiting goes through [`TimerQueue`]; the orchestrator owns at most one
//! pending timer and cancels it on teardown. Handlers return the state change
//! they caused, reported as the state before and after the whole call.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::observer::VisibilityEvent;
use crate::preference::MotionPreference;
use crate::timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
use crate::transition::ActiveTransition;
use crate::types::{KeyframeSet, MotionState, StateName};
use crate::variant::{Variant, REDUCED_DURATION_MS};

/// Unique identifier for an orchestrator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrchestratorId(pub u64);

impl OrchestratorId {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for OrchestratorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrchestratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "orchestrator#{}", self.0)
    }
}

/// Per-instance configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorOptions {
    /// Declared entrance delay in milliseconds.
    pub delay_ms: f32,
    /// Entrance plays once; `left` events are ignored.
    pub once: bool,
    /// Hover and press states are part of the feature set.
    pub interactive: bool,
    /// Interaction is suppressed while disabled.
    pub disabled: bool,
    /// Duration transitions collapse to under reduced motion.
    pub reduced_duration_ms: f32,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            delay_ms: 0.0,
            once: true,
            interactive: false,
            disabled: false,
            reduced_duration_ms: REDUCED_DURATION_MS,
        }
    }
}

impl OrchestratorOptions {
    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn repeating(self) -> Self {
        self.once(false)
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_reduced_duration(mut self, duration_ms: f32) -> Self {
        self.reduced_duration_ms = duration_ms.max(0.0);
        self
    }

    /// States the bound variant must declare.
    pub fn required_states(&self) -> Vec<StateName> {
        let mut states = vec![StateName::Hidden, StateName::Visible];
        if self.interactive {
            states.extend([StateName::Hover, StateName::Pressed]);
        }
        states
    }
}

/// Pointer or focus input from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerInput {
    HoverStart,
    HoverEnd,
    FocusIn,
    FocusOut,
    PressStart,
    PressEnd,
}

/// A transition of one orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub orchestrator: OrchestratorId,
    pub from: MotionState,
    pub to: MotionState,
}

#[derive(Debug, Clone, Copy, Default)]
struct PointerStatus {
    hovered: bool,
    focused: bool,
    pressed: bool,
}

impl PointerStatus {
    fn engaged(&self) -> bool {
        self.hovered || self.focused
    }

    fn apply(&mut self, input: PointerInput) {
        match input {
            PointerInput::HoverStart => self.hovered = true,
            PointerInput::FocusIn => self.focused = true,
            PointerInput::HoverEnd => self.hovered = false,
            PointerInput::FocusOut => self.focused = false,
            PointerInput::PressStart => self.pressed = true,
            PointerInput::PressEnd => self.pressed = false,
        }
        // a press ends when the pointer/focus leaves
        if !self.engaged() {
            self.pressed = false;
        }
    }
}

/// Drives the motion state of one component instance.
#[derive(Debug)]
pub struct Orchestrator {
    id: OrchestratorId,
    base: Variant,
    variant: Variant,
    options: OrchestratorOptions,
    preference: MotionPreference,
    state: MotionState,
    stagger_offset_ms: f32,
    pending: Option<TimerId>,
    segment: ActiveTransition,
    pointer: PointerStatus,
    mounted: bool,
    entered_once: bool,
}

impl Orchestrator {
    /// Bind `variant` for this instance.
    ///
    /// Fails with `MissingState` if the variant lacks a state the options
    /// require (`hidden`/`visible`, plus `hover`/`pressed` when interactive).
    pub fn new(
        variant: Variant,
        options: OrchestratorOptions,
        preference: MotionPreference,
    ) -> Result<Self> {
        variant.require(&options.required_states())?;

        let effective = if preference.reduced {
            variant.reduced(options.reduced_duration_ms)
        } else {
            variant.clone()
        };
        let hidden = effective.state(StateName::Hidden)?.clone();

        Ok(Self {
            id: OrchestratorId::new(),
            base: variant,
            variant: effective,
            options,
            preference,
            state: MotionState::Hidden,
            stagger_offset_ms: 0.0,
            pending: None,
            segment: ActiveTransition::settled(hidden, 0.0),
            pointer: PointerStatus::default(),
            mounted: true,
            entered_once: false,
        })
    }

    pub fn id(&self) -> OrchestratorId {
        self.id
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// The variant in effect (collapsed under reduced motion).
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// The variant as declared.
    pub fn declared_variant(&self) -> &Variant {
        &self.base
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn preference(&self) -> MotionPreference {
        self.preference
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending
    }

    /// Whether hover/press transitions can currently be taken.
    pub fn interactions_enabled(&self) -> bool {
        self.options.interactive && !self.options.disabled && !self.preference.reduced
    }

    pub fn stagger_offset_ms(&self) -> f32 {
        self.stagger_offset_ms
    }

    pub(crate) fn set_stagger_offset(&mut self, offset_ms: f32) {
        self.stagger_offset_ms = offset_ms.max(0.0);
    }

    /// Time from the entrance trigger until `Entering` begins.
    pub fn entrance_delay_ms(&self) -> f32 {
        self.options.delay_ms + self.stagger_offset_ms + self.variant.transition.delay_ms
    }

    /// Interpolated frame at `now_ms`.
    pub fn sample(&self, now_ms: f64) -> KeyframeSet {
        self.segment.current_value(now_ms)
    }

    /// Feed a visibility crossing.
    pub fn on_visibility(
        &mut self,
        event: VisibilityEvent,
        timers: &mut TimerQueue,
    ) -> Option<StateChange> {
        if !self.mounted {
            return None;
        }
        match event {
            VisibilityEvent::Entered => {
                if self.options.once && self.entered_once {
                    return None;
                }
                self.begin_entrance(timers)
            }
            VisibilityEvent::Left => {
                if self.options.once {
                    return None;
                }
                self.cancel_pending(timers);
                if self.state == MotionState::Hidden {
                    return None;
                }
                let target = if self.variant.has_state(StateName::Exit) {
                    StateName::Exit
                } else {
                    StateName::Hidden
                };
                let spec = self.variant.transition_into(target).clone();
                let frame = self.keyframes(target);
                self.segment.retarget(timers.now_ms(), frame, &spec);
                self.transition_to(MotionState::Hidden)
            }
        }
    }

    /// Start the entrance: wait out the delay, then enter.
    ///
    /// No-op unless `Hidden` with nothing pending.
    pub fn begin_entrance(&mut self, timers: &mut TimerQueue) -> Option<StateChange> {
        if !self.mounted || self.state != MotionState::Hidden || self.pending.is_some() {
            return None;
        }
        let delay = self.entrance_delay_ms();
        if delay > 0.0 {
            tracing::debug!(orchestrator = %self.id, delay_ms = delay, "entrance scheduled");
            self.pending = Some(timers.schedule(self.id, TimerKind::BeginEntrance, delay));
            None
        } else {
            self.enter(timers)
        }
    }

    /// Handle a timer owned by this orchestrator. Stale timers are ignored.
    pub fn on_timer(&mut self, fired: &FiredTimer, timers: &mut TimerQueue) -> Option<StateChange> {
        if !self.mounted || self.pending != Some(fired.id) {
            return None;
        }
        self.pending = None;

        match fired.kind {
            TimerKind::BeginEntrance => self.enter(timers),
            TimerKind::CompleteEntrance => {
                if self.state != MotionState::Entering {
                    return None;
                }
                let from = self.state;
                self.state = MotionState::Visible;
                self.entered_once = true;

                // input that arrived mid-entrance applies now
                let target = self.interaction_target();
                if target != MotionState::Visible {
                    self.retarget_to(target, timers.now_ms());
                    self.state = target;
                }
                Some(self.changed(from))
            }
        }
    }

    /// Feed pointer or focus input.
    ///
    /// Input is always recorded. It only moves the state once the entrance
    /// has completed and interactions are enabled.
    pub fn on_pointer(&mut self, input: PointerInput, timers: &mut TimerQueue) -> Option<StateChange> {
        self.pointer.apply(input);
        if !self.mounted || !self.state.is_shown() || !self.interactions_enabled() {
            return None;
        }
        self.settle_interaction(timers.now_ms())
    }

    /// Toggle the disabled flag; a disabled component drops back to `Visible`.
    pub fn set_disabled(&mut self, disabled: bool, timers: &mut TimerQueue) -> Option<StateChange> {
        self.options.disabled = disabled;
        if !self.mounted || !self.state.is_shown() {
            return None;
        }
        self.settle_interaction(timers.now_ms())
    }

    /// Re-evaluate against a new preference.
    pub fn on_preference(
        &mut self,
        preference: MotionPreference,
        timers: &mut TimerQueue,
    ) -> Option<StateChange> {
        if preference == self.preference {
            return None;
        }
        self.preference = preference;
        self.variant = if preference.reduced {
            self.base.reduced(self.options.reduced_duration_ms)
        } else {
            self.base.clone()
        };
        if !self.mounted {
            return None;
        }

        let now = timers.now_ms();
        match self.state {
            MotionState::Hovered | MotionState::Pressed if preference.reduced => {
                self.retarget_to(MotionState::Visible, now);
                self.transition_to(MotionState::Visible)
            }
            MotionState::Entering if preference.reduced => {
                // finish on the collapsed timing
                self.cancel_pending(timers);
                let spec = self.variant.transition_into(StateName::Visible).clone();
                self.segment = ActiveTransition::new(
                    self.segment.current_value(now).opacity_only(),
                    self.keyframes(StateName::Visible),
                    now,
                    &spec,
                );
                self.pending = Some(timers.schedule(self.id, TimerKind::CompleteEntrance, spec.duration_ms));
                None
            }
            MotionState::Entering => None,
            state => {
                self.segment = ActiveTransition::settled(self.keyframes(state.target()), now);
                if state.is_shown() {
                    // pointer input recorded while reduced
                    return self.settle_interaction(now);
                }
                None
            }
        }
    }

    /// Show the content immediately, skipping the entrance.
    ///
    /// Used when visibility cannot be observed.
    pub fn reveal(&mut self, timers: &mut TimerQueue) -> Option<StateChange> {
        if !self.mounted {
            return None;
        }
        self.cancel_pending(timers);
        self.entered_once = true;
        self.segment = ActiveTransition::settled(self.keyframes(StateName::Visible), timers.now_ms());
        if self.state.is_shown() {
            return None;
        }
        self.transition_to(MotionState::Visible)
    }

    /// Tear down: cancel pending timers and stop reacting to input.
    pub fn unmount(&mut self, timers: &mut TimerQueue) {
        if !self.mounted {
            return;
        }
        self.cancel_pending(timers);
        timers.cancel_owner(self.id);
        self.mounted = false;
        tracing::debug!(orchestrator = %self.id, state = %self.state, "orchestrator unmounted");
    }

    fn enter(&mut self, timers: &mut TimerQueue) -> Option<StateChange> {
        let now = timers.now_ms();
        let spec = self.variant.transition_into(StateName::Visible).clone();
        let visible = self.keyframes(StateName::Visible);

        if self.segment.is_finished(now) {
            // at rest (hidden or exited): start from the hidden pose
            self.segment = ActiveTransition::new(self.keyframes(StateName::Hidden), visible, now, &spec);
        } else {
            self.segment.retarget(now, visible, &spec);
        }
        self.pending = Some(timers.schedule(self.id, TimerKind::CompleteEntrance, spec.duration_ms));
        self.transition_to(MotionState::Entering)
    }

    fn interaction_target(&self) -> MotionState {
        if !self.interactions_enabled() {
            return MotionState::Visible;
        }
        match (self.pointer.engaged(), self.pointer.pressed) {
            (true, true) => MotionState::Pressed,
            (true, false) => MotionState::Hovered,
            (false, _) => MotionState::Visible,
        }
    }

    fn settle_interaction(&mut self, now_ms: f64) -> Option<StateChange> {
        let target = self.interaction_target();
        if target == self.state {
            return None;
        }
        self.retarget_to(target, now_ms);
        self.transition_to(target)
    }

    fn retarget_to(&mut self, state: MotionState, now_ms: f64) {
        let target = state.target();
        let spec = self.variant.transition_into(target).clone();
        let frame = self.keyframes(target);
        self.segment.retarget(now_ms, frame, &spec);
    }

    fn cancel_pending(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
    }

    /// Keyframes for a state checked at construction (or `exit`, checked by the caller).
    fn keyframes(&self, state: StateName) -> KeyframeSet {
        self.variant.state(state).cloned().unwrap_or_default()
    }

    fn transition_to(&mut self, to: MotionState) -> Option<StateChange> {
        let from = self.state;
        if from == to {
            return None;
        }
        self.state = to;
        Some(self.changed(from))
    }

    fn changed(&self, from: MotionState) -> StateChange {
        tracing::debug!(
            orchestrator = %self.id,
            variant = %self.variant.name,
            %from,
            to = %self.state,
            "motion state changed"
        );
        StateChange {
            orchestrator: self.id,
            from,
            to: self.state,
        }
    }
}

//! Declarative entrance and interaction motion for UI components.
//!
//! Components pick a named preset (fade, scale, stagger, card, slide...) and
//! the runtime takes care of visibility detection, timing, stagger sequencing
//! and the reduced-motion fallback.
//!
//! # Architecture
//!
//! ```text
//! MotionRuntime
//!   ├── MotionPreferenceResolver (session reduced-motion flag, subscribe/notify)
//!   ├── VariantRegistry (enum-keyed keyframe catalogue)
//!   ├── TimerQueue (host-advanced clock, cancellable timers)
//!   └── components
//!         ├── VisibilityObserver (intersection ratio → entered/left)
//!         └── Orchestrator | StaggerCoordinator (Hidden → Entering → Visible ⇄ Hovered ⇄ Pressed)
//! ```

pub mod easing;
pub mod error;
pub mod events;
pub mod interpolate;
pub mod observer;
pub mod orchestrator;
pub mod preference;
pub mod presets;
pub mod registry;
pub mod runtime;
pub mod stagger;
pub mod timer;
pub mod transition;
pub mod types;
pub mod variant;
pub mod viewport;

pub use easing::EasingFunction;
pub use error::{MotionError, Result};
pub use events::{EventQueue, MotionEvent};
pub use interpolate::Interpolate;
pub use observer::{IntersectionHost, ObserverOptions, VisibilityEvent, VisibilityObserver};
pub use orchestrator::{Orchestrator, OrchestratorId, OrchestratorOptions, PointerInput, StateChange};
pub use preference::{
    MotionPreference, MotionPreferenceResolver, ReducedMotionQuery, StaticQuery, SubscriptionId,
};
pub use presets::{PresetKind, PresetSpec, Trigger};
pub use registry::{
    FadeDirection, SlideDirection, StaggerSpeed, StaggerSteps, VariantName, VariantRegistry,
};
pub use runtime::MotionRuntime;
pub use stagger::StaggerCoordinator;
pub use timer::{FiredTimer, TimerId, TimerKind, TimerQueue};
pub use transition::{ActiveTransition, TransitionSpec};
pub use types::{ComponentId, ElementId, KeyframeSet, MotionState, StateName, VisualProperty};
pub use variant::Variant;
pub use viewport::{ContainerId, Rect, SimulatedViewport};

pub use rune_config::{MotionSettings, ReducedMotionMode};

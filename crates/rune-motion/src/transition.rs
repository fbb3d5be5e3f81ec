//! Transition timing and the in-flight segment an orchestrator renders.
//!
//! A [`TransitionSpec`] is the static timing a variant declares. An
//! [`ActiveTransition`] is one running segment between two keyframe sets,
//! sampled against the runtime clock and retargeted mid-flight.
//!
//! # Example
//!
//! ```
//! use rune_motion::transition::TransitionSpec;
//! use rune_motion::easing::EasingFunction;
//!
//! let spec = TransitionSpec::new(300.0)
//!     .with_delay(100.0)
//!     .with_easing(EasingFunction::EaseOut);
//! assert_eq!(spec.total_ms(), 400.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::interpolate::Interpolate;
use crate::types::KeyframeSet;

/// How a variant moves into one of its states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub duration_ms: f32,
    /// Wait before the segment starts; part of the entrance delay.
    #[serde(default)]
    pub delay_ms: f32,
    #[serde(default)]
    pub easing: EasingFunction,
    /// Interval between child entrances, for container variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger_children_ms: Option<f32>,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            duration_ms: 300.0,
            delay_ms: 0.0,
            easing: EasingFunction::Ease,
            stagger_children_ms: None,
        }
    }
}

impl TransitionSpec {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            ..Self::default()
        }
    }

    /// A spring transition whose duration is the spring's settle time.
    pub fn spring(stiffness: f32, damping: f32) -> Self {
        let easing = EasingFunction::spring(stiffness, damping);
        Self {
            duration_ms: easing.settle_duration_ms().unwrap_or(300.0),
            easing,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_stagger_children(mut self, step_ms: f32) -> Self {
        self.stagger_children_ms = Some(step_ms.max(0.0));
        self
    }

    /// Delay plus duration.
    pub fn total_ms(&self) -> f32 {
        self.delay_ms + self.duration_ms
    }

    /// Near-instant linear cross-fade with the same delay.
    pub fn collapsed(&self, duration_ms: f32) -> Self {
        Self {
            duration_ms: duration_ms.min(self.duration_ms).max(0.0),
            delay_ms: self.delay_ms,
            easing: EasingFunction::Linear,
            stagger_children_ms: self.stagger_children_ms,
        }
    }
}

/// Interpolation between two keyframe sets that started at a fixed clock time.
///
/// Unlike a frame-stepped animation this holds no elapsed counter; callers
/// sample it against the runtime clock, so one timer firing is enough to
/// know when it ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTransition {
    /// Starting values.
    pub from: KeyframeSet,
    /// Target values.
    pub to: KeyframeSet,
    /// Clock time the transition began, in milliseconds.
    pub started_at_ms: f64,
    pub duration_ms: f32,
    pub easing: EasingFunction,
}

impl ActiveTransition {
    pub fn new(from: KeyframeSet, to: KeyframeSet, started_at_ms: f64, spec: &TransitionSpec) -> Self {
        Self {
            from,
            to,
            started_at_ms,
            duration_ms: spec.duration_ms,
            easing: spec.easing,
        }
    }

    /// A transition that is already at rest on `frame`.
    pub fn settled(frame: KeyframeSet, now_ms: f64) -> Self {
        Self {
            from: frame.clone(),
            to: frame,
            started_at_ms: now_ms,
            duration_ms: 0.0,
            easing: EasingFunction::Linear,
        }
    }

    /// Linear progress (0.0 to 1.0) at the given clock time.
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        let elapsed = (now_ms - self.started_at_ms).max(0.0) as f32;
        (elapsed / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Interpolated frame at the given clock time.
    pub fn current_value(&self, now_ms: f64) -> KeyframeSet {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return self.to.clone();
        }
        let eased = self.easing.evaluate(progress);
        self.from.interpolate(&self.to, eased)
    }

    /// Retarget to a new destination, continuing from the current frame.
    pub fn retarget(&mut self, now_ms: f64, to: KeyframeSet, spec: &TransitionSpec) {
        self.from = self.current_value(now_ms);
        self.to = to;
        self.started_at_ms = now_ms;
        self.duration_ms = spec.duration_ms;
        self.easing = spec.easing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VisualProperty;

    #[test]
    fn test_transition_spec_defaults() {
        let spec = TransitionSpec::default();
        assert_eq!(spec.duration_ms, 300.0);
        assert_eq!(spec.delay_ms, 0.0);
        assert_eq!(spec.easing, EasingFunction::Ease);
        assert_eq!(spec.stagger_children_ms, None);
    }

    #[test]
    fn test_transition_spec_builders() {
        let spec = TransitionSpec::new(500.0)
            .with_delay(100.0)
            .with_easing(EasingFunction::EaseOut)
            .with_stagger_children(50.0);

        assert_eq!(spec.duration_ms, 500.0);
        assert_eq!(spec.delay_ms, 100.0);
        assert_eq!(spec.easing, EasingFunction::EaseOut);
        assert_eq!(spec.stagger_children_ms, Some(50.0));
        assert_eq!(spec.total_ms(), 600.0);
    }

    #[test]
    fn test_negative_timing_is_clamped() {
        let spec = TransitionSpec::new(-5.0).with_delay(-1.0);
        assert_eq!(spec.duration_ms, 0.0);
        assert_eq!(spec.delay_ms, 0.0);
    }

    #[test]
    fn test_spring_spec_uses_settle_time() {
        let spec = TransitionSpec::spring(300.0, 20.0);
        assert!(spec.duration_ms > 600.0 && spec.duration_ms < 800.0);
        assert!(matches!(spec.easing, EasingFunction::Spring { .. }));
    }

    #[test]
    fn test_collapsed_keeps_delay() {
        let spec = TransitionSpec::spring(300.0, 20.0).with_delay(200.0);
        let collapsed = spec.collapsed(10.0);
        assert_eq!(collapsed.duration_ms, 10.0);
        assert_eq!(collapsed.delay_ms, 200.0);
        assert_eq!(collapsed.easing, EasingFunction::Linear);
    }

    #[test]
    fn test_active_transition_sampling() {
        let from = KeyframeSet::new().opacity(0.0);
        let to = KeyframeSet::new().opacity(1.0);
        let spec = TransitionSpec::new(100.0).with_easing(EasingFunction::Linear);
        let active = ActiveTransition::new(from.clone(), to.clone(), 1000.0, &spec);

        assert_eq!(active.current_value(900.0), from);
        let mid = active.current_value(1050.0);
        assert!((mid.resolve(VisualProperty::Opacity) - 0.5).abs() < 1e-4);
        assert_eq!(active.current_value(1100.0), to);
        assert!(!active.is_finished(1099.0));
        assert!(active.is_finished(1100.0));
    }

    #[test]
    fn test_retarget_continues_from_current_frame() {
        let spec = TransitionSpec::new(100.0).with_easing(EasingFunction::Linear);
        let mut active = ActiveTransition::new(
            KeyframeSet::new().scale(1.0),
            KeyframeSet::new().scale(2.0),
            0.0,
            &spec,
        );

        active.retarget(50.0, KeyframeSet::new().scale(1.0), &spec);
        assert!((active.from.resolve(VisualProperty::Scale) - 1.5).abs() < 1e-4);
        assert_eq!(active.started_at_ms, 50.0);
        assert_eq!(active.current_value(150.0), KeyframeSet::new().scale(1.0));
    }

    #[test]
    fn test_settled_is_finished_immediately() {
        let frame = KeyframeSet::new().opacity(0.0);
        let active = ActiveTransition::settled(frame.clone(), 10.0);
        assert!(active.is_finished(10.0));
        assert_eq!(active.current_value(0.0), frame);
    }
}

//! Visibility observation on top of the host's intersection primitive.
//!
//! The host reports intersection ratios (visible fraction of the element's
//! area); the observer turns them into binary `Entered` / `Left` crossings.
//! Nothing here reads scroll offsets.

use std::collections::VecDeque;

use crate::error::Result;
use crate::types::ElementId;

/// Default fraction of the element that must be visible to count as entered.
pub const DEFAULT_THRESHOLD: f32 = 0.15;

/// Host viewport-intersection primitive.
pub trait IntersectionHost {
    /// Start reporting intersection changes for `element`.
    ///
    /// Returns the element's current intersection ratio, or
    /// `MotionError::ObserverAttachFailure` if the element is unavailable.
    fn observe(&mut self, element: ElementId, threshold: f32) -> Result<f32>;

    /// Stop reporting for `element`.
    fn unobserve(&mut self, element: ElementId);
}

/// A threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityEvent {
    Entered,
    Left,
}

/// Observer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Visible fraction (0.0–1.0) needed to count as entered. Zero means any overlap.
    pub threshold: f32,
    /// Report only the first entrance.
    pub once: bool,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            once: true,
        }
    }
}

impl ObserverOptions {
    pub fn new(threshold: f32, once: bool) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            once,
        }
    }

    pub fn repeating(mut self) -> Self {
        self.once = false;
        self
    }

    /// Whether `ratio` counts as inside the threshold.
    pub fn is_inside(&self, ratio: f32) -> bool {
        if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        }
    }
}

/// Binary visibility tracker for one element.
///
/// Events are buffered until drained with [`events`](Self::events). With
/// `once = true` the sequence ends after the first `Entered`; it never
/// reports `Left`.
#[derive(Debug)]
pub struct VisibilityObserver {
    element: ElementId,
    options: ObserverOptions,
    inside: bool,
    exhausted: bool,
    attached: bool,
    events: VecDeque<VisibilityEvent>,
}

impl VisibilityObserver {
    /// Attach to `element` through the host.
    ///
    /// An element already inside the threshold yields an immediate
    /// synthetic `Entered`.
    pub fn observe(
        element: ElementId,
        options: ObserverOptions,
        host: &mut dyn IntersectionHost,
    ) -> Result<Self> {
        let ratio = host.observe(element, options.threshold)?;
        let mut observer = Self {
            element,
            options,
            inside: false,
            exhausted: false,
            attached: true,
            events: VecDeque::new(),
        };
        if observer.on_intersection(ratio).is_some() {
            tracing::debug!(%element, ratio, "element visible at observe time");
        }
        Ok(observer)
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// True once a `once` observer has reported its entrance.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Feed a new intersection ratio; returns the crossing, if any.
    pub fn on_intersection(&mut self, ratio: f32) -> Option<VisibilityEvent> {
        if !self.attached || self.exhausted {
            return None;
        }

        let inside = self.options.is_inside(ratio);
        if inside == self.inside {
            return None;
        }
        self.inside = inside;

        let event = if inside {
            if self.options.once {
                self.exhausted = true;
            }
            VisibilityEvent::Entered
        } else {
            VisibilityEvent::Left
        };
        self.events.push_back(event);
        Some(event)
    }

    /// Drain buffered events in order.
    pub fn events(&mut self) -> impl Iterator<Item = VisibilityEvent> + '_ {
        self.events.drain(..)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Deregister from the host. Idempotent.
    pub fn disconnect(&mut self, host: &mut dyn IntersectionHost) {
        if self.attached {
            host.unobserve(self.element);
            self.attached = false;
            self.events.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MotionError;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeHost {
        ratios: HashMap<ElementId, f32>,
        observed: Vec<ElementId>,
    }

    impl IntersectionHost for FakeHost {
        fn observe(&mut self, element: ElementId, _threshold: f32) -> Result<f32> {
            let ratio = *self
                .ratios
                .get(&element)
                .ok_or_else(|| MotionError::attach(element, "not mounted"))?;
            self.observed.push(element);
            Ok(ratio)
        }

        fn unobserve(&mut self, element: ElementId) {
            self.observed.retain(|e| *e != element);
        }
    }

    fn host_with(element: ElementId, ratio: f32) -> FakeHost {
        let mut host = FakeHost::default();
        host.ratios.insert(element, ratio);
        host
    }

    #[test]
    fn test_visible_at_creation_emits_synthetic_entered() {
        let element = ElementId(1);
        let mut host = host_with(element, 0.5);
        let mut observer =
            VisibilityObserver::observe(element, ObserverOptions::default(), &mut host).unwrap();

        assert_eq!(observer.events().collect::<Vec<_>>(), vec![VisibilityEvent::Entered]);
        assert!(observer.is_exhausted());
    }

    #[test]
    fn test_offscreen_at_creation_is_silent() {
        let element = ElementId(2);
        let mut host = host_with(element, 0.0);
        let mut observer =
            VisibilityObserver::observe(element, ObserverOptions::default(), &mut host).unwrap();

        assert!(!observer.has_pending_events());
        assert_eq!(observer.on_intersection(0.1), None);
        assert_eq!(observer.on_intersection(0.15), Some(VisibilityEvent::Entered));
    }

    #[test]
    fn test_once_never_reports_left() {
        let element = ElementId(3);
        let mut host = host_with(element, 0.0);
        let mut observer =
            VisibilityObserver::observe(element, ObserverOptions::default(), &mut host).unwrap();

        assert_eq!(observer.on_intersection(1.0), Some(VisibilityEvent::Entered));
        assert_eq!(observer.on_intersection(0.0), None);
        assert_eq!(observer.on_intersection(1.0), None);
        assert_eq!(observer.events().count(), 1);
    }

    #[test]
    fn test_repeating_observer_restarts() {
        let element = ElementId(4);
        let mut host = host_with(element, 0.0);
        let options = ObserverOptions::default().repeating();
        let mut observer = VisibilityObserver::observe(element, options, &mut host).unwrap();

        observer.on_intersection(0.6);
        observer.on_intersection(0.6);
        observer.on_intersection(0.05);
        observer.on_intersection(0.3);
        assert_eq!(
            observer.events().collect::<Vec<_>>(),
            vec![
                VisibilityEvent::Entered,
                VisibilityEvent::Left,
                VisibilityEvent::Entered
            ]
        );
    }

    #[test]
    fn test_zero_threshold_means_any_overlap() {
        let options = ObserverOptions::new(0.0, true);
        assert!(!options.is_inside(0.0));
        assert!(options.is_inside(0.001));
        assert_eq!(ObserverOptions::new(3.0, true).threshold, 1.0);
    }

    #[test]
    fn test_attach_failure_and_disconnect() {
        let mut host = FakeHost::default();
        let err = VisibilityObserver::observe(ElementId(9), ObserverOptions::default(), &mut host)
            .unwrap_err();
        assert!(matches!(err, MotionError::ObserverAttachFailure { .. }));
        assert!(!err.is_configuration());

        let element = ElementId(5);
        let mut host = host_with(element, 0.0);
        let mut observer =
            VisibilityObserver::observe(element, ObserverOptions::default().repeating(), &mut host)
                .unwrap();
        observer.disconnect(&mut host);
        assert!(host.observed.is_empty());
        assert!(!observer.is_attached());
        assert_eq!(observer.on_intersection(1.0), None);
    }
}

//! Reduced-motion preference resolution.
//!
//! The preference is session state with an explicit subscribe/notify
//! contract: it is resolved once, and only changes when the host reports an
//! environment change. Nothing polls it per frame.

use rune_config::ReducedMotionMode;

/// Whether the user or environment asked for reduced motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionPreference {
    pub reduced: bool,
}

impl MotionPreference {
    pub const FULL: MotionPreference = MotionPreference { reduced: false };
    pub const REDUCED: MotionPreference = MotionPreference { reduced: true };
}

/// Host capability answering "prefers reduced motion".
///
/// `None` means the capability cannot be queried.
pub trait ReducedMotionQuery {
    fn prefers_reduced_motion(&self) -> Option<bool>;
}

impl<F> ReducedMotionQuery for F
where
    F: Fn() -> Option<bool>,
{
    fn prefers_reduced_motion(&self) -> Option<bool> {
        self()
    }
}

/// Fixed answer, for hosts without a live signal and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticQuery(pub Option<bool>);

impl ReducedMotionQuery for StaticQuery {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.0
    }
}

/// Handle returned by [`MotionPreferenceResolver::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(MotionPreference)>;

/// Sole owner and mutator of the session's [`MotionPreference`].
pub struct MotionPreferenceResolver {
    query: Box<dyn ReducedMotionQuery>,
    mode: ReducedMotionMode,
    current: Option<MotionPreference>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for MotionPreferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionPreferenceResolver")
            .field("mode", &self.mode)
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MotionPreferenceResolver {
    pub fn new(query: Box<dyn ReducedMotionQuery>, mode: ReducedMotionMode) -> Self {
        Self {
            query,
            mode,
            current: None,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Resolver following the environment query.
    pub fn system(query: impl ReducedMotionQuery + 'static) -> Self {
        Self::new(Box::new(query), ReducedMotionMode::System)
    }

    /// Resolver pinned to a fixed answer.
    pub fn fixed(reduced: bool) -> Self {
        let mode = if reduced {
            ReducedMotionMode::Always
        } else {
            ReducedMotionMode::Never
        };
        Self::new(Box::new(StaticQuery(None)), mode)
    }

    /// Resolve the preference for this session.
    ///
    /// The environment is queried on the first call only; later calls return
    /// the cached value until [`environment_changed`](Self::environment_changed).
    pub fn resolve(&mut self) -> MotionPreference {
        if let Some(current) = self.current {
            return current;
        }
        let resolved = self.evaluate();
        tracing::debug!(reduced = resolved.reduced, "resolved motion preference");
        self.current = Some(resolved);
        resolved
    }

    /// Current preference, resolving it if needed.
    pub fn current(&mut self) -> MotionPreference {
        self.resolve()
    }

    /// Cached preference without resolving; full motion before the first
    /// `resolve`.
    pub fn peek(&self) -> MotionPreference {
        self.current.unwrap_or_default()
    }

    pub fn mode(&self) -> ReducedMotionMode {
        self.mode
    }

    /// Register a listener called synchronously on every change.
    pub fn subscribe(&mut self, listener: impl FnMut(MotionPreference) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Re-query the environment after the host reported a change.
    ///
    /// Returns the new preference if it differs from the cached one. Every
    /// listener has been notified by the time this returns.
    pub fn environment_changed(&mut self) -> Option<MotionPreference> {
        let previous = self.resolve();
        let next = self.evaluate();
        if next == previous {
            return None;
        }

        tracing::info!(reduced = next.reduced, "motion preference changed");
        self.current = Some(next);
        for (_, listener) in self.listeners.iter_mut() {
            listener(next);
        }
        Some(next)
    }

    fn evaluate(&self) -> MotionPreference {
        let reduced = match self.mode {
            ReducedMotionMode::Always => true,
            ReducedMotionMode::Never => false,
            ReducedMotionMode::System => match self.query.prefers_reduced_motion() {
                Some(reduced) => reduced,
                None => {
                    tracing::warn!("reduced-motion preference unavailable, assuming full motion");
                    false
                }
            },
        };
        MotionPreference { reduced }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_unqueryable_defaults_to_full_motion() {
        let mut resolver = MotionPreferenceResolver::system(StaticQuery(None));
        assert_eq!(resolver.resolve(), MotionPreference::FULL);
    }

    #[test]
    fn test_resolve_queries_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut resolver = MotionPreferenceResolver::system(move || {
            counter.set(counter.get() + 1);
            Some(true)
        });

        assert!(resolver.resolve().reduced);
        assert!(resolver.resolve().reduced);
        assert!(resolver.current().reduced);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_environment_change_notifies_listeners() {
        let signal = Rc::new(Cell::new(Some(false)));
        let source = signal.clone();
        let mut resolver = MotionPreferenceResolver::system(move || source.get());
        resolver.resolve();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = resolver.subscribe(move |pref| sink.borrow_mut().push(pref.reduced));

        // no change, no notification
        assert_eq!(resolver.environment_changed(), None);

        signal.set(Some(true));
        assert_eq!(resolver.environment_changed(), Some(MotionPreference::REDUCED));
        assert_eq!(*seen.borrow(), vec![true]);

        assert!(resolver.unsubscribe(id));
        signal.set(Some(false));
        assert_eq!(resolver.environment_changed(), Some(MotionPreference::FULL));
        assert_eq!(*seen.borrow(), vec![true]);
        assert!(!resolver.unsubscribe(id));
    }

    #[test]
    fn test_fixed_mode_ignores_environment() {
        let mut resolver = MotionPreferenceResolver::new(
            Box::new(StaticQuery(Some(false))),
            ReducedMotionMode::Always,
        );
        assert!(resolver.resolve().reduced);
        assert_eq!(resolver.environment_changed(), None);
        assert!(!MotionPreferenceResolver::fixed(false).resolve().reduced);
    }
}

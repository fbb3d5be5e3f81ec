//! Host-clocked timers with cancellation.
//!
//! The host advances the clock once per frame. Timers fire in due-time
//! order (insertion order breaks ties), and a cancelled timer never fires.
//!
//! ```
//! use rune_motion::orchestrator::OrchestratorId;
//! use rune_motion::timer::{TimerKind, TimerQueue};
//!
//! let owner = OrchestratorId::new();
//! let mut timers = TimerQueue::new();
//! timers.schedule(owner, TimerKind::BeginEntrance, 100.0);
//!
//! assert!(timers.pop_due(50.0).is_none());
//! let fired = timers.pop_due(150.0).unwrap();
//! assert_eq!(fired.kind, TimerKind::BeginEntrance);
//! assert_eq!(timers.now_ms(), 100.0);
//! ```

use crate::orchestrator::OrchestratorId;

/// Cancellation token for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// What a timer means to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Entrance delay elapsed: move Hidden → Entering.
    BeginEntrance,
    /// Transition duration elapsed: move Entering → Visible.
    CompleteEntrance,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub owner: OrchestratorId,
    pub kind: TimerKind,
    pub due_ms: f64,
}

#[derive(Debug, Clone)]
struct TimerEntry {
    id: TimerId,
    owner: OrchestratorId,
    kind: TimerKind,
    due_ms: f64,
}

/// Pending timers and the runtime clock.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: f64,
    next_id: u64,
    pending: Vec<TimerEntry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule a timer `delay_ms` from now.
    pub fn schedule(&mut self, owner: OrchestratorId, kind: TimerKind, delay_ms: f32) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due_ms = self.now_ms + f64::from(delay_ms.max(0.0));
        tracing::trace!(?owner, ?kind, due_ms, "timer scheduled");
        self.pending.push(TimerEntry {
            id,
            owner,
            kind,
            due_ms,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.id != id);
        self.pending.len() != before
    }

    /// Cancel every timer belonging to `owner`.
    pub fn cancel_owner(&mut self, owner: OrchestratorId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.owner != owner);
        before - self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|entry| entry.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, owner: OrchestratorId) -> usize {
        self.pending.iter().filter(|entry| entry.owner == owner).count()
    }

    /// Remove and return the earliest timer due at or before `until_ms`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<FiredTimer> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_ms <= until_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(index, _)| index)?;

        let entry = self.pending.remove(index);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(FiredTimer {
            id: entry.id,
            owner: entry.owner,
            kind: entry.kind,
            due_ms: entry.due_ms,
        })
    }

    /// Move the clock forward to `until_ms` without firing anything.
    pub fn settle(&mut self, until_ms: f64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

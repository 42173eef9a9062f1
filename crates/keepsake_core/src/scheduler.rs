//! # Timer Scheduler
//!
//! Deterministic timer queue on a logical millisecond clock.
//!
//! ## Design
//!
//! The engine has exactly two suspension primitives: one-shot timers and
//! fixed-rate repeating timers. Both live in one queue ordered by
//! `(due, seq)`, so timers due at the same instant fire in the order they
//! were (re)armed. Nothing fires unless the owner pulls it with
//! [`Scheduler::pop_due`], which is what makes simulated time exact.
//!
//! ```text
//!  schedule_once ──┐
//!                  ├──> [ BinaryHeap (due, seq, id) ] ──pop_due(until)──> Fired<T>
//!  schedule_rep ───┘            │                                      │
//!                               └──── repeating timers re-armed <──────┘
//! ```
//!
//! Cancellation is lazy: the heap keeps stale keys and skips any whose id or
//! sequence number no longer matches the timer table.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Logical time in milliseconds since session start.
pub type Millis = u64;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// How a timer re-arms after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once, then is gone.
    OneShot,
    /// Fires every `period` ms until cancelled.
    Repeating {
        /// Interval between firings.
        period: Millis,
    },
}

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    seq: u64,
    kind: TimerKind,
    task: T,
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    /// Timer that fired.
    pub id: TimerId,
    /// Logical time the timer was due.
    pub at: Millis,
    /// Payload the timer was armed with.
    pub task: T,
}

/// Timer queue driven by an explicit clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Millis,
    queue: BinaryHeap<Reverse<(Millis, u64, TimerId)>>,
    timers: HashMap<TimerId, TimerEntry<T>>,
    next_id: u64,
    next_seq: u64,
}

impl<T: Clone> Scheduler<T> {
    /// Creates an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: 0,
            queue: BinaryHeap::with_capacity(64),
            timers: HashMap::with_capacity(64),
            next_id: 0,
            next_seq: 0,
        }
    }

    /// Current logical time.
    #[inline]
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now
    }

    /// Number of timers still armed.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    /// Returns true if the timer is still armed.
    #[must_use]
    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Arms a timer that fires once, `delay` ms from now.
    pub fn schedule_once(&mut self, delay: Millis, task: T) -> TimerId {
        self.arm(delay, TimerKind::OneShot, task)
    }

    /// Arms a timer that fires every `period` ms, first at `now + period`.
    ///
    /// A zero period is treated as 1 ms so the queue always makes progress.
    pub fn schedule_repeating(&mut self, period: Millis, task: T) -> TimerId {
        let period = period.max(1);
        self.arm(period, TimerKind::Repeating { period }, task)
    }

    /// Cancels a timer. Returns true if it was still armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Cancels every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    /// Pops the earliest timer due at or before `until`.
    ///
    /// The clock moves forward to the timer's due time before returning, so
    /// anything the caller schedules while handling it is relative to the
    /// exact firing instant. Repeating timers are re-armed from their due
    /// time, not from the caller's clock, so they never drift.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<T>> {
        while let Some(&Reverse((due, seq, id))) = self.queue.peek() {
            if due > until {
                return None;
            }
            self.queue.pop();

            let Some(entry) = self.timers.get(&id) else {
                continue;
            };
            if entry.seq != seq {
                continue;
            }

            let task = entry.task.clone();
            let kind = entry.kind;
            self.now = self.now.max(due);

            match kind {
                TimerKind::OneShot => {
                    self.timers.remove(&id);
                }
                TimerKind::Repeating { period } => {
                    let next_due = due.saturating_add(period);
                    let next_seq = self.take_seq();
                    if let Some(entry) = self.timers.get_mut(&id) {
                        entry.seq = next_seq;
                    }
                    self.queue.push(Reverse((next_due, next_seq, id)));
                }
            }

            return Some(Fired { id, at: due, task });
        }
        None
    }

    /// Moves the clock to `until` without firing anything.
    ///
    /// Callers drain [`Self::pop_due`] first; the clock never moves backwards.
    pub fn advance_to(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }

    /// Due time of the next armed timer, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<Millis> {
        self.queue
            .iter()
            .filter(|Reverse((_, seq, id))| self.timers.get(id).is_some_and(|e| e.seq == *seq))
            .map(|Reverse((due, _, _))| *due)
            .min()
    }

    fn arm(&mut self, delay: Millis, kind: TimerKind, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.take_seq();
        let due = self.now.saturating_add(delay);

        self.timers.insert(id, TimerEntry { seq, kind, task });
        self.queue.push(Reverse((due, seq, id)));
        id
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Timers owned by one lifecycle.
///
/// Whoever starts a scene-scoped chain tracks its timer ids here and calls
/// [`TimerScope::cancel_all`] when the lifecycle ends, so no callback can
/// land in a scene that is no longer active.
#[derive(Debug, Default)]
pub struct TimerScope {
    ids: Vec<TimerId>,
}

impl TimerScope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a timer to the scope and returns it.
    pub fn track(&mut self, id: TimerId) -> TimerId {
        self.ids.push(id);
        id
    }

    /// Stops tracking a timer (after it was cancelled individually).
    pub fn forget(&mut self, id: TimerId) {
        self.ids.retain(|&tracked| tracked != id);
    }

    /// Number of tracked timers, fired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Cancels every tracked timer that is still armed.
    ///
    /// Returns how many were actually cancelled.
    pub fn cancel_all<T: Clone>(&mut self, scheduler: &mut Scheduler<T>) -> usize {
        self.ids
            .drain(..)
            .filter(|&id| scheduler.cancel(id))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once_at_due_time() {
        let mut sched = Scheduler::new();
        sched.schedule_once(100, "ping");

        assert!(sched.pop_due(99).is_none());
        let fired = sched.pop_due(100).expect("due at 100");
        assert_eq!(fired.at, 100);
        assert_eq!(fired.task, "ping");
        assert_eq!(sched.now(), 100);
        assert!(sched.pop_due(10_000).is_none());
        assert_eq!(sched.live_count(), 0);
    }

    #[test]
    fn test_repeating_does_not_drift() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(1500, 'h');

        let times: Vec<Millis> = std::iter::from_fn(|| sched.pop_due(6000))
            .map(|f| f.at)
            .collect();
        assert_eq!(times, vec![1500, 3000, 4500, 6000]);
        assert_eq!(sched.live_count(), 1);
    }

    #[test]
    fn test_ties_fire_in_arming_order() {
        let mut sched = Scheduler::new();
        sched.schedule_once(50, 1);
        sched.schedule_once(50, 2);
        sched.schedule_once(10, 0);

        let order: Vec<i32> = std::iter::from_fn(|| sched.pop_due(50))
            .map(|f| f.task)
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut sched = Scheduler::new();
        let a = sched.schedule_once(10, 'a');
        let b = sched.schedule_repeating(10, 'b');

        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));
        assert!(sched.cancel(b));
        assert!(sched.pop_due(1_000).is_none());
        assert_eq!(sched.next_due(), None);
    }

    #[test]
    fn test_scheduling_from_handler_is_relative_to_fire_time() {
        let mut sched = Scheduler::new();
        sched.schedule_once(25, 0u32);

        let mut seen = Vec::new();
        while let Some(fired) = sched.pop_due(100) {
            seen.push(fired.at);
            if fired.task < 3 {
                sched.schedule_once(25, fired.task + 1);
            }
        }
        assert_eq!(seen, vec![25, 50, 75, 100]);
    }

    #[test]
    fn test_scope_cancels_only_live_timers() {
        let mut sched = Scheduler::new();
        let mut scope = TimerScope::new();
        scope.track(sched.schedule_once(5, ()));
        scope.track(sched.schedule_once(50, ()));
        scope.track(sched.schedule_repeating(20, ()));

        assert!(sched.pop_due(5).is_some());
        assert_eq!(scope.cancel_all(&mut sched), 2);
        assert!(scope.is_empty());
        assert_eq!(sched.live_count(), 0);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut sched: Scheduler<()> = Scheduler::new();
        sched.advance_to(500);
        sched.advance_to(100);
        assert_eq!(sched.now(), 500);
    }
}

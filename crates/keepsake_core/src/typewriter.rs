//! # Typewriter Reveal
//!
//! Reveals the letter one character at a time, then shows the signature and
//! the navigation control on two staggered one-shot timers.
//!
//! ## Lifecycle
//!
//! ```text
//!  start ──> [repeating TypeNext every interval] ──(last char)──> cancel ticker
//!                                                                   │
//!                         ┌─────────────────────────────────────────┤
//!                         ▼                                         ▼
//!            RevealSignature (+signature_delay)       RevealNavControl (+nav_delay)
//! ```
//!
//! Every timer the engine arms is tracked in its [`TimerScope`]. Leaving the
//! letter scene calls [`TypewriterEngine::stop`], which cancels whatever is
//! still pending. Each task also carries the scene epoch it was armed in and
//! is ignored if the epoch moved on, so a callback that slips past
//! cancellation still cannot touch a newer scene.
//!
//! Characters are Unicode scalar values, so multi-byte glyphs are never split.

use std::sync::Arc;

use crate::config::TimingConfig;
use crate::scheduler::{Millis, Scheduler, TimerId, TimerScope};
use crate::task::{SceneEpoch, Task};

/// Result of one typing tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeStep {
    /// One more character is visible.
    Typed {
        /// Characters now visible.
        revealed: usize,
    },
    /// The last character became visible; follow-up reveals are armed.
    Completed {
        /// Characters now visible (the full text).
        revealed: usize,
    },
    /// The tick belonged to an older scene entry or a stopped chain.
    Stale,
}

/// Reveal state for one entry into the letter scene.
#[derive(Debug)]
pub struct TypewriterEngine {
    source: Arc<str>,
    total: usize,
    revealed: usize,
    signature_visible: bool,
    nav_control_visible: bool,
    epoch: SceneEpoch,
    signature_delay: Millis,
    nav_control_delay: Millis,
    ticker: Option<TimerId>,
    scope: TimerScope,
    completed_at: Option<Millis>,
}

impl TypewriterEngine {
    /// Starts a fresh reveal of `source` with nothing visible.
    pub fn start(
        source: Arc<str>,
        timing: &TimingConfig,
        epoch: SceneEpoch,
        scheduler: &mut Scheduler<Task>,
    ) -> Self {
        let total = source.chars().count();
        let mut engine = Self {
            source,
            total,
            revealed: 0,
            signature_visible: false,
            nav_control_visible: false,
            epoch,
            signature_delay: timing.signature_delay_ms,
            nav_control_delay: timing.nav_control_delay_ms,
            ticker: None,
            scope: TimerScope::new(),
            completed_at: None,
        };

        if total == 0 {
            engine.complete(scheduler);
        } else {
            let id = scheduler.schedule_repeating(timing.type_interval_ms, Task::TypeNext(epoch));
            engine.ticker = Some(engine.scope.track(id));
        }
        engine
    }

    /// Handles a `TypeNext` tick.
    pub fn on_tick(&mut self, epoch: SceneEpoch, scheduler: &mut Scheduler<Task>) -> TypeStep {
        if epoch != self.epoch || self.ticker.is_none() {
            return TypeStep::Stale;
        }

        self.revealed = (self.revealed + 1).min(self.total);
        tracing::trace!("Typewriter revealed {}/{}", self.revealed, self.total);

        if self.revealed == self.total {
            self.complete(scheduler);
            TypeStep::Completed { revealed: self.revealed }
        } else {
            TypeStep::Typed { revealed: self.revealed }
        }
    }

    /// Handles `RevealSignature`. Returns true if the signature just appeared.
    pub fn on_signature(&mut self, epoch: SceneEpoch) -> bool {
        if epoch != self.epoch || !self.is_complete() || self.signature_visible {
            return false;
        }
        self.signature_visible = true;
        true
    }

    /// Handles `RevealNavControl`. Returns true if the control just appeared.
    ///
    /// The control never appears before the signature.
    pub fn on_nav_control(&mut self, epoch: SceneEpoch) -> bool {
        if epoch != self.epoch || !self.signature_visible || self.nav_control_visible {
            return false;
        }
        self.nav_control_visible = true;
        true
    }

    /// Cancels every pending timer of this reveal. Returns how many.
    pub fn stop(&mut self, scheduler: &mut Scheduler<Task>) -> usize {
        self.ticker = None;
        self.scope.cancel_all(scheduler)
    }

    /// Characters visible so far.
    #[must_use]
    pub const fn revealed_len(&self) -> usize {
        self.revealed
    }

    /// Characters in the full text.
    #[must_use]
    pub const fn total_len(&self) -> usize {
        self.total
    }

    /// The visible prefix of the text.
    #[must_use]
    pub fn revealed_text(&self) -> &str {
        let end = self
            .source
            .char_indices()
            .nth(self.revealed)
            .map_or(self.source.len(), |(i, _)| i);
        &self.source[..end]
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &Arc<str> {
        &self.source
    }

    /// Returns true once every character is visible.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.revealed == self.total
    }

    /// Returns true once the signature is shown.
    #[must_use]
    pub const fn signature_visible(&self) -> bool {
        self.signature_visible
    }

    /// Returns true once the navigation control is shown.
    #[must_use]
    pub const fn nav_control_visible(&self) -> bool {
        self.nav_control_visible
    }

    /// Time the last character appeared.
    #[must_use]
    pub const fn completed_at(&self) -> Option<Millis> {
        self.completed_at
    }

    /// Scene entry this reveal belongs to.
    #[must_use]
    pub const fn epoch(&self) -> SceneEpoch {
        self.epoch
    }

    fn complete(&mut self, scheduler: &mut Scheduler<Task>) {
        if let Some(ticker) = self.ticker.take() {
            scheduler.cancel(ticker);
            self.scope.forget(ticker);
        }
        self.completed_at = Some(scheduler.now());

        self.scope
            .track(scheduler.schedule_once(self.signature_delay, Task::RevealSignature(self.epoch)));
        self.scope
            .track(scheduler.schedule_once(self.nav_control_delay, Task::RevealNavControl(self.epoch)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut TypewriterEngine, sched: &mut Scheduler<Task>, until: Millis) {
        while let Some(fired) = sched.pop_due(until) {
            match fired.task {
                Task::TypeNext(epoch) => {
                    engine.on_tick(epoch, sched);
                }
                Task::RevealSignature(epoch) => {
                    engine.on_signature(epoch);
                }
                Task::RevealNavControl(epoch) => {
                    engine.on_nav_control(epoch);
                }
                _ => {}
            }
        }
        sched.advance_to(until);
    }

    #[test]
    fn test_reveals_one_char_per_interval() {
        let mut sched = Scheduler::new();
        let mut engine =
            TypewriterEngine::start(Arc::from("hello"), &TimingConfig::default(), SceneEpoch(1), &mut sched);

        run(&mut engine, &mut sched, 24);
        assert_eq!(engine.revealed_len(), 0);
        run(&mut engine, &mut sched, 75);
        assert_eq!(engine.revealed_len(), 3);
        assert_eq!(engine.revealed_text(), "hel");
        run(&mut engine, &mut sched, 125);
        assert!(engine.is_complete());
        assert_eq!(engine.completed_at(), Some(125));
    }

    #[test]
    fn test_staggered_reveals_after_completion() {
        let mut sched = Scheduler::new();
        let mut engine =
            TypewriterEngine::start(Arc::from("ab"), &TimingConfig::default(), SceneEpoch(1), &mut sched);

        run(&mut engine, &mut sched, 50 + 499);
        assert!(engine.is_complete());
        assert!(!engine.signature_visible());
        run(&mut engine, &mut sched, 550);
        assert!(engine.signature_visible());
        assert!(!engine.nav_control_visible());
        run(&mut engine, &mut sched, 1249);
        assert!(!engine.nav_control_visible());
        run(&mut engine, &mut sched, 1250);
        assert!(engine.nav_control_visible());
        assert_eq!(sched.live_count(), 0);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let mut sched = Scheduler::new();
        let mut engine =
            TypewriterEngine::start(Arc::from("a💖b"), &TimingConfig::default(), SceneEpoch(1), &mut sched);
        assert_eq!(engine.total_len(), 3);

        run(&mut engine, &mut sched, 50);
        assert_eq!(engine.revealed_text(), "a💖");
    }

    #[test]
    fn test_empty_text_completes_immediately() {
        let mut sched = Scheduler::new();
        let mut engine =
            TypewriterEngine::start(Arc::from(""), &TimingConfig::default(), SceneEpoch(1), &mut sched);
        assert!(engine.is_complete());

        run(&mut engine, &mut sched, 1200);
        assert!(engine.signature_visible());
        assert!(engine.nav_control_visible());
    }

    #[test]
    fn test_stop_cancels_pending_chain() {
        let mut sched = Scheduler::new();
        let mut engine =
            TypewriterEngine::start(Arc::from("abcdef"), &TimingConfig::default(), SceneEpoch(1), &mut sched);

        run(&mut engine, &mut sched, 50);
        assert_eq!(engine.stop(&mut sched), 1);
        run(&mut engine, &mut sched, 10_000);
        assert_eq!(engine.revealed_len(), 2);
        assert!(!engine.signature_visible());
    }

    #[test]
    fn test_stale_epoch_is_ignored() {
        let mut sched = Scheduler::new();
        let mut engine =
            TypewriterEngine::start(Arc::from("abc"), &TimingConfig::default(), SceneEpoch(2), &mut sched);

        assert_eq!(engine.on_tick(SceneEpoch(1), &mut sched), TypeStep::Stale);
        assert_eq!(engine.revealed_len(), 0);
        assert!(!engine.on_signature(SceneEpoch(1)));
    }

    #[test]
    fn test_nav_control_never_precedes_signature() {
        let mut sched = Scheduler::new();
        let mut engine =
            TypewriterEngine::start(Arc::from(""), &TimingConfig::default(), SceneEpoch(1), &mut sched);

        assert!(!engine.on_nav_control(SceneEpoch(1)));
        assert!(engine.on_signature(SceneEpoch(1)));
        assert!(engine.on_nav_control(SceneEpoch(1)));
    }
}

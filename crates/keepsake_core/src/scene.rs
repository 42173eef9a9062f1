//! # Scene Flow State Machine
//!
//! Decides which scene is on screen and owns the scene-local state.
//!
//! ## States
//!
//! - **Initial**: welcome screen, waiting for the surprise action.
//! - **Letter**: typewriter reveal, then signature, then the navigation control.
//! - **Gallery**: memory cards.
//! - **Proposal**: affirmative control plus the evasive control.
//! - **Promise**: closing scene, de facto terminal.
//!
//! ## Transitions
//!
//! All transitions are user-triggered. Initial → Letter commits at once;
//! every other edge raises the transition flag, waits a fixed window, then
//! commits. While a transition is pending every further action is ignored,
//! so the pending target and the commit time can never change.
//!
//! Scene-specific state lives inside the [`Scene`] variant it belongs to, so
//! leaving a scene drops its state and re-entering starts clean.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::TimingConfig;
use crate::evasive::EvasiveOffset;
use crate::scheduler::{Millis, Scheduler, TimerId};
use crate::task::{SceneEpoch, Task};
use crate::typewriter::TypewriterEngine;

/// Label of a scene, without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    /// Welcome screen.
    Initial,
    /// Love letter.
    Letter,
    /// Memory gallery.
    Gallery,
    /// The question.
    Proposal,
    /// The closing promise.
    Promise,
}

impl SceneKind {
    /// Lowercase name for logs and renderers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Letter => "letter",
            Self::Gallery => "gallery",
            Self::Proposal => "proposal",
            Self::Promise => "promise",
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which scenes a story walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneFlow {
    /// Welcome, letter, gallery, proposal, promise.
    #[default]
    Full,
    /// Welcome, letter, gallery. The gallery is the last scene.
    Short,
}

impl SceneFlow {
    /// Scenes in story order.
    #[must_use]
    pub const fn scenes(self) -> &'static [SceneKind] {
        match self {
            Self::Full => &[
                SceneKind::Initial,
                SceneKind::Letter,
                SceneKind::Gallery,
                SceneKind::Proposal,
                SceneKind::Promise,
            ],
            Self::Short => &[SceneKind::Initial, SceneKind::Letter, SceneKind::Gallery],
        }
    }

    /// Returns true if the flow ever reaches `kind`.
    #[must_use]
    pub fn includes(self, kind: SceneKind) -> bool {
        self.scenes().contains(&kind)
    }
}

/// A user action that advances the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneAction {
    /// "Click here for your surprise" on the welcome scene.
    Surprise,
    /// "See our memories" under the letter.
    SeeMemories,
    /// "Next" at the end of the gallery.
    NextFromGallery,
    /// "Yes" on the proposal.
    AcceptProposal,
}

impl SceneAction {
    /// Every action, in story order.
    pub const ALL: [Self; 4] = [
        Self::Surprise,
        Self::SeeMemories,
        Self::NextFromGallery,
        Self::AcceptProposal,
    ];

    /// Scene the action is offered on.
    #[must_use]
    pub const fn from_scene(self) -> SceneKind {
        match self {
            Self::Surprise => SceneKind::Initial,
            Self::SeeMemories => SceneKind::Letter,
            Self::NextFromGallery => SceneKind::Gallery,
            Self::AcceptProposal => SceneKind::Proposal,
        }
    }

    /// Scene the action leads to.
    #[must_use]
    pub const fn to_scene(self) -> SceneKind {
        match self {
            Self::Surprise => SceneKind::Letter,
            Self::SeeMemories => SceneKind::Gallery,
            Self::NextFromGallery => SceneKind::Proposal,
            Self::AcceptProposal => SceneKind::Promise,
        }
    }

    /// Returns true if the action skips the fade window.
    #[must_use]
    pub const fn is_immediate(self) -> bool {
        matches!(self, Self::Surprise)
    }
}

/// The active scene and the state only it needs.
#[derive(Debug)]
pub enum Scene {
    /// Welcome screen.
    Initial {
        /// Pointer is over the title.
        title_hovered: bool,
    },
    /// Letter with its reveal in progress or done.
    Letter(TypewriterEngine),
    /// Memory gallery.
    Gallery,
    /// The question.
    Proposal {
        /// Current displacement of the evasive control.
        evasive: EvasiveOffset,
    },
    /// Closing promise.
    Promise,
}

impl Scene {
    /// Label of this scene.
    #[must_use]
    pub const fn kind(&self) -> SceneKind {
        match self {
            Self::Initial { .. } => SceneKind::Initial,
            Self::Letter(_) => SceneKind::Letter,
            Self::Gallery => SceneKind::Gallery,
            Self::Proposal { .. } => SceneKind::Proposal,
            Self::Promise => SceneKind::Promise,
        }
    }
}

/// A transition waiting for its commit timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    /// Scene that will be entered.
    pub target: SceneKind,
    /// When the flag was raised.
    pub started_at: Millis,
    /// When the new scene is committed.
    pub commits_at: Millis,
    epoch: SceneEpoch,
    timer: TimerId,
}

/// Why an action did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Another transition is in flight.
    Transitioning,
    /// The action is not offered on the active scene.
    WrongScene {
        /// Scene the action belongs to.
        expected: SceneKind,
        /// Scene actually on screen.
        actual: SceneKind,
    },
    /// The control exists but is not visible yet.
    NotReady,
    /// The configured flow ends before the target scene.
    OutsideFlow,
    /// The session has ended.
    SessionEnded,
}

/// What an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The target scene is active now.
    Entered(SceneKind),
    /// The fade window started.
    TransitionStarted {
        /// Scene that will be entered.
        target: SceneKind,
        /// When it will be entered.
        commits_at: Millis,
    },
    /// Nothing changed.
    Ignored(IgnoreReason),
}

/// The scene state machine.
#[derive(Debug)]
pub struct SceneFlowController {
    scene: Scene,
    epoch: SceneEpoch,
    flow: SceneFlow,
    pending: Option<PendingTransition>,
    timing: TimingConfig,
    letter: Arc<str>,
}

impl SceneFlowController {
    /// Creates a controller on the welcome scene.
    #[must_use]
    pub fn new(flow: SceneFlow, timing: TimingConfig, letter: Arc<str>) -> Self {
        Self {
            scene: Scene::Initial { title_hovered: false },
            epoch: SceneEpoch::default(),
            flow,
            pending: None,
            timing,
            letter,
        }
    }

    /// Active scene.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Active scene label.
    #[must_use]
    pub const fn kind(&self) -> SceneKind {
        self.scene.kind()
    }

    /// Entry generation of the active scene.
    #[must_use]
    pub const fn epoch(&self) -> SceneEpoch {
        self.epoch
    }

    /// Configured flow.
    #[must_use]
    pub const fn flow(&self) -> SceneFlow {
        self.flow
    }

    /// Transition in flight, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    /// Returns true while a transition is in flight.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.pending.is_some()
    }

    /// Letter reveal, if the letter is on screen.
    #[must_use]
    pub const fn letter(&self) -> Option<&TypewriterEngine> {
        match &self.scene {
            Scene::Letter(engine) => Some(engine),
            _ => None,
        }
    }

    /// Mutable letter reveal, if the letter is on screen.
    pub fn letter_mut(&mut self) -> Option<&mut TypewriterEngine> {
        match &mut self.scene {
            Scene::Letter(engine) => Some(engine),
            _ => None,
        }
    }

    /// Applies a user action.
    pub fn trigger(&mut self, action: SceneAction, scheduler: &mut Scheduler<Task>) -> ActionOutcome {
        if let Some(pending) = &self.pending {
            tracing::debug!("Ignoring {:?}: transition to {} in flight", action, pending.target);
            return ActionOutcome::Ignored(IgnoreReason::Transitioning);
        }

        let actual = self.kind();
        let expected = action.from_scene();
        if actual != expected {
            tracing::debug!("Ignoring {:?} on scene {}", action, actual);
            return ActionOutcome::Ignored(IgnoreReason::WrongScene { expected, actual });
        }

        let target = action.to_scene();
        if !self.flow.includes(target) {
            tracing::debug!("Ignoring {:?}: {:?} flow ends at {}", action, self.flow, actual);
            return ActionOutcome::Ignored(IgnoreReason::OutsideFlow);
        }

        if action == SceneAction::SeeMemories
            && !self.letter().is_some_and(TypewriterEngine::nav_control_visible)
        {
            tracing::debug!("Ignoring {:?}: navigation control not shown yet", action);
            return ActionOutcome::Ignored(IgnoreReason::NotReady);
        }

        if action.is_immediate() {
            self.enter(target, scheduler);
            return ActionOutcome::Entered(target);
        }

        let started_at = scheduler.now();
        let commits_at = started_at + self.timing.transition_ms;
        let timer = scheduler.schedule_once(self.timing.transition_ms, Task::CommitTransition(self.epoch));
        self.pending = Some(PendingTransition {
            target,
            started_at,
            commits_at,
            epoch: self.epoch,
            timer,
        });
        tracing::info!("Scene transition started: {} -> {} (commits at {}ms)", actual, target, commits_at);

        ActionOutcome::TransitionStarted { target, commits_at }
    }

    /// Handles `CommitTransition`. Returns the scene entered, if any.
    pub fn commit(&mut self, epoch: SceneEpoch, scheduler: &mut Scheduler<Task>) -> Option<SceneKind> {
        if self.pending.map_or(true, |p| p.epoch != epoch) {
            return None;
        }
        let pending = self.pending.take()?;
        self.enter(pending.target, scheduler);
        Some(pending.target)
    }

    /// Records the pointer entering or leaving the welcome title.
    ///
    /// Returns false when the welcome scene is not active.
    pub fn set_title_hovered(&mut self, hovered: bool) -> bool {
        match &mut self.scene {
            Scene::Initial { title_hovered } => {
                *title_hovered = hovered;
                true
            }
            _ => false,
        }
    }

    /// Replaces the evasive control offset.
    ///
    /// Returns false when the proposal scene is not active.
    pub fn set_evasive_offset(&mut self, offset: EvasiveOffset) -> bool {
        match &mut self.scene {
            Scene::Proposal { evasive } => {
                *evasive = offset;
                true
            }
            _ => false,
        }
    }

    /// Cancels the pending transition and every scene-owned timer.
    pub fn shutdown(&mut self, scheduler: &mut Scheduler<Task>) {
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending.timer);
        }
        if let Scene::Letter(engine) = &mut self.scene {
            engine.stop(scheduler);
        }
    }

    fn enter(&mut self, target: SceneKind, scheduler: &mut Scheduler<Task>) {
        let from = self.kind();
        if let Scene::Letter(engine) = &mut self.scene {
            let cancelled = engine.stop(scheduler);
            if cancelled > 0 {
                tracing::debug!("Cancelled {} pending letter timers", cancelled);
            }
        }

        self.epoch = self.epoch.next();
        self.scene = match target {
            SceneKind::Initial => Scene::Initial { title_hovered: false },
            SceneKind::Letter => Scene::Letter(TypewriterEngine::start(
                Arc::clone(&self.letter),
                &self.timing,
                self.epoch,
                scheduler,
            )),
            SceneKind::Gallery => Scene::Gallery,
            SceneKind::Proposal => Scene::Proposal {
                evasive: EvasiveOffset::ZERO,
            },
            SceneKind::Promise => Scene::Promise,
        };

        tracing::info!("Scene transition: {} -> {} at {}ms", from, target, scheduler.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(flow: SceneFlow, letter: &str) -> SceneFlowController {
        SceneFlowController::new(flow, TimingConfig::default(), Arc::from(letter))
    }

    /// Fires every due timer, routing letter and commit tasks.
    fn run(ctl: &mut SceneFlowController, sched: &mut Scheduler<Task>, until: Millis) {
        while let Some(fired) = sched.pop_due(until) {
            match fired.task {
                Task::TypeNext(epoch) => {
                    if let Some(letter) = ctl.letter_mut() {
                        letter.on_tick(epoch, sched);
                    }
                }
                Task::RevealSignature(epoch) => {
                    if let Some(letter) = ctl.letter_mut() {
                        letter.on_signature(epoch);
                    }
                }
                Task::RevealNavControl(epoch) => {
                    if let Some(letter) = ctl.letter_mut() {
                        letter.on_nav_control(epoch);
                    }
                }
                Task::CommitTransition(epoch) => {
                    ctl.commit(epoch, sched);
                }
                _ => {}
            }
        }
        sched.advance_to(until);
    }

    #[test]
    fn test_surprise_enters_letter_immediately() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Full, "hi");

        let outcome = ctl.trigger(SceneAction::Surprise, &mut sched);
        assert_eq!(outcome, ActionOutcome::Entered(SceneKind::Letter));
        assert!(!ctl.is_transitioning());
        assert_eq!(ctl.letter().unwrap().revealed_len(), 0);
    }

    #[test]
    fn test_see_memories_waits_for_nav_control() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Full, "hi");
        ctl.trigger(SceneAction::Surprise, &mut sched);

        run(&mut ctl, &mut sched, 50 + 1199);
        assert_eq!(
            ctl.trigger(SceneAction::SeeMemories, &mut sched),
            ActionOutcome::Ignored(IgnoreReason::NotReady)
        );

        run(&mut ctl, &mut sched, 50 + 1200);
        assert_eq!(
            ctl.trigger(SceneAction::SeeMemories, &mut sched),
            ActionOutcome::TransitionStarted {
                target: SceneKind::Gallery,
                commits_at: 1250 + 600
            }
        );
    }

    #[test]
    fn test_second_trigger_during_transition_is_noop() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Full, "");
        ctl.trigger(SceneAction::Surprise, &mut sched);
        run(&mut ctl, &mut sched, 1200);
        ctl.trigger(SceneAction::SeeMemories, &mut sched);
        let pending = *ctl.pending().unwrap();

        run(&mut ctl, &mut sched, 1500);
        for action in SceneAction::ALL {
            assert_eq!(
                ctl.trigger(action, &mut sched),
                ActionOutcome::Ignored(IgnoreReason::Transitioning)
            );
        }
        assert_eq!(ctl.pending(), Some(&pending));

        run(&mut ctl, &mut sched, 1799);
        assert_eq!(ctl.kind(), SceneKind::Letter);
        run(&mut ctl, &mut sched, 1800);
        assert_eq!(ctl.kind(), SceneKind::Gallery);
        assert!(!ctl.is_transitioning());
    }

    #[test]
    fn test_actions_on_wrong_scene_are_ignored() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Full, "");

        assert_eq!(
            ctl.trigger(SceneAction::AcceptProposal, &mut sched),
            ActionOutcome::Ignored(IgnoreReason::WrongScene {
                expected: SceneKind::Proposal,
                actual: SceneKind::Initial,
            })
        );
        assert_eq!(ctl.kind(), SceneKind::Initial);
    }

    #[test]
    fn test_short_flow_stops_at_gallery() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Short, "");
        ctl.trigger(SceneAction::Surprise, &mut sched);
        run(&mut ctl, &mut sched, 1200);
        ctl.trigger(SceneAction::SeeMemories, &mut sched);
        run(&mut ctl, &mut sched, 1800);
        assert_eq!(ctl.kind(), SceneKind::Gallery);

        assert_eq!(
            ctl.trigger(SceneAction::NextFromGallery, &mut sched),
            ActionOutcome::Ignored(IgnoreReason::OutsideFlow)
        );
    }

    #[test]
    fn test_full_walk_reaches_promise() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Full, "x");
        ctl.trigger(SceneAction::Surprise, &mut sched);
        run(&mut ctl, &mut sched, 25 + 1200);
        ctl.trigger(SceneAction::SeeMemories, &mut sched);
        run(&mut ctl, &mut sched, 2000);
        ctl.trigger(SceneAction::NextFromGallery, &mut sched);
        run(&mut ctl, &mut sched, 2600);
        assert_eq!(ctl.kind(), SceneKind::Proposal);
        assert!(ctl.set_evasive_offset(EvasiveOffset { x: 5.0, y: -5.0 }));
        ctl.trigger(SceneAction::AcceptProposal, &mut sched);
        run(&mut ctl, &mut sched, 3200);
        assert_eq!(ctl.kind(), SceneKind::Promise);
        assert!(!ctl.set_evasive_offset(EvasiveOffset::ZERO));
    }

    #[test]
    fn test_leaving_letter_cancels_its_timers() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Full, "");
        ctl.trigger(SceneAction::Surprise, &mut sched);
        run(&mut ctl, &mut sched, 1200);
        ctl.trigger(SceneAction::SeeMemories, &mut sched);
        run(&mut ctl, &mut sched, 1800);

        assert_eq!(sched.live_count(), 0);
    }

    #[test]
    fn test_title_hover_only_on_welcome() {
        let mut sched = Scheduler::new();
        let mut ctl = controller(SceneFlow::Full, "abc");
        assert!(ctl.set_title_hovered(true));
        assert!(matches!(ctl.scene(), Scene::Initial { title_hovered: true }));

        ctl.trigger(SceneAction::Surprise, &mut sched);
        assert!(!ctl.set_title_hovered(false));
    }
}

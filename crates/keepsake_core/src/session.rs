//! # Session
//!
//! One run of the story: owns the clock, the RNG, every component and every
//! timer. All mutation happens on the caller's thread through `&mut self`;
//! nothing runs in the background.
//!
//! ## Timer ownership
//!
//! | Timer                   | Owner            | Cancelled by              |
//! |-------------------------|------------------|---------------------------|
//! | heart spawner / reaper  | session lifetime | [`Session::end`]          |
//! | typewriter chain        | letter scene     | leaving the letter        |
//! | signature / nav reveal  | letter scene     | leaving the letter        |
//! | transition commit       | scene controller | firing, or session end    |
//! | burst removal           | the burst itself | firing, or session end    |

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::content::StoryContent;
use crate::error::{KeepsakeError, KeepsakeResult};
use crate::evasive::{EvasiveControl, EvasiveOffset, ViewportSource};
use crate::event::{EventOutcome, UiEvent};
use crate::explosion::{ExplosionId, ExplosionManager};
use crate::hearts::{FloatingHeartPool, HeartId};
use crate::particles::ParticleField;
use crate::scene::{ActionOutcome, IgnoreReason, Scene, SceneAction, SceneFlowController, SceneKind};
use crate::scheduler::{Millis, Scheduler, TimerScope};
use crate::snapshot::{LetterView, SessionSnapshot, TransitionView};
use crate::task::Task;
use crate::typewriter::TypeStep;

/// A running story.
pub struct Session {
    scheduler: Scheduler<Task>,
    rng: ChaCha8Rng,
    seed: u64,
    config: EngineConfig,
    particles: ParticleField,
    hearts: FloatingHeartPool,
    scenes: SceneFlowController,
    explosions: ExplosionManager,
    evasive: EvasiveControl,
    viewport: Box<dyn ViewportSource>,
    lifetime: TimerScope,
    ended: bool,
}

impl Session {
    /// Builds a session at time zero on the welcome scene.
    ///
    /// Samples both particle pools and starts the heart spawner and reaper.
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::InvalidConfig`] if `config` does not validate,
    /// or [`KeepsakeError::Entropy`] if no seed is configured and the OS
    /// cannot supply one.
    pub fn new(
        config: EngineConfig,
        content: &StoryContent,
        viewport: impl ViewportSource + 'static,
    ) -> KeepsakeResult<Self> {
        config.validate()?;

        let seed = match config.seed {
            Some(seed) => seed,
            None => getrandom::u64().map_err(|e| KeepsakeError::Entropy(e.to_string()))?,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let particles = ParticleField::generate(&config.particles, &mut rng);

        let mut scheduler = Scheduler::new();
        let mut lifetime = TimerScope::new();
        lifetime.track(scheduler.schedule_repeating(config.hearts.spawn_interval_ms, Task::SpawnHeart));
        lifetime.track(scheduler.schedule_repeating(config.hearts.reap_interval_ms, Task::ReapHearts));

        tracing::info!(
            "Session started: seed={}, flow={:?}, letter={} chars",
            seed,
            config.flow,
            content.letter.body.chars().count()
        );

        Ok(Self {
            scheduler,
            rng,
            seed,
            hearts: FloatingHeartPool::new(config.hearts),
            scenes: SceneFlowController::new(config.flow, config.timing, content.letter_source()),
            explosions: ExplosionManager::new(config.timing.explosion_lifetime_ms),
            evasive: EvasiveControl::new(config.evasive.span_fraction),
            particles,
            viewport: Box::new(viewport),
            lifetime,
            ended: false,
            config,
        })
    }

    /// Current logical time.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.scheduler.now()
    }

    /// Seed the session RNG was built from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active scene.
    #[must_use]
    pub const fn scene(&self) -> SceneKind {
        self.scenes.kind()
    }

    /// Returns true while a scene transition is in flight.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.scenes.is_transitioning()
    }

    /// Scene state machine.
    #[must_use]
    pub const fn scenes(&self) -> &SceneFlowController {
        &self.scenes
    }

    /// Ambient particle pools.
    #[must_use]
    pub const fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// Floating hearts.
    #[must_use]
    pub const fn hearts(&self) -> &FloatingHeartPool {
        &self.hearts
    }

    /// Click bursts.
    #[must_use]
    pub const fn explosions(&self) -> &ExplosionManager {
        &self.explosions
    }

    /// Timers still armed.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.live_count()
    }

    /// Returns true once [`Self::end`] ran.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Moves time forward by `dt` ms. Returns how many timers fired.
    pub fn advance(&mut self, dt: Millis) -> usize {
        self.advance_to(self.now().saturating_add(dt))
    }

    /// Moves time forward to `target`, firing every timer due on the way in
    /// order. Returns how many timers fired.
    pub fn advance_to(&mut self, target: Millis) -> usize {
        if self.ended {
            return 0;
        }
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(target) {
            self.dispatch(timer.task);
            fired += 1;
        }
        self.scheduler.advance_to(target);
        fired
    }

    /// Applies a scene action.
    pub fn trigger(&mut self, action: SceneAction) -> ActionOutcome {
        if self.ended {
            return ActionOutcome::Ignored(IgnoreReason::SessionEnded);
        }
        self.scenes.trigger(action, &mut self.scheduler)
    }

    /// Spawns a burst for a click on a live heart.
    ///
    /// Clicks on hearts that were already evicted or reaped do nothing.
    pub fn click_heart(&mut self, heart: HeartId, x: f32, y: f32) -> Option<ExplosionId> {
        if self.ended || !self.hearts.contains(heart) {
            return None;
        }
        Some(self.explosions.spawn(x, y, &mut self.scheduler))
    }

    /// Moves the evasive control. Only does something on the proposal.
    pub fn evasive_pointer_enter(&mut self) -> Option<EvasiveOffset> {
        if self.ended || self.scenes.kind() != SceneKind::Proposal {
            return None;
        }
        let viewport = self.viewport.viewport();
        let offset = self.evasive.on_pointer_enter(viewport, &mut self.rng);
        self.scenes.set_evasive_offset(offset);
        tracing::debug!("Evasive control moved to ({:.1}, {:.1})", offset.x, offset.y);
        Some(offset)
    }

    /// Records the pointer entering or leaving the welcome title.
    pub fn title_hover(&mut self, hovered: bool) -> bool {
        !self.ended && self.scenes.set_title_hovered(hovered)
    }

    /// Routes one UI event.
    pub fn handle(&mut self, event: UiEvent) -> EventOutcome {
        match event {
            UiEvent::Action(action) => match self.trigger(action) {
                ActionOutcome::Ignored(IgnoreReason::SessionEnded) => EventOutcome::Ignored,
                outcome => EventOutcome::Scene(outcome),
            },
            UiEvent::HeartClicked { heart, x, y } => self
                .click_heart(heart, x, y)
                .map_or(EventOutcome::Ignored, EventOutcome::Exploded),
            UiEvent::EvasivePointerEnter => self
                .evasive_pointer_enter()
                .map_or(EventOutcome::Ignored, EventOutcome::Evaded),
            UiEvent::TitleHover(hovered) => {
                if self.title_hover(hovered) {
                    EventOutcome::TitleChanged(hovered)
                } else {
                    EventOutcome::Ignored
                }
            }
        }
    }

    /// Read-only view for the renderer.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.now();
        let scene = self.scenes.kind();

        let (title_hovered, evasive_offset) = match self.scenes.scene() {
            Scene::Initial { title_hovered } => (*title_hovered, EvasiveOffset::ZERO),
            Scene::Proposal { evasive } => (false, *evasive),
            _ => (false, EvasiveOffset::ZERO),
        };

        let letter = self.scenes.letter().map(|engine| LetterView {
            revealed_len: engine.revealed_len(),
            total_len: engine.total_len(),
            text: engine.revealed_text().to_owned(),
            signature_visible: engine.signature_visible(),
            nav_control_visible: engine.nav_control_visible(),
        });

        let transition = self.scenes.pending().map(|pending| TransitionView {
            target: pending.target,
            elapsed_ms: now.saturating_sub(pending.started_at),
            duration_ms: pending.commits_at - pending.started_at,
        });

        SessionSnapshot {
            now,
            scene,
            flow: self.scenes.flow(),
            is_transitioning: transition.is_some(),
            transition,
            bokeh: self.particles.bokeh().clone(),
            sparkles: self.particles.sparkles().clone(),
            hearts: self.hearts.iter().copied().collect(),
            explosions: self.explosions.live().to_vec(),
            evasive_offset,
            letter,
            title_hovered,
            ambient_softened: scene != SceneKind::Initial,
            ended: self.ended,
        }
    }

    /// Ends the session: cancels every timer and freezes all state.
    ///
    /// Idempotent. Also runs on drop.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.scenes.shutdown(&mut self.scheduler);
        let cancelled = self.lifetime.cancel_all(&mut self.scheduler);
        let stray = self.scheduler.live_count();
        self.scheduler.clear();
        self.ended = true;
        tracing::info!(
            "Session ended at {}ms on scene {} ({} periodic, {} one-shot timers cancelled)",
            self.now(),
            self.scenes.kind(),
            cancelled,
            stray
        );
    }

    fn dispatch(&mut self, task: Task) {
        let now = self.scheduler.now();
        match task {
            Task::SpawnHeart => {
                let (id, evicted) = self.hearts.spawn(now, &mut self.rng);
                tracing::debug!("Heart {} spawned ({} live, {} evicted)", id.0, self.hearts.len(), evicted);
            }
            Task::ReapHearts => {
                let reaped = self.hearts.reap(now);
                if reaped > 0 {
                    tracing::debug!("Reaped {} hearts ({} live)", reaped, self.hearts.len());
                }
            }
            Task::TypeNext(epoch) => {
                if let Some(letter) = self.scenes.letter_mut() {
                    if let TypeStep::Completed { revealed } = letter.on_tick(epoch, &mut self.scheduler) {
                        tracing::debug!("Letter fully revealed ({} chars) at {}ms", revealed, now);
                    }
                }
            }
            Task::RevealSignature(epoch) => {
                if let Some(letter) = self.scenes.letter_mut() {
                    if letter.on_signature(epoch) {
                        tracing::debug!("Signature shown at {}ms", now);
                    }
                }
            }
            Task::RevealNavControl(epoch) => {
                if let Some(letter) = self.scenes.letter_mut() {
                    if letter.on_nav_control(epoch) {
                        tracing::debug!("Navigation control shown at {}ms", now);
                    }
                }
            }
            Task::CommitTransition(epoch) => {
                self.scenes.commit(epoch, &mut self.scheduler);
            }
            Task::ExpireExplosion(id) => {
                self.explosions.expire(id);
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end();
    }
}

//! Read-only view of a session for the rendering side.

use std::sync::Arc;

use crate::evasive::EvasiveOffset;
use crate::explosion::Explosion;
use crate::hearts::HeartToken;
use crate::particles::AmbientParticle;
use crate::scene::{SceneFlow, SceneKind};
use crate::scheduler::Millis;

/// Letter reveal progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterView {
    /// Characters visible.
    pub revealed_len: usize,
    /// Characters in the full text.
    pub total_len: usize,
    /// The visible prefix.
    pub text: String,
    /// Signature shown.
    pub signature_visible: bool,
    /// Navigation control shown (and clickable).
    pub nav_control_visible: bool,
}

/// Transition in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionView {
    /// Scene being faded to.
    pub target: SceneKind,
    /// Time since the flag was raised.
    pub elapsed_ms: Millis,
    /// Full length of the window.
    pub duration_ms: Millis,
}

impl TransitionView {
    /// Progress through the window, `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f32 / self.duration_ms as f32).clamp(0.0, 1.0)
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Logical time of the snapshot.
    pub now: Millis,
    /// Active scene.
    pub scene: SceneKind,
    /// Scene list in effect.
    pub flow: SceneFlow,
    /// A transition is in flight.
    pub is_transitioning: bool,
    /// Details of the transition in flight.
    pub transition: Option<TransitionView>,
    /// Bokeh pool (same allocation for the whole session).
    pub bokeh: Arc<[AmbientParticle]>,
    /// Sparkle pool (same allocation for the whole session).
    pub sparkles: Arc<[AmbientParticle]>,
    /// Live floating hearts, oldest first.
    pub hearts: Vec<HeartToken>,
    /// Live click bursts, oldest first.
    pub explosions: Vec<Explosion>,
    /// Evasive control offset (zero outside the proposal).
    pub evasive_offset: EvasiveOffset,
    /// Letter progress while the letter is on screen.
    pub letter: Option<LetterView>,
    /// Pointer rests on the welcome title.
    pub title_hovered: bool,
    /// Ambient decoration is dimmed (every scene but the welcome).
    pub ambient_softened: bool,
    /// The session has ended.
    pub ended: bool,
}

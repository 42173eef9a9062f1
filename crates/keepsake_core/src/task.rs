//! Timer payloads dispatched by the session.

use crate::explosion::ExplosionId;

/// Generation counter bumped on every scene entry.
///
/// Scene-scoped timers carry the epoch they were armed in; a task whose epoch
/// no longer matches the active scene is stale and does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SceneEpoch(pub u32);

impl SceneEpoch {
    /// The epoch after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Work a timer performs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Session-wide: append a floating heart.
    SpawnHeart,
    /// Session-wide: drop aged hearts.
    ReapHearts,
    /// Letter scene: reveal one more character.
    TypeNext(SceneEpoch),
    /// Letter scene: show the signature.
    RevealSignature(SceneEpoch),
    /// Letter scene: show the navigation control.
    RevealNavControl(SceneEpoch),
    /// Commit the pending scene transition.
    CommitTransition(SceneEpoch),
    /// Remove one click burst.
    ExpireExplosion(ExplosionId),
}

//! # Click Bursts
//!
//! Clicking a floating heart spawns a short-lived burst at the pointer. Each
//! burst arms its own one-shot removal keyed by id, so bursts overlap freely
//! and removing one never disturbs another.

use crate::scheduler::{Millis, Scheduler};
use crate::task::Task;

/// Unique burst id. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExplosionId(pub u64);

/// A burst anchored at a viewport coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    /// Burst id.
    pub id: ExplosionId,
    /// Pointer x in viewport pixels.
    pub x: f32,
    /// Pointer y in viewport pixels.
    pub y: f32,
    /// Creation time.
    pub born_at: Millis,
    /// When the removal timer fires.
    pub expires_at: Millis,
}

impl Explosion {
    /// Mini-hearts flung out by one burst.
    pub const SHARDS: usize = 8;

    /// Progress through the burst's life at `now`, `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, now: Millis) -> f32 {
        let span = self.expires_at.saturating_sub(self.born_at);
        if span == 0 {
            return 1.0;
        }
        (now.saturating_sub(self.born_at) as f32 / span as f32).clamp(0.0, 1.0)
    }
}

/// Live bursts and their removal timers.
#[derive(Debug)]
pub struct ExplosionManager {
    live: Vec<Explosion>,
    next_id: u64,
    lifetime: Millis,
}

impl ExplosionManager {
    /// Creates a manager whose bursts live `lifetime` ms.
    #[must_use]
    pub fn new(lifetime: Millis) -> Self {
        Self {
            live: Vec::with_capacity(8),
            next_id: 1,
            lifetime,
        }
    }

    /// Spawns a burst at `(x, y)` and arms its removal.
    pub fn spawn(&mut self, x: f32, y: f32, scheduler: &mut Scheduler<Task>) -> ExplosionId {
        let id = ExplosionId(self.next_id);
        self.next_id += 1;

        let born_at = scheduler.now();
        self.live.push(Explosion {
            id,
            x,
            y,
            born_at,
            expires_at: born_at + self.lifetime,
        });
        scheduler.schedule_once(self.lifetime, Task::ExpireExplosion(id));
        tracing::debug!("Explosion {} at ({:.0}, {:.0})", id.0, x, y);
        id
    }

    /// Removes one burst by id. Returns true if it was live.
    pub fn expire(&mut self, id: ExplosionId) -> bool {
        let before = self.live.len();
        self.live.retain(|e| e.id != id);
        before != self.live.len()
    }

    /// Live bursts, oldest first.
    #[must_use]
    pub fn live(&self) -> &[Explosion] {
        &self.live
    }

    /// Number of live bursts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true if no burst is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drops every burst (session teardown).
    pub fn clear(&mut self) {
        self.live.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expire_due(manager: &mut ExplosionManager, sched: &mut Scheduler<Task>, until: Millis) {
        while let Some(fired) = sched.pop_due(until) {
            if let Task::ExpireExplosion(id) = fired.task {
                manager.expire(id);
            }
        }
        sched.advance_to(until);
    }

    #[test]
    fn test_overlapping_bursts_expire_independently() {
        let mut sched = Scheduler::new();
        let mut bursts = ExplosionManager::new(1000);

        let a = bursts.spawn(10.0, 10.0, &mut sched);
        expire_due(&mut bursts, &mut sched, 300);
        let b = bursts.spawn(20.0, 20.0, &mut sched);
        assert_ne!(a, b);
        assert_eq!(bursts.len(), 2);

        expire_due(&mut bursts, &mut sched, 999);
        assert_eq!(bursts.len(), 2);
        expire_due(&mut bursts, &mut sched, 1000);
        assert_eq!(bursts.live().iter().map(|e| e.id).collect::<Vec<_>>(), vec![b]);
        expire_due(&mut bursts, &mut sched, 1300);
        assert!(bursts.is_empty());
    }

    #[test]
    fn test_expire_unknown_id_is_noop() {
        let mut sched = Scheduler::new();
        let mut bursts = ExplosionManager::new(1000);
        bursts.spawn(0.0, 0.0, &mut sched);

        assert!(!bursts.expire(ExplosionId(999)));
        assert_eq!(bursts.len(), 1);
    }
}

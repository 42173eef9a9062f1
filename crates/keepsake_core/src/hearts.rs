//! # Floating Heart Pool
//!
//! Bounded, self-pruning window of timestamped heart tokens.
//!
//! Two periodic tasks share the pool:
//! - **Spawner**: appends a token at the tail, then truncates the head so the
//!   pool never holds more than `capacity` tokens (sliding window).
//! - **Reaper**: drops every token whose age reached `max_age`, wherever it
//!   sits in the window.
//!
//! Tokens are kept in insertion order, which is also age order, so the head
//! is always the oldest token.

use std::collections::VecDeque;

use rand::Rng;

use crate::config::HeartConfig;
use crate::scheduler::Millis;

/// Identity of a heart token: its creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeartId(pub Millis);

/// One transient floating heart.
///
/// The lane and rise duration are drawn once at spawn so the heart does not
/// jump sideways between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartToken {
    /// Creation timestamp (identity and age reference).
    pub born_at: Millis,
    /// Horizontal lane, percent of viewport width.
    pub lane_vw: f32,
    /// Rise animation duration in ms.
    pub rise_ms: f32,
}

impl HeartToken {
    /// Token identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> HeartId {
        HeartId(self.born_at)
    }

    /// Age at `now`.
    #[inline]
    #[must_use]
    pub const fn age(&self, now: Millis) -> Millis {
        now.saturating_sub(self.born_at)
    }
}

/// The live heart window.
#[derive(Debug, Clone)]
pub struct FloatingHeartPool {
    tokens: VecDeque<HeartToken>,
    config: HeartConfig,
}

impl FloatingHeartPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(config: HeartConfig) -> Self {
        Self {
            tokens: VecDeque::with_capacity(config.capacity + 1),
            config,
        }
    }

    /// Pool parameters.
    #[must_use]
    pub const fn config(&self) -> &HeartConfig {
        &self.config
    }

    /// Appends a token born at `now` and drops the oldest tokens above the cap.
    ///
    /// Returns the new token's id and how many tokens were pushed out.
    pub fn spawn<R: Rng + ?Sized>(&mut self, now: Millis, rng: &mut R) -> (HeartId, usize) {
        let token = HeartToken {
            born_at: now,
            lane_vw: self.config.lane_vw.sample(rng),
            rise_ms: self.config.rise_ms.sample(rng),
        };
        self.tokens.push_back(token);

        let mut evicted = 0;
        while self.tokens.len() > self.config.capacity {
            self.tokens.pop_front();
            evicted += 1;
        }
        (token.id(), evicted)
    }

    /// Removes every token whose age reached `max_age`. Returns how many.
    pub fn reap(&mut self, now: Millis) -> usize {
        let before = self.tokens.len();
        let max_age = self.config.max_age_ms;
        self.tokens.retain(|t| t.age(now) < max_age);
        before - self.tokens.len()
    }

    /// Returns true if the token is still live.
    #[must_use]
    pub fn contains(&self, id: HeartId) -> bool {
        self.get(id).is_some()
    }

    /// Looks up a live token.
    #[must_use]
    pub fn get(&self, id: HeartId) -> Option<&HeartToken> {
        self.tokens.iter().find(|t| t.id() == id)
    }

    /// Live tokens, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HeartToken> {
        self.tokens.iter()
    }

    /// Number of live tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if no token is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Drops every token.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

//! # Ambient Particle Field
//!
//! Two fixed-size pools of looping decoration (bokeh discs and sparkles).
//!
//! Each pool is sampled exactly once when the session is built and stored
//! behind an `Arc<[_]>`. Snapshots hand out clones of the same `Arc`, so a
//! renderer that compares pools across frames sees the same allocation and
//! the same values every time. Re-sampling on refresh would make the
//! decoration visibly jump.

use std::sync::Arc;

use rand::Rng;

use crate::config::{ParticleConfig, ParticlePoolConfig};

/// Which pool a particle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Large, slow light disc.
    Bokeh,
    /// Small twinkle.
    Sparkle,
}

/// One looping ambient particle. Immutable after generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParticle {
    /// Index within its pool, `0..count`.
    pub id: u32,
    /// Horizontal position, percent of viewport width, `[0, 100)`.
    pub left: f32,
    /// Vertical position, percent of viewport height, `[0, 100)`.
    pub top: f32,
    /// Diameter in pixels.
    pub size: f32,
    /// Loop duration in ms.
    pub duration_ms: f32,
    /// Loop start delay in ms.
    pub delay_ms: f32,
}

/// Samples one pool.
pub fn generate_pool<R: Rng + ?Sized>(config: &ParticlePoolConfig, rng: &mut R) -> Arc<[AmbientParticle]> {
    (0..config.count)
        .map(|i| AmbientParticle {
            id: u32::try_from(i).unwrap_or(u32::MAX),
            left: rng.gen_range(0.0..100.0),
            top: rng.gen_range(0.0..100.0),
            size: config.size.sample(rng),
            duration_ms: config.duration_ms.sample(rng),
            delay_ms: config.delay_ms.sample(rng),
        })
        .collect()
}

/// Both ambient pools for one session.
#[derive(Debug, Clone)]
pub struct ParticleField {
    bokeh: Arc<[AmbientParticle]>,
    sparkles: Arc<[AmbientParticle]>,
}

impl ParticleField {
    /// Samples both pools. Called once per session.
    pub fn generate<R: Rng + ?Sized>(config: &ParticleConfig, rng: &mut R) -> Self {
        let bokeh = generate_pool(&config.bokeh, rng);
        let sparkles = generate_pool(&config.sparkle, rng);
        tracing::debug!(
            "Particle field generated: {} bokeh, {} sparkles",
            bokeh.len(),
            sparkles.len()
        );
        Self { bokeh, sparkles }
    }

    /// Bokeh pool.
    #[must_use]
    pub fn bokeh(&self) -> &Arc<[AmbientParticle]> {
        &self.bokeh
    }

    /// Sparkle pool.
    #[must_use]
    pub fn sparkles(&self) -> &Arc<[AmbientParticle]> {
        &self.sparkles
    }

    /// Pool for a kind.
    #[must_use]
    pub fn pool(&self, kind: ParticleKind) -> &Arc<[AmbientParticle]> {
        match kind {
            ParticleKind::Bokeh => &self.bokeh,
            ParticleKind::Sparkle => &self.sparkles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_pools_have_configured_sizes_and_stable_ids() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let field = ParticleField::generate(&ParticleConfig::default(), &mut rng);

        assert_eq!(field.bokeh().len(), 12);
        assert_eq!(field.sparkles().len(), 15);
        for (i, p) in field.sparkles().iter().enumerate() {
            assert_eq!(p.id as usize, i);
        }
    }

    #[test]
    fn test_samples_stay_in_pool_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let config = ParticleConfig::default();
        let field = ParticleField::generate(&config, &mut rng);

        for (kind, pool_config) in [
            (ParticleKind::Bokeh, config.bokeh),
            (ParticleKind::Sparkle, config.sparkle),
        ] {
            for p in field.pool(kind).iter() {
                assert!((0.0..100.0).contains(&p.left));
                assert!((0.0..100.0).contains(&p.top));
                assert!(pool_config.size.contains(p.size), "{kind:?} size {}", p.size);
                assert!(pool_config.duration_ms.contains(p.duration_ms));
                assert!(pool_config.delay_ms.contains(p.delay_ms));
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let config = ParticleConfig::default();
        let a = ParticleField::generate(&config, &mut ChaCha8Rng::seed_from_u64(99));
        let b = ParticleField::generate(&config, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a.bokeh()[..], b.bokeh()[..]);
        assert_eq!(a.sparkles()[..], b.sparkles()[..]);
    }
}

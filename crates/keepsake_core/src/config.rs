//! # Engine Configuration
//!
//! Every timing constant, pool size and sampling range lives here and can be
//! overridden from a TOML file. Missing fields fall back to the defaults,
//! which reproduce the shipped experience exactly.
//!
//! ```toml
//! seed = 42
//! flow = "full"
//!
//! [timing]
//! transition_ms = 600
//!
//! [particles.bokeh]
//! count = 12
//! size = [20.0, 70.0]
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{KeepsakeError, KeepsakeResult};
use crate::scene::SceneFlow;
use crate::scheduler::Millis;

/// Closed-open sampling range `[min, max)`, written as `[min, max]` in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct SampleRange {
    /// Inclusive lower bound.
    pub min: f32,
    /// Exclusive upper bound.
    pub max: f32,
}

impl SampleRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a uniform sample. A degenerate range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Returns true if `value` lies inside `[min, max)` (or equals `min` for
    /// a degenerate range).
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        if self.max > self.min {
            value >= self.min && value < self.max
        } else {
            value == self.min
        }
    }

    fn validate(&self, name: &str) -> KeepsakeResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(KeepsakeError::InvalidConfig(format!(
                "{name}: range [{}, {}] must be finite with min <= max",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl From<[f32; 2]> for SampleRange {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<SampleRange> for [f32; 2] {
    fn from(range: SampleRange) -> Self {
        [range.min, range.max]
    }
}

/// Scene and reveal timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of the fade window between two scenes.
    pub transition_ms: Millis,
    /// Delay between two revealed characters of the letter.
    pub type_interval_ms: Millis,
    /// Delay from reveal completion to the signature appearing.
    pub signature_delay_ms: Millis,
    /// Delay from reveal completion to the navigation control appearing.
    pub nav_control_delay_ms: Millis,
    /// Lifetime of a click burst.
    pub explosion_lifetime_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transition_ms: 600,
            type_interval_ms: 25,
            signature_delay_ms: 500,
            nav_control_delay_ms: 1200,
            explosion_lifetime_ms: 1000,
        }
    }
}

/// Floating heart pool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartConfig {
    /// Spawner cadence.
    pub spawn_interval_ms: Millis,
    /// Reaper cadence.
    pub reap_interval_ms: Millis,
    /// Tokens this old or older are reaped.
    pub max_age_ms: Millis,
    /// Hard cap on live tokens, enforced at insertion.
    pub capacity: usize,
    /// Horizontal lane, percent of viewport width.
    pub lane_vw: SampleRange,
    /// Rise animation duration.
    pub rise_ms: SampleRange,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 1500,
            reap_interval_ms: 3000,
            max_age_ms: 12_000,
            capacity: 15,
            lane_vw: SampleRange::new(0.0, 100.0),
            rise_ms: SampleRange::new(10_000.0, 16_000.0),
        }
    }
}

/// One ambient particle pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticlePoolConfig {
    /// Number of particles in the pool.
    pub count: usize,
    /// Diameter in pixels.
    pub size: SampleRange,
    /// Loop duration.
    pub duration_ms: SampleRange,
    /// Start delay of the loop.
    pub delay_ms: SampleRange,
}

impl ParticlePoolConfig {
    /// Large, slow, soft-focus light discs.
    #[must_use]
    pub const fn bokeh() -> Self {
        Self {
            count: 12,
            size: SampleRange::new(20.0, 70.0),
            duration_ms: SampleRange::new(10_000.0, 25_000.0),
            delay_ms: SampleRange::new(0.0, 5_000.0),
        }
    }

    /// Small, quick twinkles.
    #[must_use]
    pub const fn sparkle() -> Self {
        Self {
            count: 15,
            size: SampleRange::new(2.0, 5.0),
            duration_ms: SampleRange::new(2_500.0, 5_500.0),
            delay_ms: SampleRange::new(0.0, 4_000.0),
        }
    }

    fn validate(&self, name: &str) -> KeepsakeResult<()> {
        self.size.validate(&format!("{name}.size"))?;
        self.duration_ms.validate(&format!("{name}.duration_ms"))?;
        self.delay_ms.validate(&format!("{name}.delay_ms"))
    }
}

/// Both ambient pools.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Bokeh pool.
    pub bokeh: ParticlePoolConfig,
    /// Sparkle pool.
    pub sparkle: ParticlePoolConfig,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            bokeh: ParticlePoolConfig::bokeh(),
            sparkle: ParticlePoolConfig::sparkle(),
        }
    }
}

/// Evasive control parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvasiveConfig {
    /// Side of the sampling box as a fraction of the viewport, centred on zero.
    pub span_fraction: f32,
}

impl Default for EvasiveConfig {
    fn default() -> Self {
        Self {
            span_fraction: 1.0 / 3.0,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Session RNG seed. Drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Which scene list the story walks through.
    pub flow: SceneFlow,
    /// Scene and reveal timing.
    pub timing: TimingConfig,
    /// Floating heart pool.
    pub hearts: HeartConfig,
    /// Ambient particle pools.
    pub particles: ParticleConfig,
    /// Evasive control.
    pub evasive: EvasiveConfig,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::Parse`] on malformed TOML and
    /// [`KeepsakeError::InvalidConfig`] on out-of-range values.
    pub fn from_toml_str(source: &str) -> KeepsakeResult<Self> {
        let config: Self = toml::from_str(source).map_err(|source| KeepsakeError::Parse {
            what: "engine config",
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> KeepsakeResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| KeepsakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Sets a fixed seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Selects a scene flow.
    #[must_use]
    pub fn with_flow(mut self, flow: SceneFlow) -> Self {
        self.flow = flow;
        self
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> KeepsakeResult<()> {
        let invalid =
            |msg: &str| -> KeepsakeResult<()> { Err(KeepsakeError::InvalidConfig(msg.to_owned())) };

        let t = &self.timing;
        if t.transition_ms == 0 {
            return invalid("timing.transition_ms must be positive");
        }
        if t.type_interval_ms == 0 {
            return invalid("timing.type_interval_ms must be positive");
        }
        if t.explosion_lifetime_ms == 0 {
            return invalid("timing.explosion_lifetime_ms must be positive");
        }
        if t.nav_control_delay_ms <= t.signature_delay_ms {
            return invalid("timing.nav_control_delay_ms must exceed timing.signature_delay_ms");
        }

        let h = &self.hearts;
        if h.spawn_interval_ms == 0 || h.reap_interval_ms == 0 {
            return invalid("hearts.spawn_interval_ms and hearts.reap_interval_ms must be positive");
        }
        if h.capacity == 0 {
            return invalid("hearts.capacity must be at least 1");
        }
        h.lane_vw.validate("hearts.lane_vw")?;
        h.rise_ms.validate("hearts.rise_ms")?;

        self.particles.bokeh.validate("particles.bokeh")?;
        self.particles.sparkle.validate("particles.sparkle")?;

        let span = self.evasive.span_fraction;
        if !(span > 0.0 && span <= 1.0) {
            return invalid("evasive.span_fraction must be in (0, 1]");
        }
        Ok(())
    }
}

//! Easing curves and millisecond tweens.
//!
//! Engine state jumps (an evasive offset is replaced outright, a transition
//! is just a flag and a start time). These helpers turn the jumps into
//! motion on the rendering side without feeding anything back.

use keepsake_core::{EvasiveOffset, TransitionView};

/// Easing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Straight line.
    Linear,
    /// Fast start, long settle: `1 - 2^(-10t)`.
    #[default]
    ExponentialOut,
    /// Smooth start and finish.
    CubicInOut,
    /// Jump to the end.
    Instant,
}

impl Easing {
    /// Maps `t` in `0..=1` (clamped) through the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::ExponentialOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::Instant => 1.0,
        }
    }
}

/// A scalar eased towards its latest target over a fixed duration.
#[derive(Debug, Clone)]
pub struct Tween {
    start: f32,
    current: f32,
    target: f32,
    elapsed_ms: f32,
    duration_ms: f32,
    easing: Easing,
}

impl Tween {
    /// Creates a tween resting at `value`.
    #[must_use]
    pub fn new(value: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            start: value,
            current: value,
            target: value,
            elapsed_ms: duration_ms,
            duration_ms,
            easing,
        }
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Returns true once the value reached its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    /// Retargets from wherever the value is now.
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() > f32::EPSILON {
            self.start = self.current;
            self.target = target;
            self.elapsed_ms = 0.0;
        }
    }

    /// Advances by `dt_ms`.
    pub fn update(&mut self, dt_ms: f32) {
        if self.is_settled() {
            return;
        }
        self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);

        if self.duration_ms <= 0.0 || self.is_settled() {
            self.current = self.target;
            return;
        }
        let eased = self.easing.apply(self.elapsed_ms / self.duration_ms);
        self.current = self.start + (self.target - self.start) * eased;
    }
}

/// Eased position of the evasive control.
#[derive(Debug, Clone)]
pub struct OffsetTween {
    x: Tween,
    y: Tween,
}

impl OffsetTween {
    /// Glide time towards a new offset.
    pub const DURATION_MS: f32 = 300.0;

    /// Creates a tween resting at zero offset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            x: Tween::new(0.0, Self::DURATION_MS, Easing::ExponentialOut),
            y: Tween::new(0.0, Self::DURATION_MS, Easing::ExponentialOut),
        }
    }

    /// Follows the engine's latest offset.
    pub fn set_target(&mut self, offset: EvasiveOffset) {
        self.x.set_target(offset.x);
        self.y.set_target(offset.y);
    }

    /// Advances by `dt_ms`.
    pub fn update(&mut self, dt_ms: f32) {
        self.x.update(dt_ms);
        self.y.update(dt_ms);
    }

    /// Offset to draw this frame.
    #[must_use]
    pub fn value(&self) -> EvasiveOffset {
        EvasiveOffset {
            x: self.x.value(),
            y: self.y.value(),
        }
    }
}

impl Default for OffsetTween {
    fn default() -> Self {
        Self::new()
    }
}

/// Opacity of the active scene layer: fades out across a transition.
#[must_use]
pub fn scene_opacity(transition: Option<&TransitionView>) -> f32 {
    transition.map_or(1.0, |t| 1.0 - Easing::CubicInOut.apply(t.progress()))
}

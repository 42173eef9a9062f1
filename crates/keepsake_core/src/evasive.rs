//! # Evasive Control
//!
//! The proposal scene's second button jumps away whenever the pointer
//! enters it. Each jump is a fresh uniform sample inside a box centred on the
//! button's home position; offsets replace each other and never accumulate.

use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Where the engine reads the current viewport from.
///
/// Read at the moment of a pointer-enter, never cached.
pub trait ViewportSource: Send + Sync {
    /// Current viewport size.
    fn viewport(&self) -> Viewport;
}

impl ViewportSource for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}

/// Viewport that the rendering side updates on resize.
#[derive(Debug, Clone, Default)]
pub struct SharedViewport {
    inner: Arc<RwLock<Viewport>>,
}

impl SharedViewport {
    /// Creates a shared viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            inner: Arc::new(RwLock::new(viewport)),
        }
    }

    /// Records a resize.
    pub fn set(&self, viewport: Viewport) {
        *self.inner.write() = viewport;
    }
}

impl ViewportSource for SharedViewport {
    fn viewport(&self) -> Viewport {
        *self.inner.read()
    }
}

/// Translation applied to the evasive control, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvasiveOffset {
    /// Horizontal shift.
    pub x: f32,
    /// Vertical shift.
    pub y: f32,
}

impl EvasiveOffset {
    /// No displacement.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
}

/// Samples control offsets.
#[derive(Debug, Clone, Copy)]
pub struct EvasiveControl {
    span_fraction: f32,
}

impl EvasiveControl {
    /// Creates a sampler whose box side is `span_fraction` of the viewport.
    #[must_use]
    pub const fn new(span_fraction: f32) -> Self {
        Self { span_fraction }
    }

    /// Largest displacement allowed for `viewport`, per axis.
    #[must_use]
    pub fn bound(&self, viewport: Viewport) -> EvasiveOffset {
        EvasiveOffset {
            x: viewport.width * self.span_fraction * 0.5,
            y: viewport.height * self.span_fraction * 0.5,
        }
    }

    /// Draws a new offset for a pointer-enter.
    pub fn on_pointer_enter<R: Rng + ?Sized>(&self, viewport: Viewport, rng: &mut R) -> EvasiveOffset {
        let span_x = viewport.width * self.span_fraction;
        let span_y = viewport.height * self.span_fraction;
        EvasiveOffset {
            x: (rng.gen::<f32>() - 0.5) * span_x,
            y: (rng.gen::<f32>() - 0.5) * span_y,
        }
    }
}

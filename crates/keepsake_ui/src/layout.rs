//! Screen-space rectangles and percent-to-pixel conversion.

use keepsake_core::{EvasiveOffset, Viewport};

/// A rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Square of side `size` centred on `(cx, cy)`.
    #[must_use]
    pub fn centered(cx: f32, cy: f32, size: f32) -> Self {
        let half = size * 0.5;
        Self::new(cx - half, cy - half, size, size)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns true if the point is inside (right and bottom edges excluded).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shifted by an evasive offset.
    #[must_use]
    pub fn offset(&self, by: EvasiveOffset) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }
}

/// Converts percent-of-viewport coordinates to pixels.
#[must_use]
pub fn percent_to_px(viewport: Viewport, left: f32, top: f32) -> (f32, f32) {
    (viewport.width * left / 100.0, viewport.height * top / 100.0)
}

/// Layout of the scene controls for a viewport.
///
/// Controls sit on a centred column near the bottom third of the screen. The
/// proposal shows its two controls side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLayout {
    /// Welcome title.
    pub title: Rect,
    /// The single advance control of the welcome, letter and gallery scenes,
    /// and the affirmative control of the proposal.
    pub primary: Rect,
    /// Evasive control home position, before its offset.
    pub evasive_home: Rect,
}

impl ControlLayout {
    /// Control height in pixels.
    pub const CONTROL_HEIGHT: f32 = 56.0;
    /// Control width in pixels.
    pub const CONTROL_WIDTH: f32 = 220.0;

    /// Computes the layout for `viewport`.
    #[must_use]
    pub fn for_viewport(viewport: Viewport) -> Self {
        let cx = viewport.width * 0.5;
        let row = viewport.height * 0.7;
        let w = Self::CONTROL_WIDTH;
        let h = Self::CONTROL_HEIGHT;

        Self {
            title: Rect::new(cx - viewport.width * 0.3, viewport.height * 0.25, viewport.width * 0.6, 80.0),
            primary: Rect::new(cx - w - 12.0, row, w, h),
            evasive_home: Rect::new(cx + 12.0, row, w, h),
        }
    }

    /// The primary control centred alone on its row.
    #[must_use]
    pub fn primary_centered(&self) -> Rect {
        let (title_cx, _) = self.title.center();
        Rect::new(
            title_cx - self.primary.width * 0.5,
            self.primary.y,
            self.primary.width,
            self.primary.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_excludes_far_edges() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(10.0, 10.0));
        assert!(rect.contains(29.9, 29.9));
        assert!(!rect.contains(30.0, 15.0));
        assert!(!rect.contains(15.0, 30.0));
    }

    #[test]
    fn test_offset_moves_without_resizing() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0).offset(EvasiveOffset { x: 5.0, y: -5.0 });
        assert_eq!(rect, Rect::new(5.0, -5.0, 10.0, 10.0));
    }

    #[test]
    fn test_percent_to_px() {
        let (x, y) = percent_to_px(Viewport::new(200.0, 100.0), 50.0, 25.0);
        assert!((x - 100.0).abs() < 1e-6);
        assert!((y - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_controls_do_not_overlap() {
        let layout = ControlLayout::for_viewport(Viewport::new(1280.0, 720.0));
        assert!(layout.primary.right() <= layout.evasive_home.x);
    }
}

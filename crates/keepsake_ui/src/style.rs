//! Colours for the story palette.
//!
//! Ambient decoration is drawn at reduced alpha on every scene but the
//! welcome, so it sits behind the letter and the gallery instead of
//! competing with them.

/// RGBA colour, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Letter ink.
    pub const INK: Self = Self::rgb(0.29, 0.16, 0.2);
    /// Floating hearts and burst shards.
    pub const ROSE: Self = Self::rgb(1.0, 0.33, 0.5);
    /// Bokeh discs.
    pub const BLUSH: Self = Self::rgba(1.0, 0.75, 0.82, 0.6);
    /// Sparkles.
    pub const GOLD: Self = Self::rgb(1.0, 0.86, 0.55);
    /// Scene backdrop.
    pub const PAPER: Self = Self::rgb(1.0, 0.96, 0.97);

    /// Alpha multiplier for softened ambience.
    pub const SOFT_ALPHA: f32 = 0.35;

    /// Creates a colour from RGBA components.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque colour.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same colour with alpha scaled by `factor`.
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: self.a * factor.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Same colour, softened when `soft` is set.
    #[must_use]
    pub fn ambient(self, soft: bool) -> Self {
        if soft {
            self.fade(Self::SOFT_ALPHA)
        } else {
            self
        }
    }

    /// Components as an array for vertex data.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_ambient_lowers_alpha_only() {
        let soft = Color::ROSE.ambient(true);
        assert!((soft.a - Color::SOFT_ALPHA).abs() < 1e-6);
        assert_eq!((soft.r, soft.g, soft.b), (Color::ROSE.r, Color::ROSE.g, Color::ROSE.b));
        assert_eq!(Color::ROSE.ambient(false), Color::ROSE);
    }
}

//! Pointer input to engine events.
//!
//! The renderer registers hit regions every frame (usually straight from
//! [`crate::render::DisplayList::hit_regions`]) and forwards raw pointer
//! motion and clicks. The tracker turns them into [`UiEvent`]s:
//!
//! - entering the evasive control emits `EvasivePointerEnter` once per entry
//! - entering / leaving the title emits `TitleHover(true / false)`
//! - clicking a heart emits `HeartClicked` with the click position
//! - clicking an action control emits `Action`
//!
//! Regions registered later sit on top.

use keepsake_core::{HeartId, SceneAction, UiEvent};

use crate::layout::Rect;

/// What a region stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitRegion {
    /// A live floating heart.
    Heart(HeartId),
    /// The evasive control.
    EvasiveControl,
    /// The welcome title.
    Title,
    /// A scene-advancing control.
    Action(SceneAction),
}

/// Tracks which region the pointer rests on.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    regions: Vec<(HitRegion, Rect)>,
    hovered: Option<HitRegion>,
    position: Option<(f32, f32)>,
}

impl PointerTracker {
    /// Creates a tracker with no regions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the hit regions for this frame.
    ///
    /// Regions move under a still pointer (hearts rise, the evasive control
    /// jumps), so hover is re-evaluated at the last known position.
    pub fn set_regions(&mut self, regions: impl IntoIterator<Item = (HitRegion, Rect)>) -> Vec<UiEvent> {
        self.regions.clear();
        self.regions.extend(regions);
        match self.position {
            Some((x, y)) => self.update_hover(x, y),
            None => Vec::new(),
        }
    }

    /// Region under the pointer, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<HitRegion> {
        self.hovered
    }

    /// Topmost region at a point.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32) -> Option<HitRegion> {
        self.regions
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(region, _)| *region)
    }

    /// Records pointer motion. Returns hover events, leave before enter.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> Vec<UiEvent> {
        self.position = Some((x, y));
        self.update_hover(x, y)
    }

    /// Records the pointer leaving the window.
    pub fn pointer_left(&mut self) -> Vec<UiEvent> {
        self.position = None;
        let mut events = Vec::new();
        if let Some(previous) = self.hovered.take() {
            Self::on_leave(previous, &mut events);
        }
        events
    }

    /// Records a click. Returns the event it maps to, if any.
    #[must_use]
    pub fn click(&self, x: f32, y: f32) -> Option<UiEvent> {
        match self.hit_test(x, y)? {
            HitRegion::Heart(heart) => Some(UiEvent::HeartClicked { heart, x, y }),
            HitRegion::Action(action) => Some(UiEvent::Action(action)),
            HitRegion::EvasiveControl | HitRegion::Title => None,
        }
    }

    fn update_hover(&mut self, x: f32, y: f32) -> Vec<UiEvent> {
        let now = self.hit_test(x, y);
        let mut events = Vec::new();
        if now == self.hovered {
            return events;
        }

        if let Some(previous) = self.hovered {
            Self::on_leave(previous, &mut events);
        }
        match now {
            Some(HitRegion::EvasiveControl) => events.push(UiEvent::EvasivePointerEnter),
            Some(HitRegion::Title) => events.push(UiEvent::TitleHover(true)),
            _ => {}
        }
        self.hovered = now;
        events
    }

    fn on_leave(region: HitRegion, events: &mut Vec<UiEvent>) {
        if region == HitRegion::Title {
            events.push(UiEvent::TitleHover(false));
        }
    }
}

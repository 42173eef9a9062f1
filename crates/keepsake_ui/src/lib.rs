//! # KEEPSAKE UI Adapter
//!
//! The rendering side of a keepsake session, without a windowing backend:
//! - Hit testing on plain rectangles
//! - Pointer tracking that turns motion and clicks into engine events
//! - Easing for the scene fade and the evasive control's glide
//! - Display lists with GPU-ready particle instances
//!
//! ## Frame Loop
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Session::snapshot ─> DisplayList::build ─> draw commands      │
//! │                             │                                 │
//! │                      hit_regions()                            │
//! │                             ▼                                 │
//! │ pointer input ─> PointerTracker ─> UiEvent ─> EventSender     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::cast_precision_loss)]

pub mod animation;
pub mod input;
pub mod layout;
pub mod render;
pub mod style;

pub use animation::{scene_opacity, Easing, OffsetTween, Tween};
pub use input::{HitRegion, PointerTracker};
pub use layout::{ControlLayout, Rect};
pub use render::{DisplayList, ParticleInstance, RenderCommand};
pub use style::Color;

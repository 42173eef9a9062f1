//! # Display List
//!
//! Maps one [`SessionSnapshot`] to a flat, back-to-front list of render
//! commands plus the hit regions the pointer tracker needs for the same
//! frame.
//!
//! ```text
//! Backdrop
//! Particles (bokeh, sparkles)      ─┐
//! Hearts                            ├─ softened off the welcome scene
//! SceneLayer { opacity }           ─┘
//!   Text / Card / Control ...        scene content, faded with the layer
//! Burst (8 shards each)              always on top
//! ```
//!
//! Particle and shard data are [`ParticleInstance`]s: `#[repr(C)]` and
//! `Pod`, so a GPU backend can upload them as an instance buffer without
//! conversion.

use std::f32::consts::TAU;

use keepsake_core::{
    Explosion, ExplosionId, HeartId, Millis, ParticleKind, SceneAction, SceneKind, SessionSnapshot, StoryContent,
    Viewport,
};

use crate::animation::{scene_opacity, Easing};
use crate::input::HitRegion;
use crate::layout::{percent_to_px, ControlLayout, Rect};
use crate::style::Color;

/// One particle or burst shard, ready for an instance buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    /// Centre in viewport pixels.
    pub center: [f32; 2],
    /// Diameter in pixels.
    pub size: f32,
    /// Position in the loop (or burst), `0.0..1.0`.
    pub phase: f32,
    /// RGBA colour.
    pub color: [f32; 4],
}

/// A single drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Full-screen fill.
    Backdrop {
        /// Fill colour.
        color: Color,
    },
    /// One ambient pool.
    Particles {
        /// Which pool.
        kind: ParticleKind,
        /// Instances in pool order.
        instances: Vec<ParticleInstance>,
    },
    /// A floating heart glyph.
    Heart {
        /// Heart identity.
        id: HeartId,
        /// Glyph bounds.
        bounds: Rect,
        /// Tint.
        color: Color,
    },
    /// Start of the scene layer. Everything up to the next burst is scene
    /// content drawn at this opacity.
    SceneLayer {
        /// Scene being drawn.
        scene: SceneKind,
        /// Layer opacity.
        opacity: f32,
    },
    /// A line or block of text.
    Text {
        /// Text content.
        text: String,
        /// Left edge.
        x: f32,
        /// Baseline.
        y: f32,
        /// Font size in pixels.
        font_size: f32,
        /// Text colour.
        color: Color,
    },
    /// A gallery card.
    Card {
        /// Card bounds.
        bounds: Rect,
        /// Card title.
        title: String,
        /// Date label.
        date: String,
        /// Caption.
        caption: String,
        /// Glyph shown without an image.
        icon: String,
        /// Image reference.
        image: Option<String>,
    },
    /// A clickable control.
    Control {
        /// What the control does.
        region: HitRegion,
        /// Bounds, offset already applied.
        bounds: Rect,
        /// Label.
        label: &'static str,
    },
    /// A click burst.
    Burst {
        /// Burst id.
        id: ExplosionId,
        /// The shards, one per mini-heart.
        shards: Vec<ParticleInstance>,
    },
}

/// Commands and hit regions for one frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<RenderCommand>,
    regions: Vec<(HitRegion, Rect)>,
}

impl DisplayList {
    /// Floating heart glyph size in pixels.
    pub const HEART_SIZE: f32 = 28.0;
    /// Distance a burst shard travels.
    pub const SHARD_TRAVEL: f32 = 80.0;
    /// Burst shard size in pixels.
    pub const SHARD_SIZE: f32 = 14.0;
    /// Gallery card size.
    pub const CARD_SIZE: (f32, f32) = (260.0, 300.0);

    /// Builds the frame for `snapshot`.
    #[must_use]
    pub fn build(snapshot: &SessionSnapshot, content: &StoryContent, viewport: Viewport) -> Self {
        let mut list = Self {
            commands: Vec::with_capacity(64),
            regions: Vec::with_capacity(32),
        };
        let soft = snapshot.ambient_softened;
        let now = snapshot.now;

        list.commands.push(RenderCommand::Backdrop { color: Color::PAPER });
        list.push_particles(ParticleKind::Bokeh, &snapshot.bokeh, Color::BLUSH.ambient(soft), now, viewport);
        list.push_particles(ParticleKind::Sparkle, &snapshot.sparkles, Color::GOLD.ambient(soft), now, viewport);

        list.commands.push(RenderCommand::SceneLayer {
            scene: snapshot.scene,
            opacity: scene_opacity(snapshot.transition.as_ref()),
        });
        list.push_scene(snapshot, content, viewport);

        for heart in &snapshot.hearts {
            let x = viewport.width * heart.lane_vw / 100.0;
            let progress = (heart.age(now) as f32 / heart.rise_ms.max(1.0)).clamp(0.0, 1.0);
            let y = viewport.height + Self::HEART_SIZE - (viewport.height + Self::HEART_SIZE * 2.0) * progress;
            let bounds = Rect::centered(x, y, Self::HEART_SIZE);

            list.commands.push(RenderCommand::Heart {
                id: heart.id(),
                bounds,
                color: Color::ROSE.ambient(soft),
            });
            list.regions.push((HitRegion::Heart(heart.id()), bounds));
        }

        for burst in &snapshot.explosions {
            list.commands.push(RenderCommand::Burst {
                id: burst.id,
                shards: burst_shards(burst, now),
            });
        }

        list
    }

    /// Commands, back to front.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Hit regions, bottom to top.
    #[must_use]
    pub fn hit_regions(&self) -> &[(HitRegion, Rect)] {
        &self.regions
    }

    fn push_particles(
        &mut self,
        kind: ParticleKind,
        pool: &[keepsake_core::AmbientParticle],
        color: Color,
        now: Millis,
        viewport: Viewport,
    ) {
        let instances = pool
            .iter()
            .map(|p| {
                let (x, y) = percent_to_px(viewport, p.left, p.top);
                ParticleInstance {
                    center: [x, y],
                    size: p.size,
                    phase: loop_phase(now, p.duration_ms, p.delay_ms),
                    color: color.to_array(),
                }
            })
            .collect();
        self.commands.push(RenderCommand::Particles { kind, instances });
    }

    fn push_text(&mut self, text: impl Into<String>, x: f32, y: f32, font_size: f32) {
        self.commands.push(RenderCommand::Text {
            text: text.into(),
            x,
            y,
            font_size,
            color: Color::INK,
        });
    }

    fn push_control(&mut self, region: HitRegion, bounds: Rect, label: &'static str) {
        self.commands.push(RenderCommand::Control { region, bounds, label });
        self.regions.push((region, bounds));
    }

    fn push_scene(&mut self, snapshot: &SessionSnapshot, content: &StoryContent, viewport: Viewport) {
        let layout = ControlLayout::for_viewport(viewport);
        let left = viewport.width * 0.15;
        let top = viewport.height * 0.15;

        match snapshot.scene {
            SceneKind::Initial => {
                let title = if snapshot.title_hovered {
                    &content.title.hovered
                } else {
                    &content.title.resting
                };
                let (tx, ty) = (layout.title.x, layout.title.bottom());
                self.push_text(title.as_str(), tx, ty, 56.0);
                self.regions.push((HitRegion::Title, layout.title));
                self.push_text(content.title.subtitle.as_str(), tx, ty + 48.0, 22.0);
                self.push_control(
                    HitRegion::Action(SceneAction::Surprise),
                    layout.primary_centered(),
                    "Click Here For Your Surprise! ✨",
                );
            }
            SceneKind::Letter => {
                self.push_text("A Letter From My Heart", left, top, 36.0);
                let Some(letter) = &snapshot.letter else {
                    return;
                };
                self.push_text(format!("{}|", letter.text), left, top + 60.0, 20.0);
                if letter.signature_visible {
                    let sig_y = viewport.height * 0.58;
                    self.push_text(content.letter.closing.as_str(), left, sig_y, 20.0);
                    self.push_text(content.letter.signer.as_str(), left, sig_y + 30.0, 26.0);
                    self.push_text(content.letter.date.as_str(), left, sig_y + 60.0, 16.0);
                    self.push_text(content.letter.forever_line.as_str(), left, sig_y + 100.0, 22.0);
                }
                if letter.nav_control_visible {
                    self.push_control(
                        HitRegion::Action(SceneAction::SeeMemories),
                        layout.primary_centered(),
                        "See Our Memories 💞",
                    );
                }
            }
            SceneKind::Gallery => {
                self.push_text("Our Beautiful Memories", left, top, 36.0);
                let (card_w, card_h) = Self::CARD_SIZE;
                let gap = 24.0;
                let per_row = ((viewport.width - left * 2.0 + gap) / (card_w + gap)).floor().max(1.0) as usize;
                for (i, entry) in content.gallery.iter().enumerate() {
                    let col = (i % per_row) as f32;
                    let row = (i / per_row) as f32;
                    self.commands.push(RenderCommand::Card {
                        bounds: Rect::new(
                            left + col * (card_w + gap),
                            top + 60.0 + row * (card_h + gap),
                            card_w,
                            card_h,
                        ),
                        title: entry.title.clone(),
                        date: entry.date.clone(),
                        caption: entry.caption.clone(),
                        icon: entry.icon.clone(),
                        image: entry.image.clone(),
                    });
                }
                if snapshot.flow.includes(SceneKind::Proposal) {
                    self.push_control(
                        HitRegion::Action(SceneAction::NextFromGallery),
                        layout.primary_centered(),
                        "Next 💖",
                    );
                }
            }
            SceneKind::Proposal => {
                self.push_text("Will You Be My Valentine? 💕", left, viewport.height * 0.4, 40.0);
                self.push_control(HitRegion::Action(SceneAction::AcceptProposal), layout.primary, "YES 💖");
                self.push_control(
                    HitRegion::EvasiveControl,
                    layout.evasive_home.offset(snapshot.evasive_offset),
                    "NO 😅",
                );
            }
            SceneKind::Promise => {
                self.push_text("My Promise to You 💍", left, top, 40.0);
                for (i, line) in content.promise.iter().enumerate() {
                    self.push_text(line.as_str(), left, top + 70.0 + 40.0 * i as f32, 22.0);
                }
            }
        }
    }
}

/// Position in a looping animation that starts after `delay_ms`.
#[must_use]
pub fn loop_phase(now: Millis, duration_ms: f32, delay_ms: f32) -> f32 {
    let t = now as f32 - delay_ms;
    if t <= 0.0 || duration_ms <= 0.0 {
        return 0.0;
    }
    (t % duration_ms) / duration_ms
}

/// Shards of one burst at `now`, flung out evenly around the click point.
#[must_use]
pub fn burst_shards(burst: &Explosion, now: Millis) -> Vec<ParticleInstance> {
    let progress = burst.progress(now);
    let travel = DisplayList::SHARD_TRAVEL * Easing::ExponentialOut.apply(progress);
    let color = Color::ROSE.fade(1.0 - progress).to_array();

    (0..Explosion::SHARDS)
        .map(|i| {
            let angle = TAU * i as f32 / Explosion::SHARDS as f32;
            ParticleInstance {
                center: [burst.x + angle.cos() * travel, burst.y + angle.sin() * travel],
                size: DisplayList::SHARD_SIZE,
                phase: progress,
                color,
            }
        })
        .collect()
}

/// Raw bytes of an instance slice, for buffer upload.
#[must_use]
pub fn instance_bytes(instances: &[ParticleInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_core::{EngineConfig, Session};

    fn session(letter: &str) -> Session {
        Session::new(
            EngineConfig::default().with_seed(5),
            &StoryContent::default().with_letter_body(letter),
            Viewport::new(1000.0, 800.0),
        )
        .unwrap()
    }

    fn controls(list: &DisplayList) -> Vec<HitRegion> {
        list.commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Control { region, .. } => Some(*region),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 32);
        let instances = [ParticleInstance::default(); 3];
        assert_eq!(instance_bytes(&instances).len(), 96);
    }

    #[test]
    fn test_welcome_frame() {
        let session = session("hi");
        let list = DisplayList::build(&session.snapshot(), &StoryContent::default(), Viewport::new(1000.0, 800.0));

        assert_eq!(controls(&list), vec![HitRegion::Action(SceneAction::Surprise)]);
        assert!(list.hit_regions().iter().any(|(r, _)| *r == HitRegion::Title));
        let pools: Vec<usize> = list
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Particles { instances, .. } => Some(instances.len()),
                _ => None,
            })
            .collect();
        assert_eq!(pools, vec![12, 15]);
    }

    #[test]
    fn test_letter_nav_control_appears_with_reveal() {
        let mut session = session("hi");
        let content = StoryContent::default();
        let viewport = Viewport::new(1000.0, 800.0);
        session.trigger(SceneAction::Surprise);

        session.advance(50 + 1199);
        assert!(controls(&DisplayList::build(&session.snapshot(), &content, viewport)).is_empty());

        session.advance(1);
        assert_eq!(
            controls(&DisplayList::build(&session.snapshot(), &content, viewport)),
            vec![HitRegion::Action(SceneAction::SeeMemories)]
        );
    }

    #[test]
    fn test_hearts_are_clickable_regions() {
        let mut session = session("");
        session.advance(3000);
        let list = DisplayList::build(&session.snapshot(), &StoryContent::default(), Viewport::new(1000.0, 800.0));
        let hearts = list
            .hit_regions()
            .iter()
            .filter(|(r, _)| matches!(r, HitRegion::Heart(_)))
            .count();
        assert_eq!(hearts, 2);
    }

    #[test]
    fn test_burst_shards_spread_and_fade() {
        let burst = Explosion {
            id: ExplosionId(1),
            x: 100.0,
            y: 100.0,
            born_at: 0,
            expires_at: 1000,
        };
        let start = burst_shards(&burst, 0);
        assert_eq!(start.len(), Explosion::SHARDS);
        assert!(start.iter().all(|s| s.center == [100.0, 100.0]));

        let late = burst_shards(&burst, 900);
        assert!(late.iter().all(|s| s.color[3] < 0.2));
        let (dx, dy) = (late[0].center[0] - 100.0, late[0].center[1] - 100.0);
        assert!((dx * dx + dy * dy).sqrt() > 70.0);
    }

    #[test]
    fn test_loop_phase_waits_for_delay() {
        assert!(loop_phase(500, 2000.0, 1000.0).abs() < 1e-6);
        assert!((loop_phase(2000, 2000.0, 1000.0) - 0.5).abs() < 1e-6);
        assert!((loop_phase(3500, 2000.0, 1000.0) - 0.25).abs() < 1e-6);
    }
}

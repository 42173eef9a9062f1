//! # KEEPSAKE Core
//!
//! Scene flow and animation lifecycle engine for a five-scene story page.
//! Rendering is someone else's job; this crate decides *what* is on screen
//! and *when*, and guarantees that nothing it starts outlives its scene.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          SESSION                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  UiEvent ──> SceneFlowController ──> Scene (per-scene state)  │
//! │                     │                    │                    │
//! │                     ▼                    ▼                    │
//! │              Scheduler<Task>  <── TypewriterEngine            │
//! │               │       │                                       │
//! │   FloatingHeartPool  ExplosionManager   ParticleField (once)  │
//! │                                                               │
//! │  snapshot() ──> SessionSnapshot ──> renderer                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - One logical clock; timers fire in due order, ties in schedule order.
//! - At most one scene transition in flight.
//! - Heart count never exceeds the configured capacity.
//! - Every burst removes itself after its lifetime.
//! - Ending the session cancels every timer.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod content;
pub mod driver;
pub mod error;
pub mod evasive;
pub mod event;
pub mod explosion;
pub mod hearts;
pub mod particles;
pub mod scene;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod task;
pub mod typewriter;

pub use config::{EngineConfig, HeartConfig, ParticleConfig, ParticlePoolConfig, SampleRange, TimingConfig};
pub use content::{GalleryEntry, LetterContent, StoryContent, TitleContent};
pub use driver::{RealtimeDriver, SharedSession, ShutdownHandle};
pub use error::{KeepsakeError, KeepsakeResult};
pub use evasive::{EvasiveControl, EvasiveOffset, SharedViewport, Viewport, ViewportSource};
pub use event::{EventOutcome, EventQueue, EventSender, UiEvent};
pub use explosion::{Explosion, ExplosionId, ExplosionManager};
pub use hearts::{FloatingHeartPool, HeartId, HeartToken};
pub use particles::{AmbientParticle, ParticleField, ParticleKind};
pub use scene::{ActionOutcome, IgnoreReason, Scene, SceneAction, SceneFlow, SceneFlowController, SceneKind};
pub use scheduler::{Millis, Scheduler, TimerId, TimerScope};
pub use session::Session;
pub use snapshot::{LetterView, SessionSnapshot, TransitionView};
pub use typewriter::{TypeStep, TypewriterEngine};

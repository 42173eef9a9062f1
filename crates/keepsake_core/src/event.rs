//! # UI Events
//!
//! Events the rendering side feeds into the engine, and the bounded queue
//! that carries them across threads.
//!
//! ```text
//! Renderer ──EventSender::send──> [ bounded channel ] ──EventQueue::drain──> Session::handle
//! ```
//!
//! A full queue drops the event instead of blocking the renderer.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::evasive::EvasiveOffset;
use crate::explosion::ExplosionId;
use crate::hearts::HeartId;
use crate::scene::{ActionOutcome, SceneAction};

/// Input accepted from the rendering side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    /// A scene-advancing control was activated.
    Action(SceneAction),
    /// A live floating heart was clicked.
    HeartClicked {
        /// Heart that was clicked.
        heart: HeartId,
        /// Pointer x in viewport pixels.
        x: f32,
        /// Pointer y in viewport pixels.
        y: f32,
    },
    /// The pointer entered the evasive control.
    EvasivePointerEnter,
    /// The pointer entered (`true`) or left (`false`) the welcome title.
    TitleHover(bool),
}

/// What an event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    /// Result of a scene action.
    Scene(ActionOutcome),
    /// A burst was spawned.
    Exploded(ExplosionId),
    /// The evasive control moved.
    Evaded(EvasiveOffset),
    /// The welcome title changed.
    TitleChanged(bool),
    /// Nothing happened (stale heart, wrong scene, session ended).
    Ignored,
}

/// Cloneable producer side of the event queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<UiEvent>,
}

impl EventSender {
    /// Enqueues an event. Returns false if it was dropped.
    pub fn send(&self, event: UiEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::debug!("Event queue full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Consumer side of the event queue.
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<UiEvent>,
    rx: Receiver<UiEvent>,
}

impl EventQueue {
    /// Default queue depth: far more than one frame of pointer input.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a queue holding at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// New producer handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender { tx: self.tx.clone() }
    }

    /// Takes every event queued so far, in order.
    pub fn drain(&self) -> impl Iterator<Item = UiEvent> + '_ {
        self.rx.try_iter()
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

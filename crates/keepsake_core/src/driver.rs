//! # Real-Time Driver
//!
//! Runs a [`Session`] against the wall clock on a single-threaded tokio
//! runtime. Each frame it drains queued UI events, then advances the
//! session to the elapsed wall time.
//!
//! ```text
//!  interval tick ──> drain EventQueue ──> Session::handle (each event)
//!        ▲                                      │
//!        └───────── Session::advance_to(elapsed)◄┘
//! ```
//!
//! The session sits behind a [`SharedSession`] so a renderer on another
//! thread can take snapshots between frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{KeepsakeError, KeepsakeResult};
use crate::event::{EventQueue, EventSender};
use crate::scheduler::Millis;
use crate::session::Session;
use crate::snapshot::SessionSnapshot;

/// Session handle shared between the driver and the renderer.
pub type SharedSession = Arc<Mutex<Session>>;

/// Asks a running driver to stop after the current frame.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Requests shutdown.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns true once shutdown was requested.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Drives a session on real time.
pub struct RealtimeDriver {
    session: SharedSession,
    queue: EventQueue,
    frame: Duration,
    shutdown: ShutdownHandle,
}

impl RealtimeDriver {
    /// Default frame period (about 60 Hz).
    pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

    /// Wraps `session` with a default-sized event queue.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            queue: EventQueue::default(),
            frame: Self::DEFAULT_FRAME,
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Sets the frame period. Zero is raised to 1 ms.
    #[must_use]
    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame.max(Duration::from_millis(1));
        self
    }

    /// Shared handle to the session.
    #[must_use]
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    /// New producer for UI events.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    /// Handle that stops the frame loop.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Runs frames until shutdown is requested, the session ends, or
    /// `run_for` elapses. The session is ended before returning.
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::Runtime`] if the tokio runtime cannot be built.
    pub fn run(&self, run_for: Option<Duration>) -> KeepsakeResult<SessionSnapshot> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(KeepsakeError::Runtime)?;

        let frames = runtime.block_on(self.frame_loop(run_for));

        let mut session = self.session.lock();
        session.end();
        tracing::info!("Realtime driver stopped after {} frames", frames);
        Ok(session.snapshot())
    }

    async fn frame_loop(&self, run_for: Option<Duration>) -> u64 {
        let mut interval = tokio::time::interval(self.frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let started = Instant::now();
        let base = self.session.lock().now();
        let mut frames = 0u64;

        loop {
            interval.tick().await;
            if self.shutdown.is_triggered() {
                break;
            }

            let elapsed = started.elapsed();
            let elapsed_ms = Millis::try_from(elapsed.as_millis()).unwrap_or(Millis::MAX);
            {
                let mut session = self.session.lock();
                for event in self.queue.drain() {
                    session.handle(event);
                }
                session.advance_to(base.saturating_add(elapsed_ms));
                if session.is_ended() {
                    break;
                }
            }
            frames += 1;

            if run_for.is_some_and(|limit| elapsed >= limit) {
                break;
            }
        }
        frames
    }
}

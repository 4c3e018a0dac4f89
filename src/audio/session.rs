//! Recording-session state machine over a [`Capture`] backend.
//!
//! At most one session is active per context; callers check
//! [`is_active`](AudioSession::is_active) before starting.  [`stop`] drains
//! the buffered chunks, assembles them into a single WAV payload, releases
//! the device and resets the session — calling it again without an active
//! session returns `None` and never panics.
//!
//! [`stop`]: AudioSession::stop

use std::sync::mpsc;

use thiserror::Error;

use super::capture::{AudioChunk, Capture, CaptureError, CpalCapture};
use super::wav;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Lifecycle states of a recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No capture in progress.
    #[default]
    Idle,
    /// Device acquired; chunks are being buffered.
    Recording,
    /// The last start attempt failed (permission or device error).
    Failed,
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors surfaced by [`AudioSession::start`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// Starting while already Recording is not a defined happy path.
    #[error("a recording session is already active")]
    AlreadyActive,

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

// ---------------------------------------------------------------------------
// AudioSession
// ---------------------------------------------------------------------------

/// Owns the microphone capture lifecycle and the buffered audio.
pub struct AudioSession {
    state: SessionState,
    capture: Box<dyn Capture>,
    chunks_rx: Option<mpsc::Receiver<AudioChunk>>,
}

impl AudioSession {
    /// Build a session over an explicit capture backend.
    pub fn new(capture: Box<dyn Capture>) -> Self {
        Self {
            state: SessionState::Idle,
            capture,
            chunks_rx: None,
        }
    }

    /// Build a session over the system default input device.
    pub fn with_default_capture() -> Self {
        Self::new(Box::new(CpalCapture::new()))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `true` iff the session is currently Recording.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Acquire the device and begin buffering audio chunks.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyActive`] when called while Recording, or the
    /// typed [`CaptureError`] (permission vs. device) when the device cannot
    /// be acquired — the session is then in [`SessionState::Failed`].
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.is_active() {
            return Err(SessionError::AlreadyActive);
        }

        let (tx, rx) = mpsc::channel();
        match self.capture.begin(tx) {
            Ok(()) => {
                self.chunks_rx = Some(rx);
                self.state = SessionState::Recording;
                log::debug!("session: recording started");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                log::warn!("session: start failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Finalize the capture and return the assembled WAV payload.
    ///
    /// Stops the stream (releasing the device), drains every buffered chunk,
    /// downmixes to mono and encodes one payload.  Returns `None` when no
    /// session was active — safe to call repeatedly.
    pub fn stop(&mut self) -> Option<Vec<u8>> {
        if !self.is_active() {
            return None;
        }

        // Stop the stream first so the chunk channel closes and the drain
        // below terminates.
        self.capture.end();
        self.state = SessionState::Idle;

        let rx = self.chunks_rx.take()?;
        let mut samples: Vec<f32> = Vec::new();
        let mut sample_rate = 16_000;

        while let Ok(chunk) = rx.try_recv() {
            sample_rate = chunk.sample_rate;
            samples.extend(wav::interleaved_to_mono(&chunk.samples, chunk.channels));
        }

        log::debug!(
            "session: stopped with {} samples @ {sample_rate} Hz",
            samples.len()
        );

        match wav::encode_wav(&samples, sample_rate) {
            Ok(payload) => Some(payload),
            Err(e) => {
                log::error!("session: WAV encoding failed: {e}");
                None
            }
        }
    }
}

impl Drop for AudioSession {
    /// Release the device even when the owner is torn down mid-recording.
    fn drop(&mut self) {
        if self.is_active() {
            self.capture.end();
            log::debug!("session: released on drop");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

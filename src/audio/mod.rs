//! Microphone capture and the recording-session lifecycle.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback (dedicated thread) → AudioChunk (mpsc)
//!           → AudioSession buffers → stop() → downmix → WAV payload
//! ```
//!
//! [`AudioSession`] owns the session state machine (Idle → Recording → Idle,
//! or Failed on a start error).  The device is released on every exit path —
//! stop, error, and drop — so a live microphone indicator can never outlive
//! the session.

pub mod capture;
pub mod session;
pub mod wav;

pub use capture::{AudioChunk, Capture, CaptureError, CpalCapture};
pub use session::{AudioSession, SessionError, SessionState};
pub use wav::{encode_wav, interleaved_to_mono};

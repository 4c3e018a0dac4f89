//! Microphone capture via `cpal`.
//!
//! `cpal::Stream` is not `Send` on every platform, so [`CpalCapture`] builds
//! and owns the stream on a dedicated OS thread.  The handle itself is `Send`
//! and controls the thread over a stop channel; joining the thread drops the
//! stream and releases the device.

use std::sync::mpsc;
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the capture callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Typed start errors, each carrying its user-facing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Microphone permission denied. Please allow microphone access and try again.")]
    PermissionDenied,

    #[error("Failed to start recording. Please check your microphone.")]
    NoDevice,

    #[error("Failed to start recording. Please check your microphone. ({0})")]
    Device(String),
}

impl CaptureError {
    /// Classify a backend error string.  cpal has no dedicated permission
    /// variant; platforms report denied access as a backend-specific error.
    fn from_backend(message: String) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("permission") || lower.contains("denied") {
            CaptureError::PermissionDenied
        } else {
            CaptureError::Device(message)
        }
    }
}

// ---------------------------------------------------------------------------
// Capture trait
// ---------------------------------------------------------------------------

/// Low-level capture device seam under [`AudioSession`](crate::audio::AudioSession).
///
/// `begin` acquires the device and starts streaming [`AudioChunk`]s to `tx`;
/// `end` stops the stream and releases the device.  `end` must be safe to
/// call when no capture is running.
pub trait Capture: Send {
    fn begin(&mut self, tx: mpsc::Sender<AudioChunk>) -> Result<(), CaptureError>;
    fn end(&mut self);
}

// ---------------------------------------------------------------------------
// CpalCapture
// ---------------------------------------------------------------------------

/// Default-input-device capture backed by cpal.
pub struct CpalCapture {
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl CpalCapture {
    pub fn new() -> Self {
        Self {
            stop_tx: None,
            thread: None,
        }
    }

    /// Runs on the dedicated capture thread: build the stream, report the
    /// setup outcome, then block until the stop signal arrives.
    fn run(
        chunk_tx: mpsc::Sender<AudioChunk>,
        setup_tx: mpsc::Sender<Result<(), CaptureError>>,
        stop_rx: mpsc::Receiver<()>,
    ) {
        let host = cpal::default_host();
        let device = match host.default_input_device() {
            Some(d) => d,
            None => {
                let _ = setup_tx.send(Err(CaptureError::NoDevice));
                return;
            }
        };

        let supported = match device.default_input_config() {
            Ok(c) => c,
            Err(e) => {
                let _ = setup_tx.send(Err(CaptureError::from_backend(e.to_string())));
                return;
            }
        };

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let config: cpal::StreamConfig = supported.into();

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Send errors mean the session already stopped draining.
                let _ = chunk_tx.send(AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        );

        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                let _ = setup_tx.send(Err(CaptureError::from_backend(e.to_string())));
                return;
            }
        };

        if let Err(e) = stream.play() {
            let _ = setup_tx.send(Err(CaptureError::from_backend(e.to_string())));
            return;
        }

        let _ = setup_tx.send(Ok(()));
        log::info!("audio capture started ({sample_rate} Hz, {channels} ch)");

        // Blocks until end() sends the stop signal or drops the sender.
        let _ = stop_rx.recv();

        // Dropping the stream here stops the hardware and releases the device.
        drop(stream);
        log::info!("audio capture released");
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl Capture for CpalCapture {
    fn begin(&mut self, tx: mpsc::Sender<AudioChunk>) -> Result<(), CaptureError> {
        let (setup_tx, setup_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("mic-capture".into())
            .spawn(move || Self::run(tx, setup_tx, stop_rx))
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        // Wait for the thread to report whether the stream came up.
        match setup_rx.recv() {
            Ok(Ok(())) => {
                self.stop_tx = Some(stop_tx);
                self.thread = Some(thread);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(CaptureError::Device("capture thread exited early".into()))
            }
        }
    }

    fn end(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.end();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

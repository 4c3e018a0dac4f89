//! The modal controller proper.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::audio::AudioSession;
use crate::remote::Transcribe;

// ---------------------------------------------------------------------------
// ModalPhase
// ---------------------------------------------------------------------------

/// Phases of the transcription surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// Surface not shown.
    Idle,
    /// Microphone active; audio is being buffered.
    Recording,
    /// Recording stopped; the transcription request is in flight.
    Processing,
    /// Torn down — with or without a delivered result.
    Closed,
    /// Transcription failed; the user may retry via [`ModalController::toggle`].
    Failed,
}

// ---------------------------------------------------------------------------
// ModalState
// ---------------------------------------------------------------------------

/// What the rendering layer sees.  Mutated only by the controller's
/// transition methods; read-only to everyone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalState {
    pub is_recording: bool,
    pub is_processing: bool,
    pub status_text: String,
}

impl Default for ModalState {
    fn default() -> Self {
        Self {
            is_recording: false,
            is_processing: false,
            status_text: "Ready to record".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ModalEvent
// ---------------------------------------------------------------------------

/// Events the controller emits to whoever opened it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    /// Transcription finished; `text` is ready to insert.
    Completed { text: String },
    /// Something went wrong; `message` is user-facing.
    Error { message: String },
    /// The surface is gone and the controller is dead.
    Closed,
}

// ---------------------------------------------------------------------------
// ModalController
// ---------------------------------------------------------------------------

/// Drives one recording surface from open to close.
///
/// At most one live controller exists per content context; a duplicate open
/// request must be routed to [`stop_requested`](Self::stop_requested) on the
/// existing instance instead of constructing a second one (the content
/// context enforces this), so two controllers can never contend for the
/// microphone.
pub struct ModalController {
    phase: ModalPhase,
    state: ModalState,
    session: AudioSession,
    transcriber: Arc<dyn Transcribe>,
    events: mpsc::Sender<ModalEvent>,
}

impl ModalController {
    /// Open the surface, auto-starting the recording.
    ///
    /// On a start failure (permission or device) the error and a `Closed`
    /// event are emitted and no controller is returned — the surface is torn
    /// down rather than shown in a broken state.
    pub async fn open(
        mut session: AudioSession,
        transcriber: Arc<dyn Transcribe>,
        events: mpsc::Sender<ModalEvent>,
    ) -> Option<Self> {
        match session.start() {
            Ok(()) => {
                log::debug!("modal: opened, recording");
                Some(Self {
                    phase: ModalPhase::Recording,
                    state: ModalState {
                        is_recording: true,
                        is_processing: false,
                        status_text: "Recording...".into(),
                    },
                    session,
                    transcriber,
                    events,
                })
            }
            Err(e) => {
                log::warn!("modal: failed to start recording: {e}");
                let _ = events
                    .send(ModalEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                let _ = events.send(ModalEvent::Closed).await;
                None
            }
        }
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    /// Read-only view for the rendering layer.
    pub fn state(&self) -> &ModalState {
        &self.state
    }

    /// `true` until the controller reaches `Closed`.
    pub fn is_live(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    /// Stop recording and transcribe the captured audio.
    ///
    /// Only valid while Recording; calls in any other phase (including a
    /// repeat while already Processing) are no-ops, so the transcriber is
    /// invoked at most once per recording session.
    pub async fn stop_requested(&mut self) {
        if self.phase != ModalPhase::Recording {
            log::debug!("modal: stop ignored in phase {:?}", self.phase);
            return;
        }

        self.phase = ModalPhase::Processing;
        self.state.is_recording = false;
        self.state.is_processing = true;
        self.state.status_text = "Processing...".into();

        let Some(payload) = self.session.stop() else {
            // Nothing was captured; tear down without a result.
            self.close().await;
            return;
        };

        match self.transcriber.transcribe(payload).await {
            Ok(text) => {
                self.phase = ModalPhase::Closed;
                self.state.is_processing = false;
                let _ = self.events.send(ModalEvent::Completed { text }).await;
                let _ = self.events.send(ModalEvent::Closed).await;
            }
            Err(e) => {
                log::warn!("modal: transcription failed: {e}");
                self.phase = ModalPhase::Failed;
                self.state.is_processing = false;
                self.state.status_text = "Transcription failed".into();
                let _ = self
                    .events
                    .send(ModalEvent::Error {
                        message: "Failed to transcribe audio. Please try again.".into(),
                    })
                    .await;
            }
        }
    }

    /// Toggle the recording: stop while Recording, restart after a failure.
    pub async fn toggle(&mut self) {
        match self.phase {
            ModalPhase::Recording => self.stop_requested().await,
            ModalPhase::Failed => match self.session.start() {
                Ok(()) => {
                    self.phase = ModalPhase::Recording;
                    self.state.is_recording = true;
                    self.state.status_text = "Recording...".into();
                }
                Err(e) => {
                    let _ = self
                        .events
                        .send(ModalEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
            },
            ModalPhase::Idle | ModalPhase::Processing | ModalPhase::Closed => {}
        }
    }

    /// Close the surface from any state, discarding any buffered audio.
    pub async fn cancel(&mut self) {
        if self.phase == ModalPhase::Closed {
            return;
        }
        // Best-effort release; the payload is dropped.
        let _ = self.session.stop();
        self.close().await;
    }

    async fn close(&mut self) {
        self.phase = ModalPhase::Closed;
        self.state.is_recording = false;
        self.state.is_processing = false;
        let _ = self.events.send(ModalEvent::Closed).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc as std_mpsc, Arc};

    use async_trait::async_trait;

    use super::*;
    use crate::audio::{AudioChunk, Capture, CaptureError};
    use crate::remote::ApiError;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    struct MockCapture {
        fail_with: Option<CaptureError>,
        ends: Arc<AtomicUsize>,
    }

    impl MockCapture {
        fn working() -> (Self, Arc<AtomicUsize>) {
            let ends = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    fail_with: None,
                    ends: Arc::clone(&ends),
                },
                ends,
            )
        }

        fn denied() -> Self {
            Self {
                fail_with: Some(CaptureError::PermissionDenied),
                ends: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Capture for MockCapture {
        fn begin(&mut self, tx: std_mpsc::Sender<AudioChunk>) -> Result<(), CaptureError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let _ = tx.send(AudioChunk {
                samples: vec![0.0; 160],
                sample_rate: 16_000,
                channels: 1,
            });
            Ok(())
        }

        fn end(&mut self) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingTranscriber {
        calls: Arc<AtomicUsize>,
        result: Result<String, u16>,
    }

    impl CountingTranscriber {
        fn ok(text: &str) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    calls: Arc::clone(&calls),
                    result: Ok(text.to_string()),
                }),
                calls,
            )
        }

        fn failing(status: u16) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    calls: Arc::clone(&calls),
                    result: Err(status),
                }),
                calls,
            )
        }
    }

    #[async_trait]
    impl Transcribe for CountingTranscriber {
        async fn transcribe(&self, _audio: Vec<u8>) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ApiError::Status(*status)),
            }
        }
    }

    fn session(capture: MockCapture) -> AudioSession {
        AudioSession::new(Box::new(capture))
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn open_starts_recording() {
        let (capture, _) = MockCapture::working();
        let (transcriber, _) = CountingTranscriber::ok("hi");
        let (tx, _rx) = mpsc::channel(8);

        let modal = ModalController::open(session(capture), transcriber, tx)
            .await
            .expect("controller");

        assert_eq!(modal.phase(), ModalPhase::Recording);
        assert!(modal.state().is_recording);
        assert!(!modal.state().is_processing);
        assert_eq!(modal.state().status_text, "Recording...");
    }

    #[tokio::test]
    async fn permission_denied_open_emits_error_and_closes() {
        let (transcriber, calls) = CountingTranscriber::ok("hi");
        let (tx, mut rx) = mpsc::channel(8);

        let modal = ModalController::open(session(MockCapture::denied()), transcriber, tx).await;
        assert!(modal.is_none());

        match rx.recv().await.expect("error event") {
            ModalEvent::Error { message } => {
                assert!(message.to_lowercase().contains("permission"));
            }
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(rx.recv().await, Some(ModalEvent::Closed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stop_delivers_text_then_closes() {
        let (capture, ends) = MockCapture::working();
        let (transcriber, calls) = CountingTranscriber::ok("hello world");
        let (tx, mut rx) = mpsc::channel(8);

        let mut modal = ModalController::open(session(capture), transcriber, tx)
            .await
            .expect("controller");
        modal.stop_requested().await;

        assert_eq!(modal.phase(), ModalPhase::Closed);
        assert!(!modal.is_live());
        assert_eq!(
            rx.recv().await,
            Some(ModalEvent::Completed {
                text: "hello world".into()
            })
        );
        assert_eq!(rx.recv().await, Some(ModalEvent::Closed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_stop_signals_transcribe_exactly_once() {
        let (capture, _) = MockCapture::working();
        let (transcriber, calls) = CountingTranscriber::ok("once");
        let (tx, _rx) = mpsc::channel(8);

        let mut modal = ModalController::open(session(capture), transcriber, tx)
            .await
            .expect("controller");

        modal.stop_requested().await;
        modal.stop_requested().await;
        modal.stop_requested().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transcription_failure_enters_failed_with_status_text() {
        let (capture, ends) = MockCapture::working();
        let (transcriber, calls) = CountingTranscriber::failing(500);
        let (tx, mut rx) = mpsc::channel(8);

        let mut modal = ModalController::open(session(capture), transcriber, tx)
            .await
            .expect("controller");
        modal.stop_requested().await;

        assert_eq!(modal.phase(), ModalPhase::Failed);
        assert!(!modal.state().is_recording);
        assert!(!modal.state().is_processing);
        assert_eq!(modal.state().status_text, "Transcription failed");
        assert!(matches!(rx.recv().await, Some(ModalEvent::Error { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Device released even though the transcription failed.
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn toggle_restarts_recording_after_failure() {
        let (capture, _) = MockCapture::working();
        let (transcriber, _) = CountingTranscriber::failing(500);
        let (tx, _rx) = mpsc::channel(8);

        let mut modal = ModalController::open(session(capture), transcriber, tx)
            .await
            .expect("controller");
        modal.stop_requested().await;
        assert_eq!(modal.phase(), ModalPhase::Failed);

        modal.toggle().await;
        assert_eq!(modal.phase(), ModalPhase::Recording);
        assert!(modal.state().is_recording);
    }

    #[tokio::test]
    async fn cancel_closes_without_a_result() {
        let (capture, ends) = MockCapture::working();
        let (transcriber, calls) = CountingTranscriber::ok("never delivered");
        let (tx, mut rx) = mpsc::channel(8);

        let mut modal = ModalController::open(session(capture), transcriber, tx)
            .await
            .expect("controller");
        modal.cancel().await;

        assert_eq!(modal.phase(), ModalPhase::Closed);
        assert_eq!(rx.recv().await, Some(ModalEvent::Closed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_twice_is_a_no_op() {
        let (capture, ends) = MockCapture::working();
        let (transcriber, _) = CountingTranscriber::ok("x");
        let (tx, mut rx) = mpsc::channel(8);

        let mut modal = ModalController::open(session(capture), transcriber, tx)
            .await
            .expect("controller");
        modal.cancel().await;
        modal.cancel().await;

        assert_eq!(rx.recv().await, Some(ModalEvent::Closed));
        assert!(rx.try_recv().is_err());
        assert_eq!(ends.load(Ordering::SeqCst), 1);
    }
}

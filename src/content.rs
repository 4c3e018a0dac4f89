//! Content context: the half of the application attached to the page.
//!
//! Owns the [`SelectionCache`], the [`TextMutator`] and (while open) the
//! [`ModalController`].  All remote work happens on the background side; this
//! side only captures selections, replaces text and surfaces errors through
//! the page.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::audio::AudioSession;
use crate::modal::{ModalController, ModalEvent};
use crate::page::HostPage;
use crate::relay::{Endpoint, EndpointHandle, Message};
use crate::remote::{ApiError, Transcribe};
use crate::selection::{ReplacePolicy, SelectionCache, TextMutator};

/// Builds a fresh capture session each time the transcription surface opens.
pub type SessionFactory = Box<dyn Fn() -> AudioSession + Send>;

// ---------------------------------------------------------------------------
// RelayTranscriber
// ---------------------------------------------------------------------------

/// [`Transcribe`] backend that forwards the audio to the background context
/// over the relay and waits for the correlated reply.
struct RelayTranscriber {
    handle: EndpointHandle,
}

#[async_trait]
impl Transcribe for RelayTranscriber {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ApiError> {
        match self
            .handle
            .request(Message::TranscriptionRequest { audio })
            .await
        {
            Ok(Message::TranscriptionResult { text }) => Ok(text),
            Ok(Message::TranscriptionError { error }) => Err(ApiError::Request(error)),
            Ok(other) => Err(ApiError::Parse(format!("unexpected reply: {other:?}"))),
            Err(e) => Err(ApiError::Request(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ContentContext
// ---------------------------------------------------------------------------

/// The content half of the application.
pub struct ContentContext {
    page: Arc<dyn HostPage>,
    handle: EndpointHandle,
    cache: SelectionCache,
    mutator: TextMutator,
    sessions: SessionFactory,
    modal: Option<ModalController>,
    modal_events_tx: mpsc::Sender<ModalEvent>,
    modal_events_rx: Option<mpsc::Receiver<ModalEvent>>,
}

impl ContentContext {
    pub fn new(
        page: Arc<dyn HostPage>,
        handle: EndpointHandle,
        policy: ReplacePolicy,
        sessions: SessionFactory,
    ) -> Self {
        let (modal_events_tx, modal_events_rx) = mpsc::channel(8);
        Self {
            page,
            handle,
            cache: SelectionCache::new(),
            mutator: TextMutator::new(policy),
            sessions,
            modal: None,
            modal_events_tx,
            modal_events_rx: Some(modal_events_rx),
        }
    }

    /// Service loop.  Returns when the relay peer is gone.
    pub async fn run(mut self, mut endpoint: Endpoint) {
        let mut events = self
            .modal_events_rx
            .take()
            .expect("run called more than once");

        loop {
            tokio::select! {
                envelope = endpoint.recv() => {
                    let Some(envelope) = envelope else { break };
                    self.handle_message(envelope.id, envelope.message).await;
                }
                event = events.recv() => {
                    // The context holds a sender, so this channel never closes.
                    if let Some(event) = event {
                        self.handle_modal_event(event).await;
                    }
                }
            }
        }
        log::debug!("content: service loop finished");
    }

    async fn handle_message(&mut self, request_id: u64, message: Message) {
        match message {
            Message::SelectionRequest => {
                let snap = self.cache.capture(self.page.as_ref());
                let _ = self
                    .handle
                    .reply(
                        request_id,
                        Message::SelectionResult {
                            selected_text: snap.selected_text,
                            context_text: snap.context_text,
                            source_type: snap.source_type,
                        },
                    )
                    .await;
            }
            Message::ProofreadResult { proofread_text } => {
                self.replace_cached(&proofread_text);
            }
            Message::ProofreadError { error } => {
                self.page.alert(&format!("Error: {error}"));
            }
            Message::OpenTranscriptionUi => self.toggle_modal().await,
            Message::Unknown => {
                log::debug!("content: ignoring unknown action");
            }
            other => {
                log::debug!("content: ignoring {other:?}");
            }
        }
    }

    async fn handle_modal_event(&mut self, event: ModalEvent) {
        match event {
            ModalEvent::Completed { text } => self.replace_cached(&text),
            ModalEvent::Error { message } => self.page.alert(&message),
            ModalEvent::Closed => {
                self.modal = None;
            }
        }
    }

    /// Consume the cached selection and splice `text` into it.  A missing or
    /// already-consumed cache surfaces the selection-lost message instead.
    fn replace_cached(&mut self, text: &str) {
        let info = self.cache.consume();
        if let Err(e) = self.mutator.replace(self.page.as_ref(), info, text) {
            self.page.alert(&e.to_string());
        }
    }

    /// Open the transcription surface, or drive the existing one: a second
    /// hotkey press while recording is the stop gesture, and a press after a
    /// failure retries the recording.
    async fn toggle_modal(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            if modal.is_live() {
                modal.toggle().await;
                return;
            }
            self.modal = None;
        }

        // Capture before the surface takes focus; the transcription result
        // lands wherever the user's selection or caret was.
        self.cache.capture(self.page.as_ref());

        let transcriber = Arc::new(RelayTranscriber {
            handle: self.handle.clone(),
        });
        self.modal = ModalController::open(
            (self.sessions)(),
            transcriber,
            self.modal_events_tx.clone(),
        )
        .await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

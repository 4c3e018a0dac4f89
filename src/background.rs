//! Background service: hotkey commands in, relay traffic out.
//!
//! The background half owns the remote backends and never touches the page.
//! For proofreading it asks the content half for the current selection,
//! calls the proofreader, and sends the outcome back; for transcription it
//! answers [`Message::TranscriptionRequest`] envelopes in place.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::hotkey::UserCommand;
use crate::relay::{Endpoint, EndpointHandle, Message};
use crate::remote::{Proofread, Transcribe};

/// Shown when the proofread hotkey fires with nothing selected.
const EMPTY_SELECTION_MESSAGE: &str = "Please select some text to proofread";

// ---------------------------------------------------------------------------
// Background
// ---------------------------------------------------------------------------

/// The background half of the application.
pub struct Background {
    handle: EndpointHandle,
    transcriber: Arc<dyn Transcribe>,
    proofreader: Arc<dyn Proofread>,
}

impl Background {
    pub fn new(
        handle: EndpointHandle,
        transcriber: Arc<dyn Transcribe>,
        proofreader: Arc<dyn Proofread>,
    ) -> Self {
        Self {
            handle,
            transcriber,
            proofreader,
        }
    }

    /// Service loop.  Returns when both the command channel and the relay
    /// peer are gone.
    pub async fn run(mut self, mut endpoint: Endpoint, mut commands: mpsc::Receiver<UserCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command).await;
                }
                envelope = endpoint.recv() => {
                    let Some(envelope) = envelope else { break };
                    self.handle_envelope(envelope.id, envelope.message).await;
                }
            }
        }
        log::debug!("background: service loop finished");
    }

    async fn handle_command(&mut self, command: UserCommand) {
        match command {
            UserCommand::ToggleTranscriptionUi => {
                if self.handle.send(Message::OpenTranscriptionUi).await.is_err() {
                    log::warn!("background: content context is gone");
                }
            }
            UserCommand::ProofreadSelection => self.proofread_selection().await,
        }
    }

    /// Full proofread flow: fetch the selection, guard against an empty one,
    /// call the backend, report the outcome.
    async fn proofread_selection(&mut self) {
        let reply = match self.handle.request(Message::SelectionRequest).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("background: selection request failed: {e}");
                return;
            }
        };

        let selected = match reply {
            Message::SelectionResult { selected_text, .. } => selected_text,
            other => {
                log::warn!("background: unexpected selection reply: {other:?}");
                return;
            }
        };

        if selected.trim().is_empty() {
            let _ = self
                .handle
                .send(Message::ProofreadError {
                    error: EMPTY_SELECTION_MESSAGE.into(),
                })
                .await;
            return;
        }

        let outcome = match self.proofreader.proofread(&selected).await {
            Ok(proofread_text) => Message::ProofreadResult { proofread_text },
            Err(e) => {
                log::warn!("background: proofread failed: {e}");
                Message::ProofreadError {
                    error: e.to_string(),
                }
            }
        };
        let _ = self.handle.send(outcome).await;
    }

    async fn handle_envelope(&mut self, request_id: u64, message: Message) {
        match message {
            Message::TranscriptionRequest { audio } => {
                let outcome = match self.transcriber.transcribe(audio).await {
                    Ok(text) => Message::TranscriptionResult { text },
                    Err(e) => {
                        log::warn!("background: transcription failed: {e}");
                        Message::TranscriptionError {
                            error: e.to_string(),
                        }
                    }
                };
                let _ = self.handle.reply(request_id, outcome).await;
            }
            Message::Unknown => {
                log::debug!("background: ignoring unknown action");
            }
            other => {
                log::debug!("background: ignoring {other:?}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

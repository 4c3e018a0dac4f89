//! Message relay between the background and content contexts.
//!
//! A duplex, action-tagged channel: every [`Message`] carries an `action`
//! tag from a fixed vocabulary, and a handler for an unrecognized tag is an
//! explicit no-op ([`Message::Unknown`]), never an error.
//!
//! Each endpoint runs a small router task.  Envelopes with `reply_to` set
//! are matched against the endpoint's [`PendingRequests`] table and consume
//! their one-shot slot on first match; replies with no live slot are
//! discarded there, so a stale result can never reach a handler that has
//! moved on to a newer session.  Everything else is forwarded to
//! [`Endpoint::recv`].

pub mod pending;

pub use pending::PendingRequests;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::selection::SourceType;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Action-tagged relay message.
///
/// Serialized with the tag in an `action` field, kebab-case, matching the
/// cross-context wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Message {
    /// Ask the content context to capture the current selection.
    SelectionRequest,
    /// Captured selection snapshot.
    #[serde(rename_all = "camelCase")]
    SelectionResult {
        selected_text: String,
        context_text: String,
        source_type: SourceType,
    },
    /// Proofreading finished; the content context replaces the selection.
    #[serde(rename_all = "camelCase")]
    ProofreadResult { proofread_text: String },
    /// Proofreading failed; the content context surfaces the error.
    ProofreadError { error: String },
    /// A finished audio payload to transcribe.
    TranscriptionRequest { audio: Vec<u8> },
    /// Transcription finished.
    TranscriptionResult { text: String },
    /// Transcription failed.
    TranscriptionError { error: String },
    /// Open the transcription surface (or stop it when already open).
    OpenTranscriptionUi,
    /// Any unrecognized action tag — handled as an explicit pass-through.
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A message plus its delivery metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Sender-unique id of this envelope.
    pub id: u64,
    /// When set, this envelope answers the request with that id.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reply_to: Option<u64>,
    #[serde(flatten)]
    pub message: Message,
}

// ---------------------------------------------------------------------------
// RelayError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RelayError {
    /// The peer endpoint is gone.
    #[error("relay channel closed")]
    Closed,
    /// The request's reply slot was dropped without an answer.
    #[error("request dropped without a reply")]
    Dropped,
}

// ---------------------------------------------------------------------------
// Endpoint / EndpointHandle
// ---------------------------------------------------------------------------

/// Receiving side of one relay endpoint.
///
/// Obtain send access through [`handle`](Endpoint::handle); handles are
/// cheap to clone and usable from any task.
pub struct Endpoint {
    handle: EndpointHandle,
    incoming: mpsc::Receiver<Envelope>,
}

impl Endpoint {
    /// A cloneable sending handle for this endpoint.
    pub fn handle(&self) -> EndpointHandle {
        self.handle.clone()
    }

    /// Next non-reply envelope addressed to this endpoint.
    ///
    /// Replies never show up here — the router either completes the matching
    /// pending request or discards them as stale.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.incoming.recv().await
    }
}

/// Sending half of a relay endpoint.
#[derive(Clone)]
pub struct EndpointHandle {
    out: mpsc::Sender<Envelope>,
    pending: Arc<PendingRequests>,
    next_id: Arc<AtomicU64>,
}

impl EndpointHandle {
    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Fire-and-forget send.  Returns the envelope id.
    pub async fn send(&self, message: Message) -> Result<u64, RelayError> {
        let id = self.allocate_id();
        self.out
            .send(Envelope {
                id,
                reply_to: None,
                message,
            })
            .await
            .map_err(|_| RelayError::Closed)?;
        Ok(id)
    }

    /// Answer the request carried by envelope id `request_id`.
    pub async fn reply(&self, request_id: u64, message: Message) -> Result<(), RelayError> {
        let id = self.allocate_id();
        self.out
            .send(Envelope {
                id,
                reply_to: Some(request_id),
                message,
            })
            .await
            .map_err(|_| RelayError::Closed)
    }

    /// Send `message` and wait for the single reply correlated to it.
    pub async fn request(&self, message: Message) -> Result<Message, RelayError> {
        let id = self.allocate_id();
        let rx = self.pending.register(id);

        let sent = self
            .out
            .send(Envelope {
                id,
                reply_to: None,
                message,
            })
            .await;

        if sent.is_err() {
            self.pending.cancel(id);
            return Err(RelayError::Closed);
        }

        rx.await.map_err(|_| RelayError::Dropped)
    }
}

// ---------------------------------------------------------------------------
// pair
// ---------------------------------------------------------------------------

/// Build a connected pair of endpoints.
///
/// Spawns one router task per endpoint, so this must be called inside a
/// tokio runtime.
pub fn pair(capacity: usize) -> (Endpoint, Endpoint) {
    let (to_a, from_b) = mpsc::channel::<Envelope>(capacity);
    let (to_b, from_a) = mpsc::channel::<Envelope>(capacity);

    let a = spawn_endpoint(to_b, from_b, capacity);
    let b = spawn_endpoint(to_a, from_a, capacity);
    (a, b)
}

fn spawn_endpoint(
    out: mpsc::Sender<Envelope>,
    router_rx: mpsc::Receiver<Envelope>,
    capacity: usize,
) -> Endpoint {
    let pending = Arc::new(PendingRequests::new());
    let (deliver_tx, incoming) = mpsc::channel(capacity);

    tokio::spawn(route(router_rx, deliver_tx, Arc::clone(&pending)));

    Endpoint {
        handle: EndpointHandle {
            out,
            pending,
            next_id: Arc::new(AtomicU64::new(0)),
        },
        incoming,
    }
}

/// Router loop: replies complete (or get discarded against) the pending
/// table; everything else is forwarded to the endpoint's receiver.
async fn route(
    mut router_rx: mpsc::Receiver<Envelope>,
    deliver: mpsc::Sender<Envelope>,
    pending: Arc<PendingRequests>,
) {
    while let Some(envelope) = router_rx.recv().await {
        if let Some(reply_to) = envelope.reply_to {
            if !pending.complete(reply_to, envelope.message) {
                log::debug!("relay: discarded stale reply to request {reply_to}");
            }
            continue;
        }

        if deliver.send(envelope).await.is_err() {
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- wire format ---

    #[test]
    fn tags_serialize_kebab_case() {
        let json = serde_json::to_value(&Message::SelectionRequest).unwrap();
        assert_eq!(json["action"], "selection-request");

        let json = serde_json::to_value(&Message::OpenTranscriptionUi).unwrap();
        assert_eq!(json["action"], "open-transcription-ui");

        let json = serde_json::to_value(&Message::TranscriptionError {
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["action"], "transcription-error");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn payload_fields_serialize_camel_case() {
        let json = serde_json::to_value(&Message::ProofreadResult {
            proofread_text: "hello world".into(),
        })
        .unwrap();
        assert_eq!(json["action"], "proofread-result");
        assert_eq!(json["proofreadText"], "hello world");

        let json = serde_json::to_value(&Message::SelectionResult {
            selected_text: "helo".into(),
            context_text: "helo wrld".into(),
            source_type: crate::selection::SourceType::EditableField,
        })
        .unwrap();
        assert_eq!(json["selectedText"], "helo");
        assert_eq!(json["contextText"], "helo wrld");
    }

    #[test]
    fn unrecognized_tag_deserializes_to_unknown() {
        let msg: Message =
            serde_json::from_str(r#"{ "action": "future-feature", "x": 1 }"#).unwrap();
        assert_eq!(msg, Message::Unknown);
    }

    #[test]
    fn envelope_round_trips_with_flattened_message() {
        let env = Envelope {
            id: 5,
            reply_to: Some(3),
            message: Message::TranscriptionResult { text: "hi".into() },
        };
        let json = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 5);
        assert_eq!(back.reply_to, Some(3));
        assert_eq!(back.message, env.message);
    }

    // ---- routing ---

    #[tokio::test]
    async fn send_is_delivered_to_the_peer() {
        let (a, mut b) = pair(8);
        a.handle().send(Message::SelectionRequest).await.unwrap();

        let env = b.recv().await.expect("envelope");
        assert_eq!(env.message, Message::SelectionRequest);
        assert!(env.reply_to.is_none());
    }

    #[tokio::test]
    async fn request_receives_the_correlated_reply() {
        let (a, mut b) = pair(8);
        let b_handle = b.handle();

        tokio::spawn(async move {
            let env = b.recv().await.expect("request");
            b_handle
                .reply(env.id, Message::TranscriptionResult { text: "ok".into() })
                .await
                .unwrap();
        });

        let reply = a
            .handle()
            .request(Message::TranscriptionRequest { audio: vec![1, 2] })
            .await
            .unwrap();
        assert_eq!(reply, Message::TranscriptionResult { text: "ok".into() });
    }

    #[tokio::test]
    async fn stale_reply_is_discarded_not_delivered() {
        let (mut a, b) = pair(8);
        let b_handle = b.handle();

        // Reply to a request nobody has outstanding.
        b_handle
            .reply(999, Message::TranscriptionResult { text: "late".into() })
            .await
            .unwrap();
        // A normal message afterwards must still come through, proving the
        // stale reply was dropped rather than queued.
        b_handle.send(Message::OpenTranscriptionUi).await.unwrap();

        let env = a.recv().await.expect("envelope");
        assert_eq!(env.message, Message::OpenTranscriptionUi);
    }

    #[tokio::test]
    async fn second_reply_to_same_request_is_dropped() {
        let (a, mut b) = pair(8);
        let b_handle = b.handle();

        tokio::spawn(async move {
            let env = b.recv().await.expect("request");
            b_handle
                .reply(env.id, Message::TranscriptionResult { text: "first".into() })
                .await
                .unwrap();
            b_handle
                .reply(env.id, Message::TranscriptionResult { text: "second".into() })
                .await
                .unwrap();
            // Follow with a normal message so the test can observe that the
            // duplicate reply did not surface anywhere.
            b_handle.send(Message::OpenTranscriptionUi).await.unwrap();
        });

        let mut a = a;
        let reply = a
            .handle()
            .request(Message::TranscriptionRequest { audio: vec![] })
            .await
            .unwrap();
        assert_eq!(
            reply,
            Message::TranscriptionResult { text: "first".into() }
        );

        let env = a.recv().await.expect("follow-up");
        assert_eq!(env.message, Message::OpenTranscriptionUi);
    }
}

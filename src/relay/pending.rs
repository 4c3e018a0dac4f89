//! One-shot request/response correlation.
//!
//! Every outstanding [`request`](crate::relay::EndpointHandle::request) owns
//! exactly one slot here, keyed by its message id.  A reply consumes the slot
//! on first match; a reply arriving with no live slot is stale by definition
//! and gets discarded by the router instead of reaching a handler.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::oneshot;

use super::Message;

/// Reply slots for in-flight requests.
#[derive(Debug, Default)]
pub struct PendingRequests {
    slots: Mutex<HashMap<u64, oneshot::Sender<Message>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slot for request `id` and return the receiving half.
    pub fn register(&self, id: u64) -> oneshot::Receiver<Message> {
        let (tx, rx) = oneshot::channel();
        self.slots.lock().unwrap().insert(id, tx);
        rx
    }

    /// Deliver `message` to the slot for `id`, consuming the slot.
    ///
    /// Returns `false` when no live slot exists (never registered, already
    /// answered, or the requester gave up) — the caller discards the message.
    pub fn complete(&self, id: u64, message: Message) -> bool {
        match self.slots.lock().unwrap().remove(&id) {
            Some(tx) => tx.send(message).is_ok(),
            None => false,
        }
    }

    /// Drop the slot for `id`, if any (request abandoned before send).
    pub fn cancel(&self, id: u64) {
        self.slots.lock().unwrap().remove(&id);
    }

    /// Number of in-flight requests.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

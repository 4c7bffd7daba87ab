//! Page-side endpoint of the bridge.
//!
//! Requests are correlated by generated message ids; the caller picks the
//! timeout and a miss degrades to `None`, because everything the page asks
//! the background for (config, version, counts) is best-effort.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::protocol::{self, Action, Envelope, Origin};

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<serde_json::Value>>>>;

pub struct PageClient {
    outbound: mpsc::UnboundedSender<Envelope>,
    pending: PendingMap,
    /// Background → page pushes, handed to whoever owns the loader.
    push_tx: mpsc::UnboundedSender<Action>,
}

impl PageClient {
    /// Build a client sending into `outbound` (the relay's page receiver).
    /// Returns the client plus the receiver for relayed pushes.
    pub fn new(
        outbound: mpsc::UnboundedSender<Envelope>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Action>) {
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let client = Arc::new(Self {
            outbound,
            pending: Arc::new(Mutex::new(HashMap::new())),
            push_tx,
        });
        (client, push_rx)
    }

    /// Spawn the dispatch loop draining envelopes the relay sends back.
    pub fn spawn_dispatch(
        self: &Arc<Self>,
        mut inbound: mpsc::UnboundedReceiver<Envelope>,
    ) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(envelope) = inbound.recv().await {
                client.dispatch(envelope);
            }
            log::debug!("page dispatch loop ended");
        })
    }

    fn dispatch(&self, envelope: Envelope) {
        if envelope.from != Origin::Extension {
            return;
        }
        if let (Some(id), Some(response)) = (&envelope.id, envelope.response) {
            let waiter = self.pending.lock().expect("pending map poisoned").remove(id);
            match waiter {
                Some(tx) => {
                    let _ = tx.send(response);
                }
                None => log::debug!("response for unknown id {id} dropped"),
            }
            return;
        }
        if let Some(action) = envelope.message {
            if self.push_tx.send(action).is_err() {
                log::debug!("push receiver is gone");
            }
        }
    }

    /// Send a request and await its correlated response.
    ///
    /// `None` on timeout or when the bridge is down; the pending entry is
    /// cleaned up either way.
    pub async fn request(&self, action: Action, timeout: Duration) -> Option<serde_json::Value> {
        let id = protocol::next_message_id();
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("pending map poisoned")
            .insert(id.clone(), tx);

        if self.outbound.send(Envelope::request(id.clone(), action)).is_err() {
            log::warn!("bridge is down, request {id} not sent");
            self.pending.lock().expect("pending map poisoned").remove(&id);
            return None;
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Some(response),
            Ok(Err(_)) => None,
            Err(_) => {
                log::debug!("request {id} timed out");
                self.pending.lock().expect("pending map poisoned").remove(&id);
                None
            }
        }
    }
}

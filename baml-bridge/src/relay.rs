//! Content-script analog: the sole two-way relay between the page and the
//! extension background.
//!
//! Page → background traffic is restricted to the fixed request-action set;
//! everything else is dropped where the original injector would simply not
//! have a handler. Responses are tagged with the originating id. Background
//! → page pushes pass through when they are in the push set. The relay adds
//! no timeouts of its own; the page-side caller owns those.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::background::BackgroundService;
use crate::protocol::{Envelope, Origin};

pub struct ContentRelay {
    background: Arc<BackgroundService>,
    /// Envelopes arriving from the page side.
    page_rx: mpsc::UnboundedReceiver<Envelope>,
    /// Envelopes delivered to the page side.
    page_tx: mpsc::UnboundedSender<Envelope>,
    /// Pushes queued by the background service.
    push_rx: mpsc::UnboundedReceiver<Envelope>,
}

impl ContentRelay {
    pub fn new(
        background: Arc<BackgroundService>,
        page_rx: mpsc::UnboundedReceiver<Envelope>,
        page_tx: mpsc::UnboundedSender<Envelope>,
        push_rx: mpsc::UnboundedReceiver<Envelope>,
    ) -> Self {
        Self {
            background,
            page_rx,
            page_tx,
            push_rx,
        }
    }

    /// Run the relay until both sides hang up.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                envelope = self.page_rx.recv() => {
                    match envelope {
                        Some(envelope) => self.relay_from_page(envelope).await,
                        None => break,
                    }
                }
                push = self.push_rx.recv() => {
                    match push {
                        Some(push) => self.relay_from_background(push),
                        None => break,
                    }
                }
            }
        }
        log::debug!("content relay shutting down");
    }

    /// Spawn the relay onto the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn relay_from_page(&self, envelope: Envelope) {
        if envelope.from != Origin::Client {
            return;
        }
        let (Some(id), Some(action)) = (envelope.id, envelope.message) else {
            return;
        };
        if !action.relayed_to_background() {
            log::debug!("dropping non-relayed page action {:?}", action.name());
            return;
        }
        let response = self.background.handle(action).await;
        if self.page_tx.send(Envelope::response(id, response)).is_err() {
            log::debug!("page side is gone, response dropped");
        }
    }

    fn relay_from_background(&self, envelope: Envelope) {
        let relayable = envelope
            .message
            .as_ref()
            .is_some_and(|action| action.relayed_to_page());
        if !relayable {
            return;
        }
        if self.page_tx.send(envelope).is_err() {
            log::debug!("page side is gone, push dropped");
        }
    }
}

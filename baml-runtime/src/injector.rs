//! Page bootstrap — the content-injector analog.
//!
//! Wires the bridge (background service, relay, page client), then builds
//! the page environment in the original injection order: coordination
//! first, then the loader, then the sandbox utilities, then custom
//! battles. Later stages and the mods themselves assume coordination
//! exists, so readiness is only resolved once that surface is verified.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use baml_bridge::{BackgroundService, ContentRelay, Envelope, PageClient};
use baml_core::source::ModSource;
use baml_core::storage::Storage;
use baml_core::debug;
use baml_lua::bindings;
use baml_lua::ScriptEngine;

use crate::loader::Loader;
use crate::readiness::Readiness;

/// Everything a bootstrapped page holds onto.
pub struct PageRuntime {
    pub engine: Arc<ScriptEngine>,
    pub loader: Arc<Loader>,
    pub client: Arc<PageClient>,
    pub background: Arc<BackgroundService>,
    push_pump: JoinHandle<()>,
}

impl PageRuntime {
    /// Stop the background push pump. The relay and dispatch tasks end on
    /// their own once the channels drop.
    pub fn shutdown(self) {
        self.push_pump.abort();
    }
}

/// Bootstrap the full page runtime.
///
/// `pack_dir` is where file mods resolve from; `None` leaves the loader
/// without a source, so `init` discovers nothing until one is supplied.
pub async fn bootstrap(storage: Storage, pack_dir: Option<&Path>) -> anyhow::Result<PageRuntime> {
    debug::apply_from_storage(&storage);

    // Bridge plumbing: background <- relay -> page client.
    let (background, push_rx) = BackgroundService::new(storage);
    let (page_out_tx, page_out_rx) = mpsc::unbounded_channel::<Envelope>();
    let (page_in_tx, page_in_rx) = mpsc::unbounded_channel::<Envelope>();
    ContentRelay::new(Arc::clone(&background), page_out_rx, page_in_tx, push_rx).spawn();
    let (client, mut pushes) = PageClient::new(page_out_tx);
    client.spawn_dispatch(page_in_rx);

    // Page environment, in injection order.
    let engine = Arc::new(ScriptEngine::new()?);
    let readiness = Arc::new(Readiness::new());

    bindings::coordination::register(engine.lua(), engine.api())?;

    let loader = Arc::new(Loader::new(
        Arc::clone(&engine),
        Arc::clone(&client),
        Arc::clone(&readiness),
    ));
    if let Some(dir) = pack_dir {
        loader.set_source(ModSource::new(dir)).await;
    }

    bindings::log::register(engine.lua(), engine.api())?;
    bindings::events::register(engine.lua(), engine.api())?;
    bindings::battles::register(engine.lua(), engine.api())?;

    if !engine.coordination_ready() {
        anyhow::bail!("coordination surface missing after bootstrap");
    }
    readiness.resolve();

    // Deliver background pushes to the loader for as long as the page lives.
    let push_pump = {
        let loader = Arc::clone(&loader);
        tokio::spawn(async move {
            while let Some(action) = pushes.recv().await {
                loader.handle_push(action).await;
            }
        })
    };

    log::info!("page runtime ready");
    Ok(PageRuntime {
        engine,
        loader,
        client,
        background,
        push_pump,
    })
}

//! Extension-side service: answers request actions out of persisted
//! storage and pushes state changes back toward the page.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use baml_core::descriptor::ModDescriptor;
use baml_core::registry::{self, Category};
use baml_core::storage::Storage;
use baml_core::debug;

use crate::protocol::{Action, Envelope};

/// Storage-backed handler for every bridge action.
pub struct BackgroundService {
    storage: Mutex<Storage>,
    /// Most recent mod list the page registered with us.
    registered: Mutex<Vec<ModDescriptor>>,
    /// Pushes toward the page, consumed by the relay.
    push_tx: mpsc::UnboundedSender<Envelope>,
}

impl BackgroundService {
    /// Create the service plus the receiver the relay drains pushes from.
    pub fn new(storage: Storage) -> (Arc<Self>, mpsc::UnboundedReceiver<Envelope>) {
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let service = Arc::new(Self {
            storage: Mutex::new(storage),
            registered: Mutex::new(Vec::new()),
            push_tx,
        });
        (service, push_rx)
    }

    /// Handle one request action and produce its response payload.
    ///
    /// Never fails: storage problems degrade to defaults and are reported in
    /// the payload, since the page side treats the bridge as best-effort.
    pub async fn handle(&self, action: Action) -> serde_json::Value {
        match action {
            Action::RegisterLocalMods { mods } => {
                // Persisted per-mod enabled overrides win over the catalog
                // defaults the page discovered with.
                let overrides = self.storage.lock().await.mod_state();
                let mods: Vec<ModDescriptor> = mods
                    .into_iter()
                    .map(|mut descriptor| {
                        if let Some(&enabled) = overrides.get(&descriptor.name) {
                            descriptor.enabled = enabled;
                        }
                        descriptor
                    })
                    .collect();
                log::debug!("page registered {} local mods", mods.len());
                let response = serde_json::json!({ "success": true, "mods": &mods });
                *self.registered.lock().await = mods;
                response
            }
            Action::GetLocalModConfig { hash } => self.storage.lock().await.mod_config(&hash),
            Action::GetVersion => {
                serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })
            }
            Action::GetModCounts => {
                let registered = self.registered.lock().await;
                serde_json::to_value(mod_counts(&registered)).unwrap_or_default()
            }
            Action::GetLocalMods => {
                let registered = self.registered.lock().await;
                serde_json::to_value(&*registered).unwrap_or_default()
            }
            Action::GetManualMods => {
                let storage = self.storage.lock().await;
                serde_json::to_value(storage.manual_mods()).unwrap_or_default()
            }
            Action::Ping => serde_json::json!({ "pong": true }),
            Action::OpenDashboard => {
                // The dashboard UI is out of scope here; acknowledge so the
                // page-side button does not hang.
                log::info!("dashboard open requested");
                serde_json::json!({ "success": true })
            }
            Action::UpdateLocalModState { name, enabled } => {
                let result = self
                    .storage
                    .lock()
                    .await
                    .set_mod_enabled(&name, enabled);
                if let Err(err) = result {
                    log::error!("failed to persist mod state for {name}: {err}");
                    return serde_json::json!({ "success": false });
                }
                self.push(Action::UpdateLocalModState { name, enabled });
                serde_json::json!({ "success": true })
            }
            Action::UpdateDebugMode { enabled } => {
                let result = self.storage.lock().await.set_debug_enabled(enabled);
                if let Err(err) = result {
                    log::error!("failed to persist debug flag: {err}");
                    return serde_json::json!({ "success": false });
                }
                debug::apply_debug_level(enabled);
                self.push(Action::UpdateDebugMode { enabled });
                serde_json::json!({ "success": true })
            }
            Action::ExecuteLocalMod { name, force } => {
                // Execution happens on the page side; the background only
                // relays the instruction.
                self.push(Action::ExecuteLocalMod { name, force });
                serde_json::json!({ "success": true })
            }
        }
    }

    /// Queue a push toward the page.
    pub fn push(&self, action: Action) {
        if self.push_tx.send(Envelope::push(action)).is_err() {
            log::debug!("push dropped, relay is gone");
        }
    }

    /// Store a per-mod config blob. Used by the dashboard side and tests.
    pub async fn set_mod_config(
        &self,
        hash: &str,
        config: &serde_json::Value,
    ) -> anyhow::Result<()> {
        self.storage.lock().await.set_mod_config(hash, config)?;
        Ok(())
    }
}

/// Mod counts per category, over the page-registered list.
fn mod_counts(mods: &[ModDescriptor]) -> HashMap<&'static str, usize> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for descriptor in mods {
        let category = registry::category_of(&descriptor.name);
        let label = match category {
            Category::Unknown => "user",
            other => other.label(),
        };
        *counts.entry(label).or_default() += 1;
    }
    counts.insert("total", mods.len());
    counts
}

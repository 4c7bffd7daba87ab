//! The local-mods loader.
//!
//! Owns the effective mod list and the executed-mod records; all mutation
//! goes through the methods here. Lifecycle:
//!
//! - `init` assembles the list once (catalog discovery plus the user's
//!   manual mods fetched over the bridge) and registers it with the
//!   background; repeat and concurrent calls observe the same result.
//! - `execute` runs a single mod at most once unless forced, with soft
//!   `None` outcomes for unknown, disabled, and unfetchable mods.
//! - `execute_in_order` runs a batch strictly sequentially so mods that
//!   assume earlier mods' side effects see them.
//! - `reconcile` applies a pushed mod list and auto-executes exactly the
//!   newly-enabled delta.
//! - `reload` drops everything back to the uninitialized state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use baml_bridge::protocol::Action;
use baml_bridge::PageClient;
use baml_core::descriptor::{ExecutedMod, ManualMod, ModDescriptor, ModKind};
use baml_core::registry::{self, Category};
use baml_core::source::ModSource;
use baml_core::storage::mod_hash;
use baml_core::debug;
use baml_lua::{ScriptContext, ScriptEngine};

use crate::readiness::{Readiness, HOST_READY_TIMEOUT};

/// How long `init` waits for bridge answers (manual mods, registration).
const BRIDGE_TIMEOUT: Duration = Duration::from_secs(2);
/// Config fetches are best-effort; execution proceeds on a miss.
const CONFIG_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoaderState {
    Idle,
    Ready,
}

struct LoaderInner {
    state: LoaderState,
    source: ModSource,
    mods: Vec<ModDescriptor>,
    executed: HashMap<String, Arc<ExecutedMod>>,
}

/// Outcome of one entry in a batch execution.
#[derive(Debug)]
pub struct BatchOutcome {
    pub name: String,
    pub success: bool,
    pub record: Option<Arc<ExecutedMod>>,
    pub error: Option<String>,
}

pub struct Loader {
    engine: Arc<ScriptEngine>,
    client: Arc<PageClient>,
    readiness: Arc<Readiness>,
    ready_timeout: Duration,
    inner: Mutex<LoaderInner>,
}

impl Loader {
    pub fn new(
        engine: Arc<ScriptEngine>,
        client: Arc<PageClient>,
        readiness: Arc<Readiness>,
    ) -> Self {
        Self {
            engine,
            client,
            readiness,
            ready_timeout: HOST_READY_TIMEOUT,
            inner: Mutex::new(LoaderInner {
                state: LoaderState::Idle,
                source: ModSource::unresolved(),
                mods: Vec::new(),
                executed: HashMap::new(),
            }),
        }
    }

    /// Shorten the host-readiness wait. Test hook.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Supply the pack location file mods resolve against. The injector
    /// calls this once it knows where the pack lives.
    pub async fn set_source(&self, source: ModSource) {
        self.inner.lock().await.source = source;
    }

    /// Snapshot of the current effective mod list.
    pub async fn mods(&self) -> Vec<ModDescriptor> {
        self.inner.lock().await.mods.clone()
    }

    /// Assemble the effective mod list. Idempotent: after the first
    /// completion every later call returns the same cached list until
    /// [`reload`](Self::reload).
    ///
    /// The list is built into a local and committed under a short re-lock,
    /// so concurrent `execute`/`mods` callers are not stalled behind the
    /// bridge round-trips. If two inits race, the first commit wins and the
    /// loser returns the committed list.
    pub async fn init(&self) -> Vec<ModDescriptor> {
        let source = {
            let inner = self.inner.lock().await;
            if inner.state == LoaderState::Ready {
                return inner.mods.clone();
            }
            // Without a pack location there is nothing to discover. Stay
            // Idle so a later init can succeed once the injector supplies it.
            if inner.source.base().is_none() {
                log::warn!("mod pack location unknown, skipping discovery");
                return Vec::new();
            }
            inner.source.clone()
        };

        let mut mods = Vec::new();
        for path in registry::candidate_paths() {
            if !source.probe(&path) {
                continue;
            }
            let category = registry::category_of(&path);
            let enabled = registry::is_default_enabled(&path)
                || matches!(category, Category::Super | Category::Database);
            mods.push(ModDescriptor::file(path, enabled));
        }
        log::info!("discovered {} file mods", mods.len());

        for manual in self.fetch_manual_mods().await {
            mods.push(ModDescriptor::manual(&manual));
        }

        // Registration doubles as the state sync: the background applies
        // the user's persisted enabled overrides and returns the effective
        // list. A miss keeps the catalog defaults.
        let response = self
            .client
            .request(Action::RegisterLocalMods { mods: mods.clone() }, BRIDGE_TIMEOUT)
            .await;
        if let Some(adjusted) = response.as_ref().and_then(|r| r.get("mods")) {
            match serde_json::from_value::<Vec<ModDescriptor>>(adjusted.clone()) {
                Ok(adjusted) => mods = adjusted,
                Err(err) => log::warn!("registration response malformed: {err}"),
            }
        } else {
            log::warn!("mod registration unanswered, keeping catalog defaults");
        }

        let mut inner = self.inner.lock().await;
        if inner.state == LoaderState::Ready {
            return inner.mods.clone();
        }
        inner.mods = mods.clone();
        inner.state = LoaderState::Ready;
        mods
    }

    /// Drop the mod list, executed records, and cached init state. The
    /// `reloadLocalMods` event handler.
    pub async fn reload(&self) {
        let mut inner = self.inner.lock().await;
        inner.mods.clear();
        inner.executed.clear();
        inner.state = LoaderState::Idle;
        log::info!("loader reloaded, state cleared");
    }

    /// Execute a single mod.
    ///
    /// Soft `None` outcomes: unknown name, disabled and unforced, content
    /// unavailable, host surface never became ready. A script evaluation
    /// failure is a real error and propagates.
    pub async fn execute(
        &self,
        name: &str,
        force: bool,
    ) -> anyhow::Result<Option<Arc<ExecutedMod>>> {
        let descriptor = {
            let inner = self.inner.lock().await;
            if !force {
                if let Some(record) = inner.executed.get(name) {
                    return Ok(Some(Arc::clone(record)));
                }
            }
            let Some(descriptor) = inner.mods.iter().find(|m| m.name == name) else {
                log::error!("unknown mod requested: {name}");
                return Ok(None);
            };
            if !descriptor.enabled && !force {
                log::debug!("mod {name} is disabled, not executing");
                return Ok(None);
            }
            descriptor.clone()
        };

        let content = match self.resolve_content(&descriptor).await {
            Some(content) => content,
            None => return Ok(None),
        };

        if !self.readiness.wait(self.ready_timeout).await {
            log::warn!("host surface never became ready, abandoning {name}");
            return Ok(None);
        }

        let hash = mod_hash(name);
        let config = self
            .client
            .request(
                Action::GetLocalModConfig { hash: hash.clone() },
                CONFIG_TIMEOUT,
            )
            .await
            .unwrap_or(serde_json::Value::Null);

        let context = ScriptContext::new(hash.clone(), config.clone());
        let exports = self.engine.execute(name, &content, &context)?;

        let record = Arc::new(ExecutedMod {
            name: name.to_string(),
            exports,
            hash,
            config,
        });
        self.inner
            .lock()
            .await
            .executed
            .insert(name.to_string(), Arc::clone(&record));
        log::debug!("executed mod {name}");
        Ok(Some(record))
    }

    /// Execute the given mods strictly in order. A failing mod is recorded
    /// and the batch continues.
    pub async fn execute_in_order(&self, names: &[String], force: bool) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            match self.execute(name, force).await {
                Ok(record) => outcomes.push(BatchOutcome {
                    name: name.clone(),
                    success: record.is_some(),
                    record,
                    error: None,
                }),
                Err(err) => {
                    log::error!("mod {name} failed: {err:#}");
                    outcomes.push(BatchOutcome {
                        name: name.clone(),
                        success: false,
                        record: None,
                        error: Some(format!("{err:#}")),
                    });
                }
            }
        }
        outcomes
    }

    /// Apply a pushed mod list and auto-execute the newly-enabled delta:
    /// mods enabled now that either were not enabled before or have no
    /// executed record yet. Everything else is left alone.
    pub async fn reconcile(&self, new_mods: Vec<ModDescriptor>) -> Vec<BatchOutcome> {
        let delta: Vec<String> = {
            let mut inner = self.inner.lock().await;
            let previously_enabled: std::collections::HashSet<String> = inner
                .mods
                .iter()
                .filter(|m| m.enabled)
                .map(|m| m.name.clone())
                .collect();
            let delta = new_mods
                .iter()
                .filter(|m| {
                    m.enabled
                        && (!previously_enabled.contains(&m.name)
                            || !inner.executed.contains_key(&m.name))
                })
                .map(|m| m.name.clone())
                .collect();
            inner.mods = new_mods;
            inner.state = LoaderState::Ready;
            delta
        };
        if delta.is_empty() {
            return Vec::new();
        }
        log::info!("reconcile: auto-executing {} newly enabled mods", delta.len());
        self.execute_in_order(&delta, false).await
    }

    /// Flip a mod's enabled flag in the live list.
    pub async fn set_enabled(&self, name: &str, enabled: bool) {
        let mut inner = self.inner.lock().await;
        match inner.mods.iter_mut().find(|m| m.name == name) {
            Some(descriptor) => descriptor.enabled = enabled,
            None => log::warn!("state update for unknown mod {name}"),
        }
    }

    /// Dispatch one background → page push.
    pub async fn handle_push(&self, action: Action) {
        match action {
            Action::ExecuteLocalMod { name, force } => {
                if let Err(err) = self.execute(&name, force).await {
                    log::error!("pushed execution of {name} failed: {err:#}");
                }
            }
            Action::UpdateLocalModState { name, enabled } => {
                self.set_enabled(&name, enabled).await;
            }
            Action::UpdateDebugMode { enabled } => {
                debug::apply_debug_level(enabled);
            }
            other => {
                log::debug!("ignoring push {:?}", other.name());
            }
        }
    }

    async fn resolve_content(&self, descriptor: &ModDescriptor) -> Option<String> {
        match descriptor.kind {
            ModKind::Manual => match &descriptor.content {
                Some(content) => Some(content.clone()),
                None => {
                    log::error!("manual mod {} has no stored content", descriptor.name);
                    None
                }
            },
            ModKind::File => {
                let source = self.inner.lock().await.source.clone();
                match source.fetch(&descriptor.name) {
                    Ok(content) => Some(content),
                    Err(err) => {
                        log::error!("failed to fetch {}: {err}", descriptor.name);
                        None
                    }
                }
            }
        }
    }

    async fn fetch_manual_mods(&self) -> Vec<ManualMod> {
        let response = self
            .client
            .request(Action::GetManualMods, BRIDGE_TIMEOUT)
            .await;
        let Some(response) = response else {
            log::warn!("manual mods unavailable, continuing without them");
            return Vec::new();
        };
        match serde_json::from_value(response) {
            Ok(mods) => mods,
            Err(err) => {
                log::warn!("manual mods payload malformed: {err}");
                Vec::new()
            }
        }
    }
}

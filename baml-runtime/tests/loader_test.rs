// Loader behavior tests: execution guards, ordering, reload, reconcile
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use baml_core::descriptor::{ManualMod, ModDescriptor};
use baml_core::source::ModSource;
use baml_core::storage::Storage;
use baml_lua::{ScriptContext, ScriptEngine};
use baml_runtime::{bootstrap, PageRuntime, Readiness};

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn scratch_dir(label: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "baml-loader-test-{}-{label}-{n}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_mod(pack: &PathBuf, path: &str, body: &str) {
    let full = pack.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, body).unwrap();
}

/// Pack with one counting super mod, one allowlisted official mod, and one
/// official mod that stays disabled.
fn standard_pack(label: &str) -> PathBuf {
    let pack = scratch_dir(label);
    write_mod(
        &pack,
        "Super Mods/Autoseller.js",
        "_G.autoseller_runs = (_G.autoseller_runs or 0) + 1\n\
         context.exports = { runs = _G.autoseller_runs }",
    );
    write_mod(&pack, "Official Mods/Turbo Mode.js", "_G.turbo = true");
    write_mod(
        &pack,
        "Official Mods/Board Analyzer.js",
        "_G.analyzer = true",
    );
    pack
}

async fn page(label: &str) -> PageRuntime {
    let pack = standard_pack(label);
    let storage = Storage::open(scratch_dir(label).join("storage.json")).unwrap();
    bootstrap(storage, Some(pack.as_path())).await.unwrap()
}

fn probe(engine: &ScriptEngine, expr: &str) -> serde_json::Value {
    let ctx = ScriptContext::new("probe", serde_json::Value::Null);
    let exports = engine
        .execute("probe", &format!("context.exports = {{ value = {expr} }}"), &ctx)
        .unwrap();
    exports["value"].clone()
}

#[tokio::test]
async fn unknown_mod_returns_none_without_panicking() {
    let runtime = page("unknown").await;
    runtime.loader.init().await;
    let result = runtime.loader.execute("Super Mods/Nope.js", false).await;
    assert!(result.unwrap().is_none());
}

#[tokio::test]
async fn disabled_mod_is_a_noop_unless_forced() {
    let runtime = page("disabled").await;
    runtime.loader.init().await;

    let soft = runtime
        .loader
        .execute("Official Mods/Board Analyzer.js", false)
        .await
        .unwrap();
    assert!(soft.is_none());
    assert!(probe(&runtime.engine, "_G.analyzer").is_null());

    let forced = runtime
        .loader
        .execute("Official Mods/Board Analyzer.js", true)
        .await
        .unwrap();
    assert!(forced.is_some());
    assert_eq!(probe(&runtime.engine, "_G.analyzer"), true);
}

#[tokio::test]
async fn repeat_execution_returns_the_cached_record() {
    let runtime = page("cached").await;
    runtime.loader.init().await;

    let first = runtime
        .loader
        .execute("Super Mods/Autoseller.js", false)
        .await
        .unwrap()
        .unwrap();
    let second = runtime
        .loader
        .execute("Super Mods/Autoseller.js", false)
        .await
        .unwrap()
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(probe(&runtime.engine, "_G.autoseller_runs"), 1);

    let forced = runtime
        .loader
        .execute("Super Mods/Autoseller.js", true)
        .await
        .unwrap()
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &forced));
    assert_eq!(probe(&runtime.engine, "_G.autoseller_runs"), 2);
}

#[tokio::test]
async fn batch_runs_in_array_order_and_survives_failures() {
    let pack = scratch_dir("batch");
    for name in ["Autoseller", "Autoscroller", "Cauldron_Upgrade"] {
        write_mod(
            &pack,
            &format!("Super Mods/{name}.js"),
            &format!(
                "_G.order_log = _G.order_log or {{}}\n\
                 table.insert(_G.order_log, '{name}')"
            ),
        );
    }
    write_mod(&pack, "Super Mods/Cyclopedia.js", "error('broken mod')");

    let storage = Storage::open(scratch_dir("batch").join("storage.json")).unwrap();
    let runtime = bootstrap(storage, Some(pack.as_path())).await.unwrap();
    runtime.loader.init().await;

    let names: Vec<String> = [
        "Super Mods/Autoseller.js",
        "Super Mods/Cyclopedia.js",
        "Super Mods/Autoscroller.js",
        "Super Mods/Cauldron_Upgrade.js",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    let outcomes = runtime.loader.execute_in_order(&names, false).await;

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert!(outcomes[1].error.as_deref().unwrap().contains("broken mod"));
    assert!(outcomes[2].success);
    assert!(outcomes[3].success);

    let log = probe(&runtime.engine, "table.concat(_G.order_log, ',')");
    assert_eq!(log, "Autoseller,Autoscroller,Cauldron_Upgrade");
}

#[tokio::test]
async fn reload_clears_state_and_allows_reexecution() {
    let runtime = page("reload").await;
    let mods = runtime.loader.init().await;
    assert!(!mods.is_empty());

    runtime
        .loader
        .execute("Super Mods/Autoseller.js", false)
        .await
        .unwrap();
    assert_eq!(probe(&runtime.engine, "_G.autoseller_runs"), 1);

    runtime.loader.reload().await;
    assert!(runtime.loader.mods().await.is_empty());

    let rebuilt = runtime.loader.init().await;
    assert!(!rebuilt.is_empty());
    runtime
        .loader
        .execute("Super Mods/Autoseller.js", false)
        .await
        .unwrap();
    assert_eq!(probe(&runtime.engine, "_G.autoseller_runs"), 2);
}

#[tokio::test]
async fn discovery_applies_enablement_rules() {
    let runtime = page("rules").await;
    let mods = runtime.loader.init().await;

    let find = |name: &str| mods.iter().find(|m| m.name == name).unwrap();
    assert!(find("Super Mods/Autoseller.js").enabled);
    assert!(find("Official Mods/Turbo Mode.js").enabled);
    assert!(!find("Official Mods/Board Analyzer.js").enabled);
    // Absent files are not discovered at all.
    assert!(mods.iter().all(|m| m.name != "Super Mods/Cyclopedia.js"));
}

#[tokio::test]
async fn persisted_disable_survives_bootstrap_and_reload() {
    let pack = standard_pack("persisted");
    let storage_path = scratch_dir("persisted").join("storage.json");
    {
        let mut storage = Storage::open(&storage_path).unwrap();
        storage
            .set_mod_enabled("Super Mods/Autoseller.js", false)
            .unwrap();
    }

    let storage = Storage::open(&storage_path).unwrap();
    let runtime = bootstrap(storage, Some(pack.as_path())).await.unwrap();
    let mods = runtime.loader.init().await;
    let find = |mods: &[ModDescriptor]| {
        mods.iter()
            .find(|m| m.name == "Super Mods/Autoseller.js")
            .unwrap()
            .enabled
    };
    assert!(!find(&mods));

    // The execution guard honors the override.
    let result = runtime
        .loader
        .execute("Super Mods/Autoseller.js", false)
        .await
        .unwrap();
    assert!(result.is_none());

    // And it holds across a reload cycle.
    runtime.loader.reload().await;
    assert!(!find(&runtime.loader.init().await));
}

#[tokio::test]
async fn manual_mods_are_merged_and_executable() {
    let pack = standard_pack("manual");
    let mut storage = Storage::open(scratch_dir("manual").join("storage.json")).unwrap();
    storage
        .set_manual_mods(&[ManualMod {
            name: "My Tweak".into(),
            content: "_G.tweaked = true\ncontext.exports = { ok = true }".into(),
            enabled: None,
        }])
        .unwrap();

    let runtime = bootstrap(storage, Some(pack.as_path())).await.unwrap();
    let mods = runtime.loader.init().await;
    assert!(mods.iter().any(|m| m.name == "My Tweak" && m.enabled));

    let record = runtime
        .loader
        .execute("My Tweak", false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.exports["ok"], true);
    assert_eq!(probe(&runtime.engine, "_G.tweaked"), true);
}

#[tokio::test]
async fn reconcile_executes_only_the_newly_enabled_delta() {
    let runtime = page("reconcile").await;
    let mods = runtime.loader.init().await;
    runtime
        .loader
        .execute("Super Mods/Autoseller.js", false)
        .await
        .unwrap();

    // Push an update that enables the analyzer and keeps everything else.
    let updated: Vec<ModDescriptor> = mods
        .iter()
        .map(|m| {
            let mut m = m.clone();
            if m.name == "Official Mods/Board Analyzer.js" {
                m.enabled = true;
            }
            m
        })
        .collect();
    let outcomes = runtime.loader.reconcile(updated).await;

    // Delta contains the newly enabled mod and the enabled-but-never-run
    // one, not the already-executed Autoseller.
    let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
    assert!(names.contains(&"Official Mods/Board Analyzer.js"));
    assert!(names.contains(&"Official Mods/Turbo Mode.js"));
    assert!(!names.contains(&"Super Mods/Autoseller.js"));
    assert_eq!(probe(&runtime.engine, "_G.autoseller_runs"), 1);
    assert_eq!(probe(&runtime.engine, "_G.analyzer"), true);
}

#[tokio::test]
async fn execution_is_abandoned_when_the_host_never_becomes_ready() {
    use baml_bridge::{BackgroundService, ContentRelay, Envelope, PageClient};
    use baml_runtime::Loader;
    use tokio::sync::mpsc;

    let pack = standard_pack("not-ready");
    let storage = Storage::open(scratch_dir("not-ready").join("storage.json")).unwrap();

    let (background, push_rx) = BackgroundService::new(storage);
    let (page_out_tx, page_out_rx) = mpsc::unbounded_channel::<Envelope>();
    let (page_in_tx, page_in_rx) = mpsc::unbounded_channel::<Envelope>();
    ContentRelay::new(background, page_out_rx, page_in_tx, push_rx).spawn();
    let (client, _pushes) = PageClient::new(page_out_tx);
    client.spawn_dispatch(page_in_rx);

    let engine = Arc::new(ScriptEngine::with_default_api().unwrap());
    let readiness = Arc::new(Readiness::new());
    let loader = Loader::new(engine, client, readiness)
        .with_ready_timeout(Duration::from_millis(50));
    loader.set_source(ModSource::new(&pack)).await;
    loader.init().await;

    let result = loader
        .execute("Super Mods/Autoseller.js", false)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn init_without_a_pack_location_produces_no_mods() {
    let storage = Storage::open(scratch_dir("no-pack").join("storage.json")).unwrap();
    let runtime = bootstrap(storage, None).await.unwrap();
    assert!(runtime.loader.init().await.is_empty());
    // A later init picks up a source supplied after the fact.
    let pack = standard_pack("no-pack-late");
    runtime.loader.set_source(ModSource::new(&pack)).await;
    assert!(!runtime.loader.init().await.is_empty());
}

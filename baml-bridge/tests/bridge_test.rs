// End-to-end tests for the page ↔ relay ↔ background pipeline
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use baml_bridge::protocol::{Action, Envelope};
use baml_bridge::{BackgroundService, ContentRelay, PageClient};
use baml_core::storage::Storage;

struct Harness {
    client: Arc<PageClient>,
    pushes: mpsc::UnboundedReceiver<Action>,
    background: Arc<BackgroundService>,
}

fn scratch_storage(label: &str) -> Storage {
    let path = std::env::temp_dir().join(format!(
        "baml-bridge-test-{}-{label}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    Storage::open(path).unwrap()
}

fn wire_bridge(label: &str) -> Harness {
    let (background, push_rx) = BackgroundService::new(scratch_storage(label));

    let (page_out_tx, page_out_rx) = mpsc::unbounded_channel::<Envelope>();
    let (page_in_tx, page_in_rx) = mpsc::unbounded_channel::<Envelope>();

    ContentRelay::new(Arc::clone(&background), page_out_rx, page_in_tx, push_rx).spawn();

    let (client, pushes) = PageClient::new(page_out_tx);
    client.spawn_dispatch(page_in_rx);

    Harness {
        client,
        pushes,
        background,
    }
}

#[tokio::test]
async fn version_request_round_trips_with_correlation() {
    let harness = wire_bridge("version");
    let response = harness
        .client
        .request(Action::GetVersion, Duration::from_secs(1))
        .await
        .expect("version response");
    assert_eq!(response["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn non_allowlisted_request_times_out() {
    let harness = wire_bridge("allowlist");
    // ping is a background action but not part of the page relay set, so
    // the relay drops it and the caller sees a timeout.
    let response = harness
        .client
        .request(Action::Ping, Duration::from_millis(100))
        .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn config_fetch_misses_degrade_to_null() {
    let harness = wire_bridge("config-miss");
    let response = harness
        .client
        .request(
            Action::GetLocalModConfig {
                hash: "not-there".into(),
            },
            Duration::from_secs(1),
        )
        .await
        .expect("config response");
    assert!(response.is_null());
}

#[tokio::test]
async fn background_pushes_reach_the_page() {
    let mut harness = wire_bridge("push");
    harness.background.push(Action::ExecuteLocalMod {
        name: "Super Mods/Autoseller.js".into(),
        force: false,
    });
    let pushed = tokio::time::timeout(Duration::from_secs(1), harness.pushes.recv())
        .await
        .unwrap()
        .unwrap();
    match pushed {
        Action::ExecuteLocalMod { name, .. } => assert_eq!(name, "Super Mods/Autoseller.js"),
        other => panic!("unexpected push {other:?}"),
    }
}

#[tokio::test]
async fn non_push_actions_are_not_forwarded_to_the_page() {
    let mut harness = wire_bridge("push-filter");
    harness.background.push(Action::OpenDashboard);
    harness.background.push(Action::UpdateDebugMode { enabled: true });
    // Only the debug push survives the filter.
    let pushed = tokio::time::timeout(Duration::from_secs(1), harness.pushes.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(pushed, Action::UpdateDebugMode { enabled: true }));
}

#[tokio::test]
async fn concurrent_requests_resolve_to_their_own_ids() {
    let harness = wire_bridge("concurrent");
    let a = harness
        .client
        .request(Action::GetVersion, Duration::from_secs(1));
    let b = harness
        .client
        .request(Action::GetModCounts, Duration::from_secs(1));
    let (a, b) = tokio::join!(a, b);
    assert!(a.unwrap().get("version").is_some());
    assert!(b.unwrap().get("total").is_some());
}

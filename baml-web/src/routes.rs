use axum::{extract::State, routing::get, Json, Router};
use std::collections::HashMap;
use std::sync::Arc;

use baml_core::registry::{self, Category};
use baml_core::source::ModSource;

use crate::security;
use crate::server::AppState;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/version", get(get_version))
        .route("/mods", get(list_mods))
        .route("/counts", get(get_counts))
}

async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// Catalog entries present in the served pack, with their default state.
async fn list_mods(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let mods: Vec<serde_json::Value> = discovered(&state)
        .into_iter()
        .map(|path| {
            let enabled = registry::is_default_enabled(&path)
                || matches!(
                    registry::category_of(&path),
                    Category::Super | Category::Database
                );
            serde_json::json!({
                "name": path,
                "displayName": registry::display_name(&path),
                "category": registry::category_of(&path).label(),
                "enabled": enabled,
            })
        })
        .collect();
    Json(serde_json::Value::Array(mods))
}

async fn get_counts(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let discovered = discovered(&state);
    let mut counts: HashMap<&'static str, usize> = HashMap::new();
    for path in &discovered {
        *counts
            .entry(registry::category_of(path).label())
            .or_default() += 1;
    }
    counts.insert("total", discovered.len());
    Json(serde_json::to_value(counts).unwrap_or_default())
}

fn discovered(state: &AppState) -> Vec<String> {
    let source = ModSource::new(&state.pack_dir);
    registry::candidate_paths()
        .into_iter()
        .filter(|path| security::sanitize_path(path).is_some() && source.probe(path))
        .collect()
}

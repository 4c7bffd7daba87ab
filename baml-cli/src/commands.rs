// CLI command handlers
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use baml_core::registry::{self, Category};
use baml_core::storage::Storage;
use baml_runtime::bootstrap;

fn open_storage(path: Option<&Path>) -> Result<Storage> {
    let storage = match path {
        Some(path) => Storage::open(path),
        None => Storage::open_default(),
    };
    storage.context("Failed to open persisted store")
}

pub async fn list_mods(storage: Option<&Path>, pack_dir: Option<&Path>, all: bool) -> Result<()> {
    let storage = open_storage(storage)?;

    match pack_dir {
        Some(dir) => {
            let runtime = bootstrap(storage, Some(dir)).await?;
            let mods = runtime.loader.init().await;
            println!("Discovered {} mods in {}", mods.len(), dir.display());
            for descriptor in mods {
                let base = descriptor
                    .name
                    .rsplit('/')
                    .next()
                    .unwrap_or(&descriptor.name);
                if !all && registry::is_hidden_mod(base) {
                    continue;
                }
                let state = if descriptor.enabled { "enabled" } else { "disabled" };
                println!(
                    "  [{:8}] {:9} {}",
                    registry::category_of(&descriptor.name).label(),
                    state,
                    descriptor.display_name
                );
            }
            runtime.shutdown();
        }
        None => {
            println!("Known mod catalog:");
            for path in registry::candidate_paths() {
                let base = path.rsplit('/').next().unwrap_or(&path);
                if !all && registry::is_hidden_mod(base) {
                    continue;
                }
                let default = if registry::is_default_enabled(&path)
                    || matches!(
                        registry::category_of(&path),
                        Category::Super | Category::Database
                    ) {
                    "on by default"
                } else {
                    "off by default"
                };
                println!(
                    "  [{:8}] {:14} {}",
                    registry::category_of(&path).label(),
                    default,
                    registry::display_name(&path)
                );
            }
        }
    }

    Ok(())
}

pub async fn show_counts(storage: Option<&Path>, pack_dir: &Path) -> Result<()> {
    let storage = open_storage(storage)?;
    let runtime = bootstrap(storage, Some(pack_dir)).await?;
    let mods = runtime.loader.init().await;

    let mut per_category: HashMap<&'static str, usize> = HashMap::new();
    let mut enabled = 0usize;
    for descriptor in &mods {
        *per_category
            .entry(registry::category_of(&descriptor.name).label())
            .or_default() += 1;
        if descriptor.enabled {
            enabled += 1;
        }
    }

    println!("Mod counts for {}", pack_dir.display());
    for label in ["database", "official", "super", "user", "unknown"] {
        if let Some(count) = per_category.get(label) {
            println!("  {label:9} {count}");
        }
    }
    println!("  {:9} {}", "total", mods.len());
    println!("  {:9} {}", "enabled", enabled);

    runtime.shutdown();
    Ok(())
}

pub async fn run_all(storage: Option<&Path>, pack_dir: &Path) -> Result<String> {
    let storage = open_storage(storage)?;
    let runtime = bootstrap(storage, Some(pack_dir)).await?;
    let mods = runtime.loader.init().await;

    let enabled: Vec<String> = mods
        .iter()
        .filter(|m| m.enabled)
        .map(|m| m.name.clone())
        .collect();
    let outcomes = runtime.loader.execute_in_order(&enabled, false).await;

    let mut succeeded = 0usize;
    for outcome in &outcomes {
        if outcome.success {
            succeeded += 1;
        } else if let Some(error) = &outcome.error {
            eprintln!("  {} failed: {error}", outcome.name);
        }
    }

    runtime.shutdown();
    Ok(format!("{succeeded}/{} mods executed", outcomes.len()))
}

pub async fn exec_one(
    storage: Option<&Path>,
    pack_dir: &Path,
    name: &str,
    force: bool,
) -> Result<String> {
    let storage = open_storage(storage)?;
    let runtime = bootstrap(storage, Some(pack_dir)).await?;
    runtime.loader.init().await;

    let record = runtime
        .loader
        .execute(name, force)
        .await
        .with_context(|| format!("Mod {name} failed"))?;

    let summary = match record {
        Some(record) => {
            if record.exports.is_null() {
                format!("{name} executed")
            } else {
                format!(
                    "{name} executed, exports: {}",
                    serde_json::to_string(&record.exports)?
                )
            }
        }
        None => format!("{name} was not executed (unknown, disabled, or unavailable)"),
    };

    runtime.shutdown();
    Ok(summary)
}

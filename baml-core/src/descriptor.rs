//! Descriptor types for mods known to the loader.

use serde::{Deserialize, Serialize};

use crate::registry;

/// Where a mod's source comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModKind {
    /// Shipped with the pack; source fetched from the pack directory.
    File,
    /// Authored by the user; source stored verbatim in local storage.
    Manual,
}

/// An entry in the loader's effective mod list. Identity is `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModDescriptor {
    /// Category-prefixed path for file mods, user-chosen name for manual mods.
    pub name: String,
    /// Human-readable name shown in listings.
    pub display_name: String,
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: ModKind,
    /// Source text, present for manual mods only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Pre-rename identity, kept so persisted state can follow a rename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl ModDescriptor {
    /// Descriptor for a shipped file mod.
    pub fn file(name: impl Into<String>, enabled: bool) -> Self {
        let name = name.into();
        let display_name = registry::display_name(&name);
        Self {
            name,
            display_name,
            enabled,
            kind: ModKind::File,
            content: None,
            original_name: None,
        }
    }

    /// Descriptor for a user-authored manual mod.
    pub fn manual(manual: &ManualMod) -> Self {
        Self {
            name: manual.name.clone(),
            display_name: registry::display_name(&manual.name),
            enabled: manual.enabled.unwrap_or(true),
            kind: ModKind::Manual,
            content: Some(manual.content.clone()),
            original_name: None,
        }
    }
}

/// Persisted form of a user-authored mod, stored under the `manualMods` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualMod {
    pub name: String,
    pub content: String,
    /// Absent means enabled; only an explicit `false` disables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Record of a mod that has been executed: what it exported and the context
/// it ran with. Kept per name; overwritten on forced re-execution.
#[derive(Debug, Clone)]
pub struct ExecutedMod {
    pub name: String,
    /// Whatever the script published through `context.exports`, as JSON.
    pub exports: serde_json::Value,
    /// The identifying hash and config the script was given.
    pub hash: String,
    pub config: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_mods_default_to_enabled() {
        let stored = ManualMod {
            name: "My Tweak".into(),
            content: "-- noop".into(),
            enabled: None,
        };
        assert!(ModDescriptor::manual(&stored).enabled);

        let disabled = ManualMod {
            enabled: Some(false),
            ..stored
        };
        assert!(!ModDescriptor::manual(&disabled).enabled);
    }

    #[test]
    fn descriptor_serializes_with_wire_field_names() {
        let d = ModDescriptor::file("Super Mods/Autoseller.js", true);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["type"], "file");
        assert_eq!(v["displayName"], "Autoseller");
        assert!(v.get("content").is_none());
    }
}

//! Persisted key-value storage.
//!
//! Backs everything the extension side keeps across sessions: the user's
//! manual mods, per-mod configuration (keyed by an identifying hash of the
//! mod name), the debug flag, locale, and the welcome-modal flag. The store
//! is a single JSON object on disk, loaded on open and written through on
//! every mutation.
//!
//! Read paths degrade to defaults on failure (logged, never fatal); write
//! paths report errors to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::descriptor::ManualMod;
use crate::error::CoreError;

const KEY_MANUAL_MODS: &str = "manualMods";
const KEY_MOD_STATE: &str = "modState";
const KEY_LOCALE: &str = "locale";
const KEY_WELCOME: &str = "welcome-enabled";
const KEY_DEBUG: &str = "bestiary_debug_enabled";
/// Older builds persisted the debug flag under this spelling.
const KEY_DEBUG_LEGACY: &str = "bestiary-debug";

/// Identifying hash for a mod, used to key its persisted config.
pub fn mod_hash(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// JSON key-value store with write-through persistence.
pub struct Storage {
    path: PathBuf,
    values: Map<String, Value>,
}

impl Storage {
    /// Open the store at the default per-user location.
    pub fn open_default() -> Result<Self, CoreError> {
        Self::open(default_path())
    }

    /// Open (or create) a store at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| {
                CoreError::StorageIo {
                    path: path.clone(),
                    source,
                }
            })?;
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("storage at {} is not a JSON object, resetting", path.display());
                    Map::new()
                }
                Err(source) => {
                    return Err(CoreError::StorageCorrupt { path, source });
                }
            }
        } else {
            Map::new()
        };
        Ok(Self { path, values })
    }

    /// Raw value under a key, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed read. Missing key or shape mismatch degrade to `None` (logged).
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(err) => {
                log::warn!("stored value under {key:?} has unexpected shape: {err}");
                None
            }
        }
    }

    /// Set a value and persist the whole store.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), CoreError> {
        let value = serde_json::to_value(value).map_err(|source| CoreError::ValueShape {
            key: key.to_string(),
            source,
        })?;
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    /// Remove a key and persist.
    pub fn remove(&mut self, key: &str) -> Result<(), CoreError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CoreError::StorageIo {
                path: self.path.clone(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(self.values.clone()))
            .map_err(|source| CoreError::ValueShape {
                key: "<store>".to_string(),
                source,
            })?;
        std::fs::write(&self.path, content).map_err(|source| CoreError::StorageIo {
            path: self.path.clone(),
            source,
        })
    }

    // Typed accessors for the well-known keys.

    /// User-authored mods. Empty when unset or malformed.
    pub fn manual_mods(&self) -> Vec<ManualMod> {
        self.get_as(KEY_MANUAL_MODS).unwrap_or_default()
    }

    pub fn set_manual_mods(&mut self, mods: &[ManualMod]) -> Result<(), CoreError> {
        self.set(KEY_MANUAL_MODS, &mods)
    }

    /// Per-mod enabled overrides, keyed by mod name. A mod absent from the
    /// map follows the catalog's default-enabled rules.
    pub fn mod_state(&self) -> std::collections::HashMap<String, bool> {
        self.get_as(KEY_MOD_STATE).unwrap_or_default()
    }

    pub fn set_mod_enabled(&mut self, name: &str, enabled: bool) -> Result<(), CoreError> {
        let mut state = self.mod_state();
        state.insert(name.to_string(), enabled);
        self.set(KEY_MOD_STATE, &state)
    }

    /// Per-mod config, keyed by the mod's identifying hash. `Null` when unset.
    pub fn mod_config(&self, hash: &str) -> Value {
        self.get(&config_key(hash)).cloned().unwrap_or(Value::Null)
    }

    pub fn set_mod_config(&mut self, hash: &str, config: &Value) -> Result<(), CoreError> {
        self.set(&config_key(hash), config)
    }

    /// Debug flag, honoring the legacy key spelling on read.
    pub fn debug_enabled(&self) -> bool {
        self.get_as::<bool>(KEY_DEBUG)
            .or_else(|| self.get_as::<bool>(KEY_DEBUG_LEGACY))
            .unwrap_or(false)
    }

    pub fn set_debug_enabled(&mut self, enabled: bool) -> Result<(), CoreError> {
        self.set(KEY_DEBUG, &enabled)
    }

    pub fn locale(&self) -> Option<String> {
        self.get_as(KEY_LOCALE)
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<(), CoreError> {
        self.set(KEY_LOCALE, &locale)
    }

    /// Welcome modal flag. Defaults to shown.
    pub fn welcome_enabled(&self) -> bool {
        self.get_as(KEY_WELCOME).unwrap_or(true)
    }

    pub fn set_welcome_enabled(&mut self, enabled: bool) -> Result<(), CoreError> {
        self.set(KEY_WELCOME, &enabled)
    }
}

fn config_key(hash: &str) -> String {
    format!("config:{hash}")
}

fn default_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("bestiary-mod-loader");
    path.push("storage.json");
    path
}

//! Debug-flag log gating.
//!
//! The original loader silences everything except `console.error` unless
//! the user flips the debug flag. The Rust rendition does the same through
//! the global `log` level: errors always pass, everything else requires the
//! persisted flag.

use crate::storage::Storage;

/// Apply the debug flag to the global log filter.
pub fn apply_debug_level(enabled: bool) {
    let level = if enabled {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Error
    };
    log::set_max_level(level);
}

/// Read the persisted flag and apply it. Returns the effective setting.
pub fn apply_from_storage(storage: &Storage) -> bool {
    let enabled = storage.debug_enabled();
    apply_debug_level(enabled);
    enabled
}

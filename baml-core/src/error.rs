//! Error types shared across the loader workspace.
//!
//! Classifiable failures use `thiserror`; application seams wrap them in
//! `anyhow` with context. Transport-level failures are expected to degrade
//! to defaults rather than abort the host, so most call sites log and
//! continue instead of propagating these.

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for storage and source resolution.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The persisted store could not be read or written.
    #[error("storage I/O error at {path}: {source}")]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted store exists but does not parse as JSON.
    #[error("storage corrupt at {path}: {source}")]
    StorageCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value does not have the shape the caller asked for.
    #[error("stored value under {key:?} has unexpected shape: {source}")]
    ValueShape {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A mod source file could not be fetched from the pack directory.
    #[error("failed to fetch mod source {path}: {source}")]
    SourceFetch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No pack directory is known, so file mods cannot be resolved.
    #[error("no mod pack directory configured")]
    NoPackDir,
}

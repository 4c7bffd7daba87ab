//! Core data model and persistence for the Bestiary Arena mod loader.
//!
//! This crate carries the pieces every other member of the workspace builds
//! on: the static mod catalog and its lookup helpers, the descriptor types
//! for shipped and user-authored mods, the key-value storage layer backing
//! persisted state (manual mods, per-mod configuration, debug flags), and
//! the pack-directory source resolver that file mods are fetched through.

pub mod debug;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod source;
pub mod storage;

pub use descriptor::{ExecutedMod, ManualMod, ModDescriptor, ModKind};
pub use error::CoreError;
pub use registry::Category;

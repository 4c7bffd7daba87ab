//! Lua script engine for mod execution.
//!
//! Mods are plain scripts evaluated inside an explicit environment: instead
//! of resolving names against an implicit injected scope, every script gets
//! a `context` table (identifying hash, persisted config, the host `api`
//! surface, and an `exports` slot it may fill) and nothing else beyond the
//! standard library. The host decides exactly what capabilities a script
//! sees by what it puts on `api`.

pub mod bindings;
pub mod context;
pub mod convert;
pub mod engine;
pub mod error;

pub use context::ScriptContext;
pub use engine::ScriptEngine;
pub use error::IntoAnyhow;

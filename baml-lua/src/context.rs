//! Script context construction.
//!
//! The context is the capability object a mod runs against: its identifying
//! hash, its persisted config, and the host `api` surface. Scripts publish
//! an API of their own by assigning to `context.exports`.

use mlua::{Lua, Table, Value};

use crate::convert::json_to_lua;
use crate::error::IntoAnyhow;

/// Inputs for one mod execution.
#[derive(Debug, Clone)]
pub struct ScriptContext {
    /// Identifying hash of the mod name; keys persisted config.
    pub hash: String,
    /// Mod-specific persisted settings. `Null` when none were fetched.
    pub config: serde_json::Value,
}

impl ScriptContext {
    pub fn new(hash: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            hash: hash.into(),
            config,
        }
    }

    /// Materialize the context as a Lua table wired to the given `api`.
    pub(crate) fn to_table(&self, lua: &Lua, api: &Table) -> anyhow::Result<Table> {
        let table = lua.create_table().into_anyhow()?;
        table.set("hash", self.hash.as_str()).into_anyhow()?;
        table
            .set("config", json_to_lua(lua, &self.config).into_anyhow()?)
            .into_anyhow()?;
        table.set("api", api.clone()).into_anyhow()?;
        table.set("exports", Value::Nil).into_anyhow()?;
        Ok(table)
    }
}

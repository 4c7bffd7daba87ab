//! Host `api` surface exposed to mod scripts.

pub mod battles;
pub mod coordination;
pub mod events;
pub mod log;

use mlua::{Lua, Table};

/// Install every binding group onto an `api` table, in bootstrap order:
/// coordination first (later groups and mods assume it exists), then the
/// sandbox utilities, then custom battles.
pub fn register_all(lua: &Lua, api: &Table) -> anyhow::Result<()> {
    coordination::register(lua, api)?;
    log::register(lua, api)?;
    events::register(lua, api)?;
    battles::register(lua, api)?;
    Ok(())
}

//! `api.log` — leveled logging for mod scripts.
//!
//! Routed through the host `log` facade so the debug-flag gating applies to
//! mod output the same way it applies to the loader's own.

use mlua::{Lua, Table};

use crate::error::IntoAnyhow;

pub fn register(lua: &Lua, api: &Table) -> anyhow::Result<()> {
    let log_table = lua.create_table().into_anyhow()?;

    let debug_fn = lua
        .create_function(|_, message: String| {
            log::debug!("[mod] {message}");
            Ok(())
        })
        .into_anyhow()?;
    let info_fn = lua
        .create_function(|_, message: String| {
            log::info!("[mod] {message}");
            Ok(())
        })
        .into_anyhow()?;
    let warn_fn = lua
        .create_function(|_, message: String| {
            log::warn!("[mod] {message}");
            Ok(())
        })
        .into_anyhow()?;
    let error_fn = lua
        .create_function(|_, message: String| {
            log::error!("[mod] {message}");
            Ok(())
        })
        .into_anyhow()?;

    log_table.set("debug", debug_fn).into_anyhow()?;
    log_table.set("info", info_fn).into_anyhow()?;
    log_table.set("warn", warn_fn).into_anyhow()?;
    log_table.set("error", error_fn).into_anyhow()?;
    api.set("log", log_table).into_anyhow()?;
    Ok(())
}

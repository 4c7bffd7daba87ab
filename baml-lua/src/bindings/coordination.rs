//! `api.coordination` — shared flags for conflicting features.
//!
//! The coordination surface is a plain flag map mods consult before taking
//! over a feature (for example, two mods that both want to drive the turbo
//! tick). First mod to set a flag wins; the others see it and stand down.

use mlua::{Lua, Table, Value};

use crate::error::IntoAnyhow;

pub fn register(lua: &Lua, api: &Table) -> anyhow::Result<()> {
    let coordination = lua.create_table().into_anyhow()?;
    let flags = lua.create_table().into_anyhow()?;

    let set = {
        let flags = flags.clone();
        lua.create_function(move |_, (name, value): (String, Option<bool>)| {
            flags.set(name.as_str(), value.unwrap_or(true))?;
            Ok(())
        })
        .into_anyhow()?
    };

    let is_set = {
        let flags = flags.clone();
        lua.create_function(move |_, name: String| {
            Ok(matches!(
                flags.get::<Value>(name.as_str())?,
                Value::Boolean(true)
            ))
        })
        .into_anyhow()?
    };

    let clear = {
        let flags = flags.clone();
        lua.create_function(move |_, name: String| {
            flags.set(name.as_str(), Value::Nil)?;
            Ok(())
        })
        .into_anyhow()?
    };

    coordination.set("set", set).into_anyhow()?;
    coordination.set("is_set", is_set).into_anyhow()?;
    coordination.set("clear", clear).into_anyhow()?;
    coordination.set("flags", flags).into_anyhow()?;
    api.set("coordination", coordination).into_anyhow()?;
    Ok(())
}

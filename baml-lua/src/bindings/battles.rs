//! `api.battles` — custom battle setups.
//!
//! Mods register board setups under a name; other mods (and the dashboard
//! side, via exports) look them up to replay or share them.

use mlua::{Lua, Table, Value};

use crate::error::IntoAnyhow;

pub fn register(lua: &Lua, api: &Table) -> anyhow::Result<()> {
    let battles = lua.create_table().into_anyhow()?;
    let setups = lua.create_table().into_anyhow()?;

    let register_fn = {
        let setups = setups.clone();
        lua.create_function(move |_, (name, setup): (String, Table)| {
            setups.set(name.as_str(), setup)?;
            Ok(())
        })
        .into_anyhow()?
    };

    let get_fn = {
        let setups = setups.clone();
        lua.create_function(move |_, name: String| setups.get::<Value>(name.as_str()))
            .into_anyhow()?
    };

    let names_fn = {
        let setups = setups.clone();
        lua.create_function(move |_, ()| {
            let mut names = Vec::new();
            for pair in setups.clone().pairs::<String, Value>() {
                let (name, _) = pair?;
                names.push(name);
            }
            names.sort();
            Ok(names)
        })
        .into_anyhow()?
    };

    battles.set("register", register_fn).into_anyhow()?;
    battles.set("get", get_fn).into_anyhow()?;
    battles.set("names", names_fn).into_anyhow()?;
    api.set("battles", battles).into_anyhow()?;
    Ok(())
}

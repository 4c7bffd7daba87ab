//! `api.events` — cross-mod event bus.
//!
//! Handlers live in a Lua table captured by the binding closures, so mods
//! loaded in separate environments can still talk to each other. `emit`
//! calls handlers in registration order; a failing handler is logged and
//! does not stop the rest.

use mlua::{Function, Lua, MultiValue, Table, Value, Variadic};

use crate::error::IntoAnyhow;

pub fn register(lua: &Lua, api: &Table) -> anyhow::Result<()> {
    let events = lua.create_table().into_anyhow()?;
    let handlers = lua.create_table().into_anyhow()?;

    let on = {
        let handlers = handlers.clone();
        lua.create_function(move |lua, (name, handler): (String, Function)| {
            let list: Table = match handlers.get::<Value>(name.as_str())? {
                Value::Table(t) => t,
                _ => {
                    let t = lua.create_table()?;
                    handlers.set(name.as_str(), t.clone())?;
                    t
                }
            };
            list.push(handler)?;
            Ok(())
        })
        .into_anyhow()?
    };

    let off = {
        let handlers = handlers.clone();
        lua.create_function(move |_, name: String| {
            handlers.set(name.as_str(), Value::Nil)?;
            Ok(())
        })
        .into_anyhow()?
    };

    let emit = {
        let handlers = handlers.clone();
        lua.create_function(move |_, (name, args): (String, Variadic<Value>)| {
            let Value::Table(list) = handlers.get::<Value>(name.as_str())? else {
                return Ok(0usize);
            };
            let mut called = 0usize;
            for handler in list.sequence_values::<Function>() {
                let handler = handler?;
                let args = MultiValue::from_iter(args.iter().cloned());
                match handler.call::<()>(args) {
                    Ok(()) => called += 1,
                    Err(err) => {
                        log::warn!("event handler for {name:?} failed: {err}");
                    }
                }
            }
            Ok(called)
        })
        .into_anyhow()?
    };

    events.set("on", on).into_anyhow()?;
    events.set("off", off).into_anyhow()?;
    events.set("emit", emit).into_anyhow()?;
    api.set("events", events).into_anyhow()?;
    Ok(())
}

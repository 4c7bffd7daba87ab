use anyhow::Context;
use mlua::{Lua, Table, Value};

use crate::bindings;
use crate::context::ScriptContext;
use crate::convert::lua_to_json;
use crate::error::IntoAnyhow;

/// Builds the execution environment for one mod: `context` and `api` are
/// the explicit names a script gets; everything else falls through to the
/// standard library.
const ENV_CHUNK: &str = "local ctx, api = ...\n\
                         return setmetatable({ context = ctx, api = api }, { __index = _G })";

pub struct ScriptEngine {
    lua: Lua,
    api: Table,
}

impl ScriptEngine {
    /// Engine with an empty `api` table; the injector installs binding
    /// groups in its own bootstrap order.
    pub fn new() -> anyhow::Result<Self> {
        let lua = Lua::new();
        let api = lua.create_table().into_anyhow()?;
        Ok(Self { lua, api })
    }

    /// Engine with the full `api` surface installed. Used where no staged
    /// bootstrap is involved (CLI one-shots, tests).
    pub fn with_default_api() -> anyhow::Result<Self> {
        let engine = Self::new()?;
        bindings::register_all(&engine.lua, &engine.api)?;
        Ok(engine)
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn api(&self) -> &Table {
        &self.api
    }

    /// Whether the coordination surface has been installed. Later bootstrap
    /// stages and mods assume it exists.
    pub fn coordination_ready(&self) -> bool {
        self.api
            .contains_key("coordination")
            .unwrap_or(false)
    }

    /// Evaluate a mod's source inside its own environment and return what
    /// the script published through `context.exports`, as JSON.
    pub fn execute(
        &self,
        name: &str,
        source: &str,
        context: &ScriptContext,
    ) -> anyhow::Result<serde_json::Value> {
        let context_table = context.to_table(&self.lua, &self.api)?;

        let env: Table = self
            .lua
            .load(ENV_CHUNK)
            .set_name("=mod-environment")
            .call((context_table.clone(), self.api.clone()))
            .into_anyhow()
            .context("Failed to build mod environment")?;

        self.lua
            .load(source)
            .set_name(name)
            .set_environment(env)
            .exec()
            .into_anyhow()
            .with_context(|| format!("Failed to execute mod script: {name}"))?;

        let exports = context_table.get::<Value>("exports").into_anyhow()?;
        lua_to_json(exports)
            .into_anyhow()
            .with_context(|| format!("Mod {name} published non-serializable exports"))
    }

    /// Run a bare snippet in the global environment. Debug/bootstrap helper.
    pub fn execute_string(&self, code: &str) -> anyhow::Result<()> {
        self.lua
            .load(code)
            .exec()
            .into_anyhow()
            .context("Failed to execute Lua string")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScriptEngine {
        ScriptEngine::with_default_api().unwrap()
    }

    #[test]
    fn script_sees_context_and_publishes_exports() {
        let engine = engine();
        let ctx = ScriptContext::new("abc123", serde_json::json!({"limit": 4}));
        let exports = engine
            .execute(
                "test mod",
                "context.exports = { hash = context.hash, limit = context.config.limit * 2 }",
                &ctx,
            )
            .unwrap();
        assert_eq!(exports["hash"], "abc123");
        assert_eq!(exports["limit"], 8);
    }

    #[test]
    fn environments_do_not_leak_locals_between_mods() {
        let engine = engine();
        let ctx = ScriptContext::new("h", serde_json::Value::Null);
        engine.execute("first", "secret = 41", &ctx).unwrap();
        let exports = engine
            .execute("second", "context.exports = { saw = secret }", &ctx)
            .unwrap();
        // Assignments land in the per-mod environment, not in globals.
        assert!(exports["saw"].is_null());
    }

    #[test]
    fn evaluation_error_propagates_and_names_the_mod() {
        let engine = engine();
        let ctx = ScriptContext::new("h", serde_json::Value::Null);
        let err = engine.execute("broken", "error('boom')", &ctx).unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("broken"));
        assert!(rendered.contains("boom"));
    }

    #[test]
    fn coordination_flags_are_shared_across_mods() {
        let engine = engine();
        let ctx = ScriptContext::new("h", serde_json::Value::Null);
        engine
            .execute("claimer", "api.coordination.set('turbo')", &ctx)
            .unwrap();
        let exports = engine
            .execute(
                "checker",
                "context.exports = { taken = api.coordination.is_set('turbo') }",
                &ctx,
            )
            .unwrap();
        assert_eq!(exports["taken"], true);
    }

    #[test]
    fn events_reach_handlers_in_other_mods() {
        let engine = engine();
        let ctx = ScriptContext::new("h", serde_json::Value::Null);
        engine
            .execute(
                "listener",
                "api.events.on('tick', function(n) _G.tick_total = (_G.tick_total or 0) + n end)",
                &ctx,
            )
            .unwrap();
        engine
            .execute("emitter", "api.events.emit('tick', 3)", &ctx)
            .unwrap();
        // Handler wrote through to globals, visible via the env fallback.
        let exports = engine
            .execute("reader", "context.exports = { total = tick_total }", &ctx)
            .unwrap();
        assert_eq!(exports["total"], 3);
    }
}

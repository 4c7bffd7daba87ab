//! JSON ↔ Lua value conversion for config and exports.

use mlua::{Lua, Table, Value};

pub fn json_to_lua(lua: &Lua, value: &serde_json::Value) -> mlua::Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Nil),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Number(f))
            } else {
                Ok(Value::Nil)
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(lua.create_string(s)?)),
        serde_json::Value::Array(items) => {
            let table = lua.create_table_with_capacity(items.len(), 0)?;
            for (i, item) in items.iter().enumerate() {
                table.set(i + 1, json_to_lua(lua, item)?)?;
            }
            Ok(Value::Table(table))
        }
        serde_json::Value::Object(fields) => {
            let table = lua.create_table_with_capacity(0, fields.len())?;
            for (key, field) in fields {
                table.set(key.as_str(), json_to_lua(lua, field)?)?;
            }
            Ok(Value::Table(table))
        }
    }
}

pub fn lua_to_json(value: Value) -> mlua::Result<serde_json::Value> {
    match value {
        Value::Nil => Ok(serde_json::Value::Null),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(b)),
        Value::Integer(i) => Ok(serde_json::json!(i)),
        Value::Number(f) => Ok(serde_json::json!(f)),
        Value::String(s) => Ok(serde_json::Value::String(s.to_str()?.to_string())),
        Value::Table(t) => table_to_json(&t),
        // Functions, userdata and threads have no JSON form.
        _ => Ok(serde_json::Value::Null),
    }
}

fn table_to_json(table: &Table) -> mlua::Result<serde_json::Value> {
    let len = table.raw_len();
    if len > 0 && is_sequence(table, len)? {
        let mut items = Vec::with_capacity(len);
        for i in 1..=len {
            items.push(lua_to_json(table.raw_get::<Value>(i)?)?);
        }
        return Ok(serde_json::Value::Array(items));
    }

    let mut fields = serde_json::Map::new();
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, value) = pair?;
        let key = match key {
            Value::String(s) => s.to_str()?.to_string(),
            Value::Integer(i) => i.to_string(),
            _ => continue,
        };
        fields.insert(key, lua_to_json(value)?);
    }
    Ok(serde_json::Value::Object(fields))
}

fn is_sequence(table: &Table, len: usize) -> mlua::Result<bool> {
    for i in 1..=len {
        if table.raw_get::<Value>(i)?.is_nil() {
            return Ok(false);
        }
    }
    Ok(true)
}

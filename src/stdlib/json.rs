//==================================================
// File: stdlib/json.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: `json` host module
// Objective: Convert between Clam values and serde_json documents
//==================================================

use crate::interpreter::value::arg;
use crate::interpreter::{HashKey, HostReturn, NativeArity, RuntimeError, Value};
use crate::stdlib_registry::HostModule;
use serde_json::{Map, Number};
use std::collections::HashMap;

const MAX_JSON_DEPTH: usize = 128;
// Largest magnitude where every integer is exactly representable in an f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

pub(super) fn module() -> HostModule {
    HostModule::new("json")
        .function(
            "to",
            NativeArity::Exact(1),
            "Encodes a value as a JSON string; hash keys become strings.",
            |_, args| {
                let document = to_json(&args[0])?;
                Ok(HostReturn::single(document.to_string()))
            },
        )
        .function(
            "from",
            NativeArity::Exact(1),
            "Decodes a JSON string into arrays, hashes and scalars.",
            |_, args| {
                let text: String = arg(&args, 0, "json.from")?;
                let document: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|err| RuntimeError::host(format!("json.from: {err}")))?;
                Ok(HostReturn::Single(from_json(document)))
            },
        )
        .function(
            "valid",
            NativeArity::Exact(1),
            "Reports whether a string holds well-formed JSON.",
            |_, args| {
                let text: String = arg(&args, 0, "json.valid")?;
                let valid = serde_json::from_str::<serde_json::Value>(&text).is_ok();
                Ok(HostReturn::single(valid))
            },
        )
}

/// Encode a value. Functions, NaN and infinities have no JSON form; cyclic
/// collections are cut off at a fixed depth.
pub fn to_json(value: &Value) -> Result<serde_json::Value, RuntimeError> {
    encode(value, 0)
}

fn encode(value: &Value, depth: usize) -> Result<serde_json::Value, RuntimeError> {
    if depth > MAX_JSON_DEPTH {
        return Err(RuntimeError::host(
            "json: value nests too deeply (is it cyclic?)",
        ));
    }
    Ok(match value {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => encode_number(*n)?,
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            let items = items.borrow();
            let encoded = items
                .iter()
                .map(|item| encode(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            serde_json::Value::Array(encoded)
        }
        Value::Hash(entries) => {
            let entries = entries.borrow();
            let mut object = Map::new();
            for (key, item) in entries.iter() {
                object.insert(key.to_string(), encode(item, depth + 1)?);
            }
            serde_json::Value::Object(object)
        }
        Value::Function(_) => {
            return Err(RuntimeError::type_error("json: functions cannot be encoded"));
        }
    })
}

fn encode_number(n: f64) -> Result<serde_json::Value, RuntimeError> {
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        return Ok(serde_json::Value::from(n as i64));
    }
    Number::from_f64(n)
        .map(serde_json::Value::Number)
        .ok_or_else(|| RuntimeError::type_error(format!("json: {} cannot be encoded", Value::Number(n))))
}

pub fn from_json(document: serde_json::Value) -> Value {
    match document {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(object) => {
            let entries: HashMap<HashKey, Value> = object
                .into_iter()
                .map(|(key, item)| (HashKey::String(key), from_json(item)))
                .collect();
            Value::hash(entries)
        }
    }
}

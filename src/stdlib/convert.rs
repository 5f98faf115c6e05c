//==================================================
// File: stdlib/convert.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Value inspection and conversion host functions
// Objective: type, str and num
//==================================================

use crate::interpreter::{HostReturn, Interpreter, NativeArity, RuntimeError, Value};
use crate::stdlib_registry::HostRegistry;

pub(super) fn register(registry: &mut HostRegistry) {
    registry.register_fn(
        "type",
        NativeArity::Exact(1),
        "Returns the kind of a value: nil, boolean, number, string, array, hash or function.",
        builtin_type,
    );
    registry.register_fn(
        "str",
        NativeArity::Exact(1),
        "Returns the printed form of a value as a string.",
        builtin_str,
    );
    registry.register_fn(
        "num",
        NativeArity::Exact(1),
        "Converts a string or boolean to a number; unparsable strings give nil.",
        builtin_num,
    );
}

fn builtin_type(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    Ok(HostReturn::single(args[0].type_name()))
}

fn builtin_str(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    Ok(HostReturn::single(args[0].to_string()))
}

fn builtin_num(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let converted = match &args[0] {
        Value::Number(n) => Value::Number(*n),
        Value::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or(Value::Nil),
        other => {
            return Err(RuntimeError::type_error(format!(
                "num() cannot convert a {}",
                other.type_name()
            )));
        }
    };
    Ok(HostReturn::Single(converted))
}

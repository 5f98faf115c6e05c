//==================================================
// File: stdlib/collections.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Array, hash and string collection host functions
// Objective: Provide length, non-mutating array edits, searching, slicing
//            and callback-driven map/filter/reduce
//==================================================

use crate::interpreter::value::{arg, sorted_entries};
use crate::interpreter::{
    ArrayRef, HashRef, HostReturn, Interpreter, NativeArity, RuntimeError, RuntimeErrorKind, Value,
};
use crate::stdlib_registry::HostRegistry;

//==================================================
// Section 1.0 - Registration
//==================================================

pub(super) fn register(registry: &mut HostRegistry) {
    registry.register_fn(
        "len",
        NativeArity::Exact(1),
        "Returns the length of a string, array or hash.",
        builtin_len,
    );
    registry.register_fn(
        "push",
        NativeArity::Exact(2),
        "Returns a new array with b appended to a.",
        builtin_push,
    );
    registry.register_fn(
        "pop",
        NativeArity::Exact(1),
        "Returns [last element, remaining array]; a is left untouched.",
        builtin_pop,
    );
    registry.register_fn(
        "shift",
        NativeArity::Exact(1),
        "Returns [first element, remaining array]; a is left untouched.",
        builtin_shift,
    );
    registry.register_fn(
        "unshift",
        NativeArity::Exact(2),
        "Returns a new array with b prepended to a.",
        builtin_unshift,
    );
    registry.register_fn(
        "join",
        NativeArity::Exact(2),
        "Concatenates the printed elements of a, separated by b.",
        builtin_join,
    );
    registry.register_fn(
        "split",
        NativeArity::Exact(2),
        "Splits a into substrings around b; an empty b splits into characters.",
        builtin_split,
    );
    registry.register_fn(
        "index",
        NativeArity::Exact(2),
        "Returns the position of b in a, or -1 when absent.",
        builtin_index,
    );
    registry.register_fn(
        "slice",
        NativeArity::Exact(3),
        "Returns the elements of a from index b up to, not including, index c.",
        builtin_slice,
    );
    registry.register_fn(
        "map",
        NativeArity::Exact(2),
        "Returns the results of calling b on each element of a.",
        builtin_map,
    );
    registry.register_fn(
        "filter",
        NativeArity::Exact(2),
        "Returns the elements of a for which b returns a truthy value.",
        builtin_filter,
    );
    registry.register_fn(
        "reduce",
        NativeArity::Range {
            min: 2,
            max: Some(3),
        },
        "Folds a with the two-argument callable b, starting from c or the first element.",
        builtin_reduce,
    );
    registry.register_fn(
        "reverse",
        NativeArity::Exact(1),
        "Returns a new array holding the elements of a in reverse order.",
        builtin_reverse,
    );
    registry.register_fn(
        "keys",
        NativeArity::Exact(1),
        "Returns the keys of a hash in sorted order.",
        builtin_keys,
    );
    registry.register_fn(
        "values",
        NativeArity::Exact(1),
        "Returns the values of a hash, ordered by key.",
        builtin_values,
    );
}

//==================================================
// Section 2.0 - Builtins
//==================================================

fn snapshot(args: &[Value], function: &str) -> Result<Vec<Value>, RuntimeError> {
    let items: ArrayRef = arg(args, 0, function)?;
    let copy = items.borrow().clone();
    Ok(copy)
}

fn empty_array(function: &str) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::IndexOutOfRange,
        format!("{function}() called on an empty array"),
    )
}

fn builtin_len(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let length = match &args[0] {
        Value::String(text) => text.chars().count(),
        Value::Array(items) => items.borrow().len(),
        Value::Hash(entries) => entries.borrow().len(),
        other => {
            return Err(RuntimeError::type_error(format!(
                "len() not supported for type {}",
                other.type_name()
            )));
        }
    };
    Ok(HostReturn::single(length))
}

fn builtin_push(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let mut next = snapshot(&args, "push")?;
    next.push(args[1].clone());
    Ok(HostReturn::single(next))
}

fn builtin_pop(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let mut rest = snapshot(&args, "pop")?;
    let last = rest.pop().ok_or_else(|| empty_array("pop"))?;
    Ok(HostReturn::Multiple(vec![last, Value::array(rest)]))
}

fn builtin_shift(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let mut rest = snapshot(&args, "shift")?;
    if rest.is_empty() {
        return Err(empty_array("shift"));
    }
    let first = rest.remove(0);
    Ok(HostReturn::Multiple(vec![first, Value::array(rest)]))
}

fn builtin_unshift(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let items = snapshot(&args, "unshift")?;
    let mut next = Vec::with_capacity(items.len() + 1);
    next.push(args[1].clone());
    next.extend(items);
    Ok(HostReturn::single(next))
}

fn builtin_join(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let items = snapshot(&args, "join")?;
    let separator: String = arg(&args, 1, "join")?;
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(HostReturn::single(joined))
}

fn builtin_split(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let text: String = arg(&args, 0, "split")?;
    let separator: String = arg(&args, 1, "split")?;
    let parts: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator.as_str()).map(String::from).collect()
    };
    Ok(HostReturn::single(parts))
}

fn builtin_index(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let items = snapshot(&args, "index")?;
    let position = items
        .iter()
        .position(|item| *item == args[1])
        .map_or(-1, |found| found as i64);
    Ok(HostReturn::single(position))
}

fn builtin_slice(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let items = snapshot(&args, "slice")?;
    let start: i64 = arg(&args, 1, "slice")?;
    let end: i64 = arg(&args, 2, "slice")?;
    if start < 0 || end < start || end as usize > items.len() {
        return Err(RuntimeError::new(
            RuntimeErrorKind::IndexOutOfRange,
            format!(
                "slice bounds {start}..{end} outside an array of length {}",
                items.len()
            ),
        ));
    }
    Ok(HostReturn::single(items[start as usize..end as usize].to_vec()))
}

fn builtin_map(interp: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let items = snapshot(&args, "map")?;
    let callback = &args[1];
    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        mapped.push(interp.call_value(callback, vec![item])?);
    }
    Ok(HostReturn::single(mapped))
}

fn builtin_filter(interp: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let items = snapshot(&args, "filter")?;
    let callback = &args[1];
    let mut kept = Vec::new();
    for item in items {
        if interp.call_value(callback, vec![item.clone()])?.is_truthy() {
            kept.push(item);
        }
    }
    Ok(HostReturn::single(kept))
}

fn builtin_reduce(interp: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let mut items = snapshot(&args, "reduce")?.into_iter();
    let callback = &args[1];
    let mut accumulator = match args.get(2) {
        Some(initial) => initial.clone(),
        None => items.next().ok_or_else(|| empty_array("reduce"))?,
    };
    for item in items {
        accumulator = interp.call_value(callback, vec![accumulator, item])?;
    }
    Ok(HostReturn::Single(accumulator))
}

fn builtin_reverse(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let mut items = snapshot(&args, "reverse")?;
    items.reverse();
    Ok(HostReturn::single(items))
}

fn builtin_keys(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let entries: HashRef = arg(&args, 0, "keys")?;
    let keys: Vec<Value> = sorted_entries(&entries)
        .into_iter()
        .map(|(key, _)| key.to_value())
        .collect();
    Ok(HostReturn::single(keys))
}

fn builtin_values(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let entries: HashRef = arg(&args, 0, "values")?;
    let values: Vec<Value> = sorted_entries(&entries)
        .into_iter()
        .map(|(_, value)| value)
        .collect();
    Ok(HostReturn::single(values))
}

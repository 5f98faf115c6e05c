//==================================================
// File: stdlib/file.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: `file` host module
// Objective: Whole-file reads and writes, JSON persistence and metadata
//==================================================

use super::json::{from_json, to_json};
use super::nil;
use super::time::time_to_hash;
use crate::interpreter::value::arg;
use crate::interpreter::{HashKey, HostReturn, NativeArity, RuntimeError, Value};
use crate::stdlib_registry::HostModule;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn io_failure(function: &str, path: &str, err: std::io::Error) -> RuntimeError {
    RuntimeError::host(format!("{function} {path}: {err}"))
}

//Function: persist
//Purpose: Load a JSON document if `path` exists, otherwise save `value` there
//Inputs: path, value
//Returns: The loaded document or `value` unchanged
fn persist(path: &str, value: Value) -> Result<Value, RuntimeError> {
    if Path::new(path).exists() {
        let text = fs::read_to_string(path).map_err(|err| io_failure("file.persist", path, err))?;
        let document: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| RuntimeError::host(format!("file.persist {path}: {err}")))?;
        return Ok(from_json(document));
    }
    let document = to_json(&value)?;
    fs::write(path, document.to_string()).map_err(|err| io_failure("file.persist", path, err))?;
    Ok(value)
}

fn stat(path: &str) -> Result<Value, RuntimeError> {
    let meta = fs::metadata(path).map_err(|err| io_failure("file.stat", path, err))?;
    let name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    let mut mode = HashMap::new();
    mode.insert(HashKey::from("isdir"), Value::Bool(meta.is_dir()));
    mode.insert(HashKey::from("isregular"), Value::Bool(meta.is_file()));
    mode.insert(HashKey::from("readonly"), Value::Bool(meta.permissions().readonly()));

    let mut entries = HashMap::new();
    entries.insert(HashKey::from("name"), Value::String(name));
    entries.insert(HashKey::from("size"), Value::Number(meta.len() as f64));
    entries.insert(HashKey::from("isdir"), Value::Bool(meta.is_dir()));
    entries.insert(HashKey::from("mode"), Value::hash(mode));
    if let Ok(modified) = meta.modified() {
        let local: DateTime<Local> = modified.into();
        entries.insert(HashKey::from("modtime"), time_to_hash(&local, "Local"));
    }
    Ok(Value::hash(entries))
}

pub(super) fn module() -> HostModule {
    HostModule::new("file")
        .function(
            "persist",
            NativeArity::Exact(2),
            "Returns the JSON stored at path, or stores value there first if the file is missing.",
            |_, args| {
                let path: String = arg(&args, 0, "file.persist")?;
                Ok(HostReturn::Single(persist(&path, args[1].clone())?))
            },
        )
        .function(
            "read",
            NativeArity::Exact(1),
            "Reads a whole file as a string.",
            |_, args| {
                let path: String = arg(&args, 0, "file.read")?;
                let text =
                    fs::read_to_string(&path).map_err(|err| io_failure("file.read", &path, err))?;
                Ok(HostReturn::single(text))
            },
        )
        .function(
            "write",
            NativeArity::Exact(2),
            "Replaces the contents of a file with the printed form of a value.",
            |_, args| {
                let path: String = arg(&args, 0, "file.write")?;
                fs::write(&path, args[1].to_string())
                    .map_err(|err| io_failure("file.write", &path, err))?;
                nil()
            },
        )
        .function(
            "exists",
            NativeArity::Exact(1),
            "Whether a file or directory exists at path.",
            |_, args| {
                let path: String = arg(&args, 0, "file.exists")?;
                Ok(HostReturn::single(Path::new(&path).exists()))
            },
        )
        .function(
            "remove",
            NativeArity::Exact(1),
            "Deletes a file or an empty directory.",
            |_, args| {
                let path: String = arg(&args, 0, "file.remove")?;
                let result = if Path::new(&path).is_dir() {
                    fs::remove_dir(&path)
                } else {
                    fs::remove_file(&path)
                };
                result.map_err(|err| io_failure("file.remove", &path, err))?;
                nil()
            },
        )
        .function(
            "rename",
            NativeArity::Exact(2),
            "Moves a file from one path to another.",
            |_, args| {
                let from: String = arg(&args, 0, "file.rename")?;
                let to: String = arg(&args, 1, "file.rename")?;
                fs::rename(&from, &to).map_err(|err| io_failure("file.rename", &from, err))?;
                nil()
            },
        )
        .function(
            "stat",
            NativeArity::Exact(1),
            "Name, size, mode flags and modification time of a path.",
            |_, args| {
                let path: String = arg(&args, 0, "file.stat")?;
                Ok(HostReturn::Single(stat(&path)?))
            },
        )
}

//==================================================
// File: stdlib/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Standard host library for Clam scripts
// Objective: Register output, conversion, collection, math, json, file,
//            os and time bindings into a host registry
//==================================================

mod collections;
mod console;
mod convert;
mod file;
mod json;
mod math;
mod os;
mod time;

pub use console::format_values;
pub use json::{from_json, to_json};

use crate::interpreter::{HostReturn, RuntimeError};
use crate::stdlib_registry::HostRegistry;

pub fn register_all(registry: &mut HostRegistry, script_args: Vec<String>) {
    console::register(registry);
    convert::register(registry);
    collections::register(registry);
    registry.register_module(math::module(), "Mathematical functions and constants.");
    registry.register_module(json::module(), "JSON encoding and decoding.");
    registry.register_module(file::module(), "File system helpers.");
    registry.register_module(os::module(script_args), "Operating system access.");
    registry.register_module(time::module(), "Wall clock time and calendar helpers.");
}

fn nil() -> Result<HostReturn, RuntimeError> {
    Ok(HostReturn::Single(crate::interpreter::Value::Nil))
}

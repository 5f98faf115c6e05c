//==================================================
// File: lib.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Clam language library
// Objective: Expose the lexer, parser, AST, interpreter and host library
//==================================================

pub mod ast;
pub mod config;
pub mod interpreter;
pub mod logging;
pub mod parser;
pub mod stdlib;
pub mod stdlib_registry;
pub mod tokenizer;

pub use interpreter::{Interpreter, RuntimeError, ScriptError, Value};
pub use parser::parse_source;
pub use stdlib_registry::HostRegistry;

/// Parse `source`, install `registry` into a fresh stdout interpreter and run it.
pub fn run_source(source: &str, registry: &HostRegistry) -> Result<(), ScriptError> {
    run_source_with(&mut Interpreter::new(), source, registry)
}

/// Same as [`run_source`] against a caller-provided interpreter, so output
/// sinks and call limits can be chosen up front and globals inspected after.
pub fn run_source_with(
    interpreter: &mut Interpreter,
    source: &str,
    registry: &HostRegistry,
) -> Result<(), ScriptError> {
    let program = parse_source(source)?;
    registry.install(interpreter);
    interpreter.run(&program)?;
    Ok(())
}

//==================================================
// File: tests/common/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Shared harness for Clam integration tests
// Objective: Run a script with the standard host library and capture stdout
//==================================================

#![allow(dead_code)]

use clam::interpreter::{Interpreter, ScriptError};
use clam::stdlib_registry::HostRegistry;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::thread;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `source` on a roomy worker stack. Returns the outcome and everything
/// the script printed.
pub fn run_clam(source: &str) -> (Result<(), ScriptError>, String) {
    let source = source.to_string();
    thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || {
            let buffer = SharedBuffer::default();
            let mut interpreter = Interpreter::with_output(buffer.clone());
            let registry = HostRegistry::with_stdlib(vec!["test.clam".to_string()]);
            let result = clam::run_source_with(&mut interpreter, &source, &registry);
            let output = String::from_utf8(buffer.0.borrow().clone()).expect("utf8 output");
            (result, output)
        })
        .expect("spawn test interpreter")
        .join()
        .expect("test interpreter panicked")
}

/// Run `source` and return its output, failing the test on any error.
pub fn output_of(source: &str) -> String {
    let (result, output) = run_clam(source);
    if let Err(err) = result {
        panic!("script failed: {err}\noutput so far:\n{output}");
    }
    output
}

/// Run `source` and return the error it stopped with.
pub fn error_of(source: &str) -> ScriptError {
    run_clam(source).0.expect_err("script should fail")
}

//==================================================
// File: stdlib_registry.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Track Clam host bindings and their documentation
// Objective: Collect named host functions, constants and module hashes,
//            then install fresh copies into an interpreter's global frame
//==================================================

use crate::interpreter::{
    HashKey, HostReturn, Interpreter, IntoValue, NativeArity, RuntimeError, Value,
};
use std::collections::HashMap;
use std::fmt::Write as _;

//==================================================
// Section 1.0 - Registry Types
//==================================================

/// One documented member of a host module (`math.sqrt`, `time.January`).
#[derive(Debug, Clone)]
pub struct ModuleMember {
    pub name: String,
    pub value: Value,
    pub arity: Option<NativeArity>,
    pub doc: String,
}

/// A hash of related host bindings. Each install builds a new hash so scripts
/// cannot leak edits between interpreters.
#[derive(Debug, Clone, Default)]
pub struct HostModule {
    name: String,
    members: Vec<ModuleMember>,
}

impl HostModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn function(
        mut self,
        name: &str,
        arity: NativeArity,
        doc: &str,
        func: impl Fn(&mut Interpreter, Vec<Value>) -> Result<HostReturn, RuntimeError> + 'static,
    ) -> Self {
        let qualified = format!("{}.{}", self.name, name);
        self.members.push(ModuleMember {
            name: name.to_string(),
            value: Value::native(qualified, arity, func),
            arity: Some(arity),
            doc: doc.to_string(),
        });
        self
    }

    pub fn constant(mut self, name: &str, value: impl IntoValue, doc: &str) -> Self {
        self.members.push(ModuleMember {
            name: name.to_string(),
            value: value.into_value(),
            arity: None,
            doc: doc.to_string(),
        });
        self
    }

    pub fn members(&self) -> &[ModuleMember] {
        &self.members
    }

    fn build(&self) -> Value {
        let entries: HashMap<HashKey, Value> = self
            .members
            .iter()
            .map(|member| (HashKey::from(member.name.as_str()), member.value.clone()))
            .collect();
        Value::hash(entries)
    }
}

#[derive(Debug, Clone)]
pub enum HostBinding {
    Function { value: Value, arity: NativeArity },
    Constant(Value),
    Module(HostModule),
}

#[derive(Debug, Clone)]
pub struct HostEntry {
    pub name: String,
    pub doc: String,
    pub binding: HostBinding,
}

/// Ordered set of global host bindings.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    entries: Vec<HostEntry>,
    index: HashMap<String, usize>,
}

//==================================================
// Section 2.0 - Registration
//==================================================

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the standard host library. `script_args`
    /// backs `os.args`.
    pub fn with_stdlib(script_args: Vec<String>) -> Self {
        let mut registry = Self::new();
        crate::stdlib::register_all(&mut registry, script_args);
        registry
    }

    // Re-registering a name replaces the earlier binding in place.
    fn insert(&mut self, entry: HostEntry) {
        match self.index.get(&entry.name) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.index.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn register_fn(
        &mut self,
        name: &str,
        arity: NativeArity,
        doc: &str,
        func: impl Fn(&mut Interpreter, Vec<Value>) -> Result<HostReturn, RuntimeError> + 'static,
    ) {
        self.insert(HostEntry {
            name: name.to_string(),
            doc: doc.to_string(),
            binding: HostBinding::Function {
                value: Value::native(name, arity, func),
                arity,
            },
        });
    }

    pub fn register_value(&mut self, name: &str, value: impl IntoValue, doc: &str) {
        self.insert(HostEntry {
            name: name.to_string(),
            doc: doc.to_string(),
            binding: HostBinding::Constant(value.into_value()),
        });
    }

    pub fn register_module(&mut self, module: HostModule, doc: &str) {
        self.insert(HostEntry {
            name: module.name.clone(),
            doc: doc.to_string(),
            binding: HostBinding::Module(module),
        });
    }

    pub fn get(&self, name: &str) -> Option<&HostEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    //==================================================
    // Section 3.0 - Installation
    //==================================================

    //Function: install
    //Purpose: Seed an interpreter's global frame with every registered binding
    //Inputs: interpreter - target runtime, called before `run`
    //Returns: None
    pub fn install(&self, interpreter: &mut Interpreter) {
        for entry in &self.entries {
            let value = match &entry.binding {
                HostBinding::Function { value, .. } | HostBinding::Constant(value) => value.clone(),
                HostBinding::Module(module) => module.build(),
            };
            interpreter.define_global(entry.name.clone(), value);
        }
        tracing::debug!(bindings = self.entries.len(), "host bindings installed");
    }

    /// Plain-text reference of every binding, in registration order.
    pub fn docs(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match &entry.binding {
                HostBinding::Function { arity, .. } => {
                    let _ = writeln!(out, "{} ({}) - {}", entry.name, arity.describe(), entry.doc);
                }
                HostBinding::Constant(value) => {
                    let _ = writeln!(out, "{} = {} - {}", entry.name, value, entry.doc);
                }
                HostBinding::Module(module) => {
                    let _ = writeln!(out, "{} - {}", entry.name, entry.doc);
                    for member in module.members() {
                        let _ = match member.arity {
                            Some(arity) => writeln!(
                                out,
                                "  {}.{} ({}) - {}",
                                entry.name,
                                member.name,
                                arity.describe(),
                                member.doc
                            ),
                            None => writeln!(out, "  {}.{} - {}", entry.name, member.name, member.doc),
                        };
                    }
                }
            }
        }
        out
    }
}

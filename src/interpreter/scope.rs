//=============================================
// src/interpreter/scope.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Frame stack backing variable resolution
// Objective: Keep one persistent global frame plus the active call's local
//            frames, and swap the locals out around every call
//=============================================

use super::value::Value;
use std::collections::HashMap;

pub type Frame = HashMap<String, Value>;

/// Frame 0 is the global frame. `locals` is empty at top level, so the
/// innermost frame there is the global one.
#[derive(Debug, Default)]
pub struct ScopeStack {
    globals: Frame,
    locals: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globals(&self) -> &Frame {
        &self.globals
    }

    pub fn depth(&self) -> usize {
        1 + self.locals.len()
    }

    fn innermost(&mut self) -> &mut Frame {
        match self.locals.last_mut() {
            Some(frame) => frame,
            None => &mut self.globals,
        }
    }

    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Declare in the innermost frame. Returns `false` if the name is already there.
    pub fn declare(&mut self, name: &str, value: Value) -> bool {
        let frame = self.innermost();
        if frame.contains_key(name) {
            return false;
        }
        frame.insert(name.to_string(), value);
        true
    }

    pub fn is_declared_here(&self, name: &str) -> bool {
        match self.locals.last() {
            Some(frame) => frame.contains_key(name),
            None => self.globals.contains_key(name),
        }
    }

    /// Write into the innermost frame, replacing any previous binding there.
    pub fn bind(&mut self, name: &str, value: Value) {
        self.innermost().insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Value> {
        for frame in self.locals.iter_mut().rev() {
            if let Some(slot) = frame.get_mut(name) {
                return Some(slot);
            }
        }
        self.globals.get_mut(name)
    }

    /// Replace the locals with a single fresh frame, handing back the caller's frames.
    pub fn enter_call(&mut self, frame: Frame) -> Vec<Frame> {
        std::mem::replace(&mut self.locals, vec![frame])
    }

    pub fn restore(&mut self, saved: Vec<Frame>) {
        self.locals = saved;
    }
}

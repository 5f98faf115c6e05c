//=============================================
// src/interpreter/value.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Clam runtime value model
// Objective: Define the closed value union, hash keys, callables and the
//            adapters host functions use to move between values and Rust types
//=============================================

use super::Interpreter;
use super::errors::RuntimeError;
use crate::ast::{Expr, Stmt};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

//=============================================
//            Section 1: Native Function Arity
//=============================================

/// Supported arity constraints for native (host) functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeArity {
    /// The function expects exactly this many arguments.
    Exact(usize),
    /// Inclusive minimum and optional maximum; `None` means no upper bound.
    Range { min: usize, max: Option<usize> },
}

impl NativeArity {
    pub fn at_least(min: usize) -> Self {
        NativeArity::Range { min, max: None }
    }

    pub fn accepts(&self, count: usize) -> bool {
        match self {
            NativeArity::Exact(n) => *n == count,
            NativeArity::Range { min, max } => {
                if count < *min {
                    return false;
                }
                match max {
                    Some(max) => count <= *max,
                    None => true,
                }
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            NativeArity::Exact(1) => "1 argument".to_string(),
            NativeArity::Exact(n) => format!("{} arguments", n),
            NativeArity::Range { min, max } => match max {
                Some(max) if min == max => format!("{} arguments", min),
                Some(max) => format!("{}..={} arguments", min, max),
                None => {
                    if *min == 0 {
                        "any number of arguments".to_string()
                    } else {
                        format!("at least {} arguments", min)
                    }
                }
            },
        }
    }
}

//=============================================
//            Section 2: Callables
//=============================================

/// A `sub` declaration or an anonymous function literal.
#[derive(Debug)]
pub struct UserFunction {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<[Stmt]>,
}

/// The callable produced by evaluating `{ expr }`.
#[derive(Debug)]
pub struct BlockFunction {
    pub body: Rc<Expr>,
}

/// Two shapes a host function may hand back. `Multiple` reaches scripts as an array.
#[derive(Debug, Clone, PartialEq)]
pub enum HostReturn {
    Single(Value),
    Multiple(Vec<Value>),
}

impl HostReturn {
    pub fn single(value: impl IntoValue) -> Self {
        HostReturn::Single(value.into_value())
    }

    pub fn into_value(self) -> Value {
        match self {
            HostReturn::Single(value) => value,
            HostReturn::Multiple(values) => Value::array(values),
        }
    }
}

impl From<Value> for HostReturn {
    fn from(value: Value) -> Self {
        HostReturn::Single(value)
    }
}

pub type NativeFn = dyn Fn(&mut Interpreter, Vec<Value>) -> Result<HostReturn, RuntimeError>;

pub struct NativeFunction {
    pub name: String,
    pub arity: NativeArity,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        arity: NativeArity,
        func: impl Fn(&mut Interpreter, Vec<Value>) -> Result<HostReturn, RuntimeError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Box::new(func),
        }
    }

    pub fn invoke(
        &self,
        interpreter: &mut Interpreter,
        args: Vec<Value>,
    ) -> Result<HostReturn, RuntimeError> {
        (self.func)(interpreter, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Function {
    User(Rc<UserFunction>),
    Block(Rc<BlockFunction>),
    Native(Rc<NativeFunction>),
}

impl Function {
    fn same(&self, other: &Function) -> bool {
        match (self, other) {
            (Function::User(a), Function::User(b)) => Rc::ptr_eq(a, b),
            (Function::Block(a), Function::Block(b)) => Rc::ptr_eq(a, b),
            (Function::Native(a), Function::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

//=============================================
//            Section 3: Runtime Values
//=============================================

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type HashRef = Rc<RefCell<HashMap<HashKey, Value>>>;

/// Clam runtime value types. Arrays and hashes are shared by reference.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Hash(HashRef),
    Function(Function),
}

impl Value {
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(values)))
    }

    pub fn hash(entries: HashMap<HashKey, Value>) -> Self {
        Value::Hash(Rc::new(RefCell::new(entries)))
    }

    pub fn native(
        name: impl Into<String>,
        arity: NativeArity,
        func: impl Fn(&mut Interpreter, Vec<Value>) -> Result<HostReturn, RuntimeError> + 'static,
    ) -> Self {
        Value::Function(Function::Native(Rc::new(NativeFunction::new(
            name, arity, func,
        ))))
    }

    /// `nil` and `false` are falsy; everything else, `0` and `""` included, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
            Value::Function(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Hash(a), Value::Hash(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.same(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(self, f, &mut Vec::new())
    }
}

// `open` holds the containers currently being printed; meeting one again
// prints `[...]` instead of recursing forever.
fn write_value(value: &Value, f: &mut fmt::Formatter<'_>, open: &mut Vec<*const ()>) -> fmt::Result {
    match value {
        Value::Nil => f.write_str("nil"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Number(n) => write!(f, "{}", format_number(*n)),
        Value::String(s) => f.write_str(s),
        Value::Array(items) => {
            let id = Rc::as_ptr(items).cast::<()>();
            if open.contains(&id) {
                return f.write_str("[...]");
            }
            open.push(id);
            let result = stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_value(item, f, open)?;
                }
                write!(f, "]")
            });
            open.pop();
            result
        }
        Value::Hash(entries) => {
            let id = Rc::as_ptr(entries).cast::<()>();
            if open.contains(&id) {
                return f.write_str("[...]");
            }
            let entries = sorted_entries(entries);
            if entries.is_empty() {
                return f.write_str("[:]");
            }
            open.push(id);
            let result = stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
                write!(f, "[")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    write_value(value, f, open)?;
                }
                write!(f, "]")
            });
            open.pop();
            result
        }
        Value::Function(Function::User(func)) => match &func.name {
            Some(name) => write!(f, "<sub {}>", name),
            None => f.write_str("<sub>"),
        },
        Value::Function(Function::Block(_)) => f.write_str("<block>"),
        Value::Function(Function::Native(func)) => write!(f, "<native {}>", func.name),
    }
}

// Integral values print without a fraction; infinities and NaN use signed names.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { '+' } else { '-' };
        format!("{sign}Inf")
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

//=============================================
//            Section 4: Hash Keys
//=============================================

/// Hashable projection of the scalar values. Collections and functions cannot be keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Nil,
    Bool(bool),
    Number(u64),
    String(String),
}

impl HashKey {
    pub fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Nil => Ok(HashKey::Nil),
            Value::Bool(b) => Ok(HashKey::Bool(*b)),
            Value::Number(n) => Ok(HashKey::number(*n)),
            Value::String(s) => Ok(HashKey::String(s.clone())),
            other => Err(RuntimeError::type_error(format!(
                "a {} cannot be used as a hash key",
                other.type_name()
            ))),
        }
    }

    pub fn number(n: f64) -> Self {
        let normalized = if n == 0.0 {
            0.0
        } else if n.is_nan() {
            f64::NAN
        } else {
            n
        };
        HashKey::Number(normalized.to_bits())
    }

    pub fn to_value(&self) -> Value {
        match self {
            HashKey::Nil => Value::Nil,
            HashKey::Bool(b) => Value::Bool(*b),
            HashKey::Number(bits) => Value::Number(f64::from_bits(*bits)),
            HashKey::String(s) => Value::String(s.clone()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            HashKey::Nil => 0,
            HashKey::Bool(_) => 1,
            HashKey::Number(_) => 2,
            HashKey::String(_) => 3,
        }
    }

    fn compare(&self, other: &HashKey) -> Ordering {
        match (self, other) {
            (HashKey::Bool(a), HashKey::Bool(b)) => a.cmp(b),
            (HashKey::Number(a), HashKey::Number(b)) => {
                f64::from_bits(*a).total_cmp(&f64::from_bits(*b))
            }
            (HashKey::String(a), HashKey::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl From<&str> for HashKey {
    fn from(value: &str) -> Self {
        HashKey::String(value.to_string())
    }
}

/// Snapshot of a hash's entries in a stable key order.
pub fn sorted_entries(hash: &HashRef) -> Vec<(HashKey, Value)> {
    let mut entries: Vec<(HashKey, Value)> = hash
        .borrow()
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    entries.sort_by(|(a, _), (b, _)| a.compare(b));
    entries
}

//=============================================
//            Section 5: Host Adapters
//=============================================

/// Conversion from a script value into a native parameter type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, RuntimeError>;
}

/// Conversion from a native return type into a script value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

fn mismatch(expected: &str, found: &Value) -> RuntimeError {
    RuntimeError::type_error(format!("expected {}, found {}", expected, found.type_name()))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        Ok(value.clone())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        value.as_number().ok_or_else(|| mismatch("number", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => Ok(*n as i64),
            Value::Number(_) => Err(RuntimeError::type_error(format!(
                "expected integer, found {}",
                value
            ))),
            other => Err(mismatch("integer", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("boolean", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

impl FromValue for ArrayRef {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Array(items) => Ok(Rc::clone(items)),
            other => Err(mismatch("array", other)),
        }
    }
}

impl FromValue for HashRef {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Hash(entries) => Ok(Rc::clone(entries)),
            other => Err(mismatch("hash", other)),
        }
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Nil
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Number(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl IntoValue for usize {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Nil,
        }
    }
}

/// Fetch and convert positional argument `index` for host function `function`.
pub fn arg<T: FromValue>(args: &[Value], index: usize, function: &str) -> Result<T, RuntimeError> {
    let value = args.get(index).ok_or_else(|| {
        RuntimeError::arity_mismatch(format!("{function}: missing argument {}", index + 1))
    })?;
    T::from_value(value).map_err(|err| {
        RuntimeError::type_error(format!("{function}: argument {}: {}", index + 1, err.message))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_only_rejects_nil_and_false() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
        assert!(Value::array(Vec::new()).is_truthy());
    }

    #[test]
    fn numbers_format_like_script_literals() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "+Inf");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn collections_render_with_brackets() {
        let array = Value::array(vec![Value::Number(1.0), Value::String("a".into())]);
        assert_eq!(array.to_string(), "[1, a]");

        let hash = Value::hash(HashMap::from([
            (HashKey::from("b"), Value::Number(2.0)),
            (HashKey::from("a"), Value::Number(1.0)),
        ]));
        assert_eq!(hash.to_string(), "[a: 1, b: 2]");
        assert_eq!(Value::hash(HashMap::new()).to_string(), "[:]");
    }

    #[test]
    fn self_referencing_collections_print_a_marker() {
        let array = Value::array(vec![Value::Number(0.0)]);
        if let Value::Array(items) = &array {
            items.borrow_mut()[0] = array.clone();
        }
        assert_eq!(array.to_string(), "[[...]]");

        let hash = Value::hash(HashMap::new());
        if let Value::Hash(entries) = &hash {
            entries.borrow_mut().insert(HashKey::from("self"), hash.clone());
        }
        assert_eq!(hash.to_string(), "[self: [...]]");

        // Repeated siblings are not cycles.
        let inner = Value::array(vec![Value::Number(1.0)]);
        let outer = Value::array(vec![inner.clone(), inner]);
        assert_eq!(outer.to_string(), "[[1], [1]]");
    }

    #[test]
    fn equality_is_by_kind_then_value_or_identity() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_ne!(Value::Number(1.0), Value::String("1".into()));
        assert_ne!(Value::Nil, Value::Bool(false));

        let shared = Value::array(vec![Value::Number(1.0)]);
        assert_eq!(shared, shared.clone());
        assert_ne!(shared, Value::array(vec![Value::Number(1.0)]));
    }

    #[test]
    fn zero_keys_are_normalised() {
        assert_eq!(HashKey::number(0.0), HashKey::number(-0.0));
        assert!(HashKey::from_value(&Value::array(Vec::new())).is_err());
    }

    #[test]
    fn arity_describes_ranges() {
        assert!(NativeArity::Exact(2).accepts(2));
        assert!(!NativeArity::Exact(2).accepts(3));
        assert!(NativeArity::at_least(1).accepts(5));
        assert!(!NativeArity::at_least(1).accepts(0));
        assert_eq!(NativeArity::at_least(0).describe(), "any number of arguments");
        assert_eq!(
            NativeArity::Range {
                min: 1,
                max: Some(2)
            }
            .describe(),
            "1..=2 arguments"
        );
    }

    #[test]
    fn adapters_convert_and_report_mismatches() {
        let args = vec![Value::Number(4.0), Value::String("x".into())];
        assert_eq!(arg::<i64>(&args, 0, "f").ok(), Some(4));
        assert_eq!(arg::<String>(&args, 1, "f").ok(), Some("x".to_string()));
        let err = arg::<f64>(&args, 1, "f").unwrap_err();
        assert!(err.message.contains("expected number"), "got {}", err.message);
        assert_eq!(vec![1_i64, 2].into_value().to_string(), "[1, 2]");
        assert_eq!(
            HostReturn::Multiple(vec![Value::Nil, Value::Bool(true)]).into_value().to_string(),
            "[nil, true]"
        );
    }
}

//==================================================
// File: interpreter/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Tree-walking evaluator for Clam programs
// Objective: Execute statements top to bottom over a global frame plus
//            per-call local frames, carrying return and loop control as an
//            explicit flow result kept apart from fatal errors
//==================================================

pub mod errors;
pub mod scope;
pub mod value;

pub use errors::{ErrorCode, RuntimeError, RuntimeErrorKind, ScriptError};
pub use value::{
    ArrayRef, Function, FromValue, HashKey, HashRef, HostReturn, IntoValue, NativeArity,
    NativeFunction, Value,
};

use crate::ast::{BinaryOp, Branch, Expr, Program, Stmt, UnaryOp};
use scope::{Frame, ScopeStack};
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, trace};
use value::{BlockFunction, UserFunction, sorted_entries};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

// Remaining stack that triggers growth, and the size of each new segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

//==================================================
// Section 1.0 - Control Flow
//==================================================

/// Outcome of executing a statement. Only `Normal` lets the next sibling run.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
    Next,
}

// `Some` ends the loop with the given flow.
fn after_iteration(flow: Flow) -> Option<Flow> {
    match flow {
        Flow::Normal | Flow::Next => None,
        Flow::Break => Some(Flow::Normal),
        Flow::Return(value) => Some(Flow::Return(value)),
    }
}

//==================================================
// Section 2.0 - Interpreter
//==================================================

pub struct Interpreter {
    scopes: ScopeStack,
    call_depth: usize,
    max_call_depth: usize,
    output: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter writing program output to the process stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    pub fn with_output(output: impl Write + 'static) -> Self {
        Self {
            scopes: ScopeStack::new(),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            output: Box::new(output),
        }
    }

    pub fn set_max_call_depth(&mut self, depth: usize) {
        self.max_call_depth = depth;
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Install a binding into the global frame, replacing any previous one.
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.scopes.define_global(name, value);
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.scopes.globals().get(name)
    }

    /// Sink used by the output host functions.
    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    //Function: run
    //Purpose: Execute a whole program to completion
    //Inputs: program - parsed statement list
    //Returns: Ok(()) or the first fatal runtime error
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        debug!(statements = program.statements.len(), "starting run");
        let result = self.run_statements(&program.statements);
        let flushed = self.output.flush();
        match &result {
            Ok(()) => debug!("run finished"),
            Err(err) => debug!(error = %err, "run aborted"),
        }
        result?;
        flushed.map_err(RuntimeError::from)
    }

    fn run_statements(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Normal => {}
                Flow::Return(_) => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::ReturnOutsideFunction,
                        "'return' used outside of a sub",
                    )
                    .at(stmt.position()));
                }
                Flow::Break | Flow::Next => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::LoopControlOutsideLoop,
                        "'break' or 'next' used outside of a loop",
                    )
                    .at(stmt.position()));
                }
            }
        }
        Ok(())
    }

    //==================================================
    // Section 3.0 - Statements
    //==================================================

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.execute_node(stmt).map_err(|err| err.at(stmt.position()))
        })
    }

    fn execute_block(&mut self, body: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in body {
            let flow = self.execute(stmt)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn execute_node(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::My { name, value, .. } => {
                if self.scopes.is_declared_here(name) {
                    return Err(RuntimeError::duplicate_definition(name));
                }
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                if !self.scopes.declare(name, value) {
                    return Err(RuntimeError::duplicate_definition(name));
                }
                Ok(Flow::Normal)
            }
            Stmt::Sub {
                name, params, body, ..
            } => {
                let function = UserFunction {
                    name: Some(name.clone()),
                    params: params.clone(),
                    body: Rc::clone(body),
                };
                if !self
                    .scopes
                    .declare(name, Value::Function(Function::User(Rc::new(function))))
                {
                    return Err(RuntimeError::duplicate_definition(name));
                }
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                body,
                else_ifs,
                else_body,
                ..
            } => {
                let taken = self.evaluate(condition)?.is_truthy();
                self.execute_conditional(taken, body, else_ifs, else_body.as_deref())
            }
            Stmt::Unless {
                condition,
                body,
                else_ifs,
                else_body,
                ..
            } => {
                let taken = !self.evaluate(condition)?.is_truthy();
                self.execute_conditional(taken, body, else_ifs, else_body.as_deref())
            }
            Stmt::While {
                condition, body, ..
            } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Some(flow) = after_iteration(self.execute_block(body)?) {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Until {
                condition, body, ..
            } => {
                while !self.evaluate(condition)?.is_truthy() {
                    if let Some(flow) = after_iteration(self.execute_block(body)?) {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::DoWhile {
                body, condition, ..
            } => loop {
                if let Some(flow) = after_iteration(self.execute_block(body)?) {
                    return Ok(flow);
                }
                if !self.evaluate(condition)?.is_truthy() {
                    return Ok(Flow::Normal);
                }
            },
            Stmt::DoUntil {
                body, condition, ..
            } => loop {
                if let Some(flow) = after_iteration(self.execute_block(body)?) {
                    return Ok(flow);
                }
                if self.evaluate(condition)?.is_truthy() {
                    return Ok(Flow::Normal);
                }
            },
            Stmt::For {
                variable,
                iterable,
                body,
                ..
            } => self.execute_for(variable, iterable, body),
            Stmt::When {
                cases, else_body, ..
            } => {
                for case in cases {
                    if self.evaluate(&case.condition)?.is_truthy() {
                        return self.execute_block(&case.body);
                    }
                }
                self.execute_else(else_body.as_deref())
            }
            Stmt::WhenMatch {
                value,
                cases,
                else_body,
                ..
            } => {
                let scrutinee = self.evaluate(value)?;
                for case in cases {
                    if self.evaluate(&case.condition)? == scrutinee {
                        return self.execute_block(&case.body);
                    }
                }
                self.execute_else(else_body.as_deref())
            }
            Stmt::Call { callee, args, .. } => {
                let callee = self.evaluate(callee)?;
                let args = self.evaluate_args(args)?;
                self.call_value(&callee, args)?;
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Assign { target, value, .. } => {
                self.assign(target, value)?;
                Ok(Flow::Normal)
            }
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Next { .. } => Ok(Flow::Next),
            Stmt::Increment { target, amount, .. } => {
                self.step(target, amount.as_ref(), 1.0)?;
                Ok(Flow::Normal)
            }
            Stmt::Decrement { target, amount, .. } => {
                self.step(target, amount.as_ref(), -1.0)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn execute_conditional(
        &mut self,
        taken: bool,
        body: &[Stmt],
        else_ifs: &[Branch],
        else_body: Option<&[Stmt]>,
    ) -> Result<Flow, RuntimeError> {
        if taken {
            return self.execute_block(body);
        }
        for branch in else_ifs {
            if self.evaluate(&branch.condition)?.is_truthy() {
                return self.execute_block(&branch.body);
            }
        }
        self.execute_else(else_body)
    }

    fn execute_else(&mut self, else_body: Option<&[Stmt]>) -> Result<Flow, RuntimeError> {
        match else_body {
            Some(body) => self.execute_block(body),
            None => Ok(Flow::Normal),
        }
    }

    // The loop variable lives in the current frame and outlives the loop.
    fn execute_for(
        &mut self,
        variable: &str,
        iterable: &Expr,
        body: &[Stmt],
    ) -> Result<Flow, RuntimeError> {
        let subject = self.evaluate(iterable)?;
        let items: Vec<Value> = match &subject {
            Value::Array(items) => items.borrow().clone(),
            Value::Hash(entries) => sorted_entries(entries)
                .into_iter()
                .map(|(key, value)| Value::array(vec![key.to_value(), value]))
                .collect(),
            other => {
                return Err(RuntimeError::type_error(format!(
                    "cannot iterate over a {}",
                    other.type_name()
                ))
                .at(iterable.position()));
            }
        };
        for item in items {
            self.scopes.bind(variable, item);
            if let Some(flow) = after_iteration(self.execute_block(body)?) {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    //==================================================
    // Section 4.0 - Assignment and Stepping
    //==================================================

    fn assign(&mut self, target: &Expr, value: &Expr) -> Result<(), RuntimeError> {
        match target {
            Expr::Variable { name, .. } => {
                let value = self.evaluate(value)?;
                match self.scopes.lookup_mut(name) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(RuntimeError::undefined_variable(name).at(target.position())),
                }
            }
            Expr::Index { object, index, .. } => {
                let container = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                match &container {
                    Value::Array(items) => {
                        let len = items.borrow().len();
                        array_slot(&index, len).map_err(|err| err.at(target.position()))?;
                        let value = self.evaluate(value)?;
                        let mut items = items.borrow_mut();
                        let slot =
                            array_slot(&index, items.len()).map_err(|err| err.at(target.position()))?;
                        items[slot] = value;
                        Ok(())
                    }
                    Value::Hash(entries) => {
                        let key = HashKey::from_value(&index).map_err(|err| err.at(target.position()))?;
                        if !entries.borrow().contains_key(&key) {
                            return Err(RuntimeError::key_not_found(&key).at(target.position()));
                        }
                        let value = self.evaluate(value)?;
                        entries.borrow_mut().insert(key, value);
                        Ok(())
                    }
                    other => Err(RuntimeError::type_error(format!(
                        "cannot assign through an index on a {}",
                        other.type_name()
                    ))
                    .at(target.position())),
                }
            }
            Expr::Member {
                object, property, ..
            } => {
                let container = self.evaluate(object)?;
                let Value::Hash(entries) = &container else {
                    return Err(RuntimeError::type_error(format!(
                        "cannot assign member '{property}' on a {}",
                        container.type_name()
                    ))
                    .at(target.position()));
                };
                let value = self.evaluate(value)?;
                entries
                    .borrow_mut()
                    .insert(HashKey::String(property.clone()), value);
                Ok(())
            }
            other => Err(RuntimeError::type_error("invalid assignment target").at(other.position())),
        }
    }

    //Function: step
    //Purpose: Shared body of inc/dec; `sign` is +1 or -1
    //Inputs: target - assignable expression, amount - optional `by` expression
    //Returns: The stored value after the update
    fn step(
        &mut self,
        target: &Expr,
        amount: Option<&Expr>,
        sign: f64,
    ) -> Result<Value, RuntimeError> {
        let by = match amount {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Number(1.0),
        };
        let Value::Number(by) = by else {
            return Err(RuntimeError::type_error(format!(
                "'by' amount must be a number, found {}",
                by.type_name()
            )));
        };
        let delta = by * sign;

        match target {
            Expr::Variable { name, .. } => {
                let slot = self
                    .scopes
                    .lookup_mut(name)
                    .ok_or_else(|| RuntimeError::undefined_variable(name))?;
                bump(slot, delta)
            }
            Expr::Index { object, index, .. } => {
                let container = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                match &container {
                    Value::Array(items) => {
                        let mut items = items.borrow_mut();
                        let slot = array_slot(&index, items.len())?;
                        bump(&mut items[slot], delta)
                    }
                    Value::Hash(entries) => {
                        let key = HashKey::from_value(&index)?;
                        let mut entries = entries.borrow_mut();
                        let slot = entries
                            .get_mut(&key)
                            .ok_or_else(|| RuntimeError::key_not_found(&key))?;
                        bump(slot, delta)
                    }
                    other => Err(RuntimeError::type_error(format!(
                        "cannot index a {}",
                        other.type_name()
                    ))),
                }
            }
            Expr::Member {
                object, property, ..
            } => {
                let container = self.evaluate(object)?;
                let Value::Hash(entries) = &container else {
                    return Err(RuntimeError::type_error(format!(
                        "cannot access member '{property}' on a {}",
                        container.type_name()
                    )));
                };
                let key = HashKey::String(property.clone());
                let mut entries = entries.borrow_mut();
                let slot = entries
                    .get_mut(&key)
                    .ok_or_else(|| RuntimeError::key_not_found(property))?;
                bump(slot, delta)
            }
            _ => Err(RuntimeError::type_error("invalid increment target")),
        }
    }

    //==================================================
    // Section 5.0 - Expressions
    //==================================================

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.evaluate_node(expr).map_err(|err| err.at(expr.position()))
        })
    }

    fn evaluate_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    fn evaluate_node(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::String { value, .. } => Ok(Value::String(value.clone())),
            Expr::Boolean { value, .. } => Ok(Value::Bool(*value)),
            Expr::Nil { .. } => Ok(Value::Nil),
            Expr::Array { elements, .. } => Ok(Value::array(self.evaluate_args(elements)?)),
            Expr::Hash { entries, .. } => {
                let mut map = HashMap::with_capacity(entries.len());
                for (key_expr, value_expr) in entries {
                    let key = self.evaluate(key_expr)?;
                    let key = HashKey::from_value(&key).map_err(|err| err.at(key_expr.position()))?;
                    let value = self.evaluate(value_expr)?;
                    map.insert(key, value);
                }
                Ok(Value::hash(map))
            }
            Expr::Variable { name, .. } => self
                .scopes
                .lookup(name)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_variable(name)),
            Expr::Index { object, index, .. } => {
                let container = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                index_value(&container, &index)
            }
            Expr::Member {
                object, property, ..
            } => {
                let container = self.evaluate(object)?;
                let Value::Hash(entries) = &container else {
                    return Err(RuntimeError::type_error(format!(
                        "cannot access member '{property}' on a {}",
                        container.type_name()
                    )));
                };
                let found = entries
                    .borrow()
                    .get(&HashKey::String(property.clone()))
                    .cloned();
                found.ok_or_else(|| RuntimeError::key_not_found(property))
            }
            Expr::Call { callee, args, .. } => {
                let callee = self.evaluate(callee)?;
                let args = self.evaluate_args(args)?;
                self.call_value(&callee, args)
            }
            Expr::Unary {
                operator, operand, ..
            } => {
                let operand = self.evaluate(operand)?;
                match operator {
                    UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                    UnaryOp::Negate => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(RuntimeError::type_error(format!(
                            "cannot negate a {}",
                            other.type_name()
                        ))),
                    },
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.evaluate(left)?;
                match operator {
                    BinaryOp::And if !left.is_truthy() => return Ok(left),
                    BinaryOp::Or if left.is_truthy() => return Ok(left),
                    _ => {}
                }
                let right = self.evaluate(right)?;
                apply_binary(*operator, left, right)
            }
            Expr::Block { body, .. } => Ok(Value::Function(Function::Block(Rc::new(
                BlockFunction {
                    body: Rc::clone(body),
                },
            )))),
            Expr::Function { params, body, .. } => Ok(Value::Function(Function::User(Rc::new(
                UserFunction {
                    name: None,
                    params: params.clone(),
                    body: Rc::clone(body),
                },
            )))),
            Expr::Increment { target, amount, .. } => self.step(target, amount.as_deref(), 1.0),
            Expr::Decrement { target, amount, .. } => self.step(target, amount.as_deref(), -1.0),
        }
    }

    //==================================================
    // Section 6.0 - Calls
    //==================================================

    //Function: call_value
    //Purpose: Single dispatch point for subs, blocks and host functions
    //Inputs: callee - value in call position, args - evaluated arguments
    //Returns: The call's result; multiple host results arrive as an array
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let Value::Function(function) = callee else {
            return Err(RuntimeError::type_error(format!(
                "a {} is not callable",
                callee.type_name()
            )));
        };
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::new(
                RuntimeErrorKind::StackOverflow,
                format!("call depth exceeded {}", self.max_call_depth),
            ));
        }
        trace!(callee = %callee, args = args.len(), depth = self.call_depth, "call");

        self.call_depth += 1;
        let result = match function {
            Function::Native(native) => self.call_native(native, args),
            Function::User(user) => self.call_user(user, args),
            Function::Block(block) => self.call_block(block, args),
        };
        self.call_depth -= 1;
        result
    }

    fn call_native(
        &mut self,
        native: &NativeFunction,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if !native.arity.accepts(args.len()) {
            return Err(RuntimeError::arity_mismatch(format!(
                "{} expects {}, got {}",
                native.name,
                native.arity.describe(),
                args.len()
            )));
        }
        native.invoke(self, args).map(HostReturn::into_value)
    }

    // Extra arguments are ignored; missing ones are fatal.
    fn call_user(&mut self, function: &UserFunction, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if args.len() < function.params.len() {
            let name = function.name.as_deref().unwrap_or("<anonymous>");
            return Err(RuntimeError::arity_mismatch(format!(
                "{name} expects {} arguments, got {}",
                function.params.len(),
                args.len()
            )));
        }
        let frame: Frame = function.params.iter().cloned().zip(args).collect();
        let saved = self.scopes.enter_call(frame);
        let outcome = self.execute_block(&function.body);
        self.scopes.restore(saved);

        match outcome? {
            Flow::Normal => Ok(Value::Nil),
            Flow::Return(value) => Ok(value),
            Flow::Break | Flow::Next => Err(RuntimeError::new(
                RuntimeErrorKind::LoopControlOutsideLoop,
                "'break' or 'next' escaped a sub body",
            )),
        }
    }

    fn call_block(&mut self, block: &BlockFunction, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let Some(it) = args.into_iter().next() else {
            return Err(RuntimeError::arity_mismatch(
                "a block expects 1 argument, got 0",
            ));
        };
        let saved = self.scopes.enter_call(Frame::from([("it".to_string(), it)]));
        let result = self.evaluate(&block.body);
        self.scopes.restore(saved);
        result
    }
}

//==================================================
// Section 7.0 - Operators and Indexing
//==================================================

fn numeric_operands(op: BinaryOp, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::type_error(format!(
            "operator '{op}' cannot be applied to {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::String(mut text), right) => {
                text.push_str(&right.to_string());
                Ok(Value::String(text))
            }
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (left, right) => Err(RuntimeError::type_error(format!(
                "operator '+' cannot be applied to {} and {}",
                left.type_name(),
                right.type_name()
            ))),
        },
        BinaryOp::Subtract => numeric_operands(op, &left, &right).map(|(a, b)| Value::Number(a - b)),
        BinaryOp::Multiply => numeric_operands(op, &left, &right).map(|(a, b)| Value::Number(a * b)),
        BinaryOp::Divide => numeric_operands(op, &left, &right).map(|(a, b)| Value::Number(a / b)),
        BinaryOp::Modulo => {
            let (a, b) = numeric_operands(op, &left, &right)?;
            let divisor = b as i64;
            if divisor == 0 {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::DivisionByZero,
                    format!("{} % {}", Value::Number(a), Value::Number(b)),
                ));
            }
            Ok(Value::Number((a as i64).wrapping_rem(divisor) as f64))
        }
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOp::Less => numeric_operands(op, &left, &right).map(|(a, b)| Value::Bool(a < b)),
        BinaryOp::LessEqual => numeric_operands(op, &left, &right).map(|(a, b)| Value::Bool(a <= b)),
        BinaryOp::Greater => numeric_operands(op, &left, &right).map(|(a, b)| Value::Bool(a > b)),
        BinaryOp::GreaterEqual => {
            numeric_operands(op, &left, &right).map(|(a, b)| Value::Bool(a >= b))
        }
        // Reached only once the left operand failed to short-circuit.
        BinaryOp::And | BinaryOp::Or => Ok(right),
    }
}

fn array_slot(index: &Value, len: usize) -> Result<usize, RuntimeError> {
    let Value::Number(n) = index else {
        return Err(RuntimeError::type_error(format!(
            "array index must be a number, found {}",
            index.type_name()
        )));
    };
    if n.fract() != 0.0 {
        return Err(RuntimeError::type_error(format!(
            "array index must be an integer, found {index}"
        )));
    }
    if *n < 0.0 || *n >= len as f64 {
        return Err(RuntimeError::index_out_of_range(*n, len));
    }
    Ok(*n as usize)
}

fn index_value(container: &Value, index: &Value) -> Result<Value, RuntimeError> {
    match container {
        Value::Array(items) => {
            let items = items.borrow();
            let slot = array_slot(index, items.len())?;
            Ok(items[slot].clone())
        }
        Value::Hash(entries) => {
            let key = HashKey::from_value(index)?;
            let found = entries.borrow().get(&key).cloned();
            found.ok_or_else(|| RuntimeError::key_not_found(&key))
        }
        other => Err(RuntimeError::type_error(format!(
            "cannot index a {}",
            other.type_name()
        ))),
    }
}

fn bump(slot: &mut Value, delta: f64) -> Result<Value, RuntimeError> {
    match slot {
        Value::Number(n) => {
            *n += delta;
            Ok(Value::Number(*n))
        }
        other => Err(RuntimeError::type_error(format!(
            "cannot step a {}",
            other.type_name()
        ))),
    }
}

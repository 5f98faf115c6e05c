//==================================================
// File: interpreter/errors.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Runtime error taxonomy and user-facing error codes
// Objective: Give every fatal condition a kind, a message and a position,
//            and map lexer, parser and runtime failures onto stable codes
//==================================================

use crate::parser::ParseError;
use crate::tokenizer::{LexError, Position};
use std::fmt;
use thiserror::Error;

//==================================================
// Section 1.0 - Runtime Errors
//==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    DuplicateDefinition,
    UndefinedVariable,
    TypeError,
    IndexOutOfRange,
    KeyNotFound,
    ArityMismatch,
    DivisionByZero,
    StackOverflow,
    ReturnOutsideFunction,
    LoopControlOutsideLoop,
    Host,
    /// Raised by `os.exit`; the driver ends the process with this status.
    Exit(i32),
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuntimeErrorKind::DuplicateDefinition => "duplicate definition",
            RuntimeErrorKind::UndefinedVariable => "undefined variable",
            RuntimeErrorKind::TypeError => "type error",
            RuntimeErrorKind::IndexOutOfRange => "index out of range",
            RuntimeErrorKind::KeyNotFound => "key not found",
            RuntimeErrorKind::ArityMismatch => "arity mismatch",
            RuntimeErrorKind::DivisionByZero => "division by zero",
            RuntimeErrorKind::StackOverflow => "stack overflow",
            RuntimeErrorKind::ReturnOutsideFunction => "return outside function",
            RuntimeErrorKind::LoopControlOutsideLoop => "loop control outside loop",
            RuntimeErrorKind::Host => "host error",
            RuntimeErrorKind::Exit(_) => "exit",
        };
        f.write_str(label)
    }
}

/// A fatal runtime failure. Positions are filled in by the innermost node that knows one.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}{}", describe_position(.position))]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub position: Option<Position>,
}

fn describe_position(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!(" at {position}"),
        None => String::new(),
    }
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    pub fn duplicate_definition(name: &str) -> Self {
        Self::new(
            RuntimeErrorKind::DuplicateDefinition,
            format!("'{name}' is already defined in this scope"),
        )
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(
            RuntimeErrorKind::UndefinedVariable,
            format!("'{name}' is not defined"),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::TypeError, message)
    }

    pub fn index_out_of_range(index: f64, len: usize) -> Self {
        Self::new(
            RuntimeErrorKind::IndexOutOfRange,
            format!("index {index} is outside an array of length {len}"),
        )
    }

    pub fn key_not_found(key: impl fmt::Display) -> Self {
        Self::new(RuntimeErrorKind::KeyNotFound, format!("key '{key}' not found"))
    }

    pub fn arity_mismatch(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::ArityMismatch, message)
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Host, message)
    }

    pub fn exit(status: i32) -> Self {
        Self::new(RuntimeErrorKind::Exit(status), format!("status {status}"))
    }

    pub fn exit_status(&self) -> Option<i32> {
        match self.kind {
            RuntimeErrorKind::Exit(status) => Some(status),
            _ => None,
        }
    }

    /// Attach a position unless a more precise one is already present.
    pub fn at(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        RuntimeError::host(format!("I/O failure: {value}"))
    }
}

//==================================================
// Section 2.0 - Error Codes
//==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Syntax,
    Lexical,
    TypeMismatch,
    InvalidOperation,
    RuntimePanic,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Syntax => "E001",
            ErrorCode::Lexical => "E002",
            ErrorCode::TypeMismatch => "E003",
            ErrorCode::InvalidOperation => "E004",
            ErrorCode::RuntimePanic => "E005",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("[{}] {message}", .code.as_str())]
pub struct ScriptError {
    pub code: ErrorCode,
    pub message: String,
    pub position: Option<Position>,
}

impl ScriptError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            position: None,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl From<LexError> for ScriptError {
    fn from(value: LexError) -> Self {
        let position = Some(value.position());
        Self {
            position,
            ..ScriptError::new(ErrorCode::Lexical, value.to_string())
        }
    }
}

impl From<ParseError> for ScriptError {
    fn from(value: ParseError) -> Self {
        match value {
            ParseError::Lex(err) => err.into(),
            other => {
                let position = Some(other.position());
                Self {
                    position,
                    ..ScriptError::new(ErrorCode::Syntax, other.to_string())
                }
            }
        }
    }
}

impl From<RuntimeError> for ScriptError {
    fn from(value: RuntimeError) -> Self {
        Self {
            position: value.position,
            ..ScriptError::new(runtime_error_code(&value), value.to_string())
        }
    }
}

pub fn runtime_error_code(error: &RuntimeError) -> ErrorCode {
    match error.kind {
        RuntimeErrorKind::TypeError => ErrorCode::TypeMismatch,
        RuntimeErrorKind::DuplicateDefinition
        | RuntimeErrorKind::UndefinedVariable
        | RuntimeErrorKind::IndexOutOfRange
        | RuntimeErrorKind::KeyNotFound
        | RuntimeErrorKind::ArityMismatch
        | RuntimeErrorKind::DivisionByZero => ErrorCode::InvalidOperation,
        RuntimeErrorKind::StackOverflow
        | RuntimeErrorKind::ReturnOutsideFunction
        | RuntimeErrorKind::LoopControlOutsideLoop
        | RuntimeErrorKind::Host
        | RuntimeErrorKind::Exit(_) => ErrorCode::RuntimePanic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_position_wins() {
        let err = RuntimeError::undefined_variable("x")
            .at(Position::new(3, 4))
            .at(Position::new(1, 1));
        assert_eq!(err.position, Some(Position::new(3, 4)));
        assert_eq!(
            err.to_string(),
            "undefined variable: 'x' is not defined at 3:4"
        );
    }

    #[test]
    fn codes_follow_error_family() {
        let type_error: ScriptError = RuntimeError::type_error("bad").into();
        assert_eq!(type_error.code_str(), "E003");

        let missing: ScriptError = RuntimeError::key_not_found("k").into();
        assert_eq!(missing.code_str(), "E004");

        let lex: ScriptError = ParseError::Lex(LexError::UnterminatedString {
            position: Position::new(2, 5),
        })
        .into();
        assert_eq!(lex.code_str(), "E002");
        assert_eq!(lex.position, Some(Position::new(2, 5)));
    }
}

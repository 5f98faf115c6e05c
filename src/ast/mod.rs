//=====================================================
// File: ast/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Clam Abstract Syntax Tree definitions
// Objective: Define statement and expression nodes produced by the parser,
//            each tagged with the source position it started at
//=====================================================

use crate::tokenizer::Position;
use std::fmt;
use std::rc::Rc;

//=====================================================
// Section 1.0 - Operators
//=====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
            UnaryOp::Negate => f.write_str("-"),
        }
    }
}

//=====================================================
// Section 2.0 - Expressions
//=====================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer and float literals share one payload.
    Number {
        value: f64,
        position: Position,
    },
    String {
        value: String,
        position: Position,
    },
    Boolean {
        value: bool,
        position: Position,
    },
    Nil {
        position: Position,
    },
    Array {
        elements: Vec<Expr>,
        position: Position,
    },
    /// Key/value pairs in source order.
    Hash {
        entries: Vec<(Expr, Expr)>,
        position: Position,
    },
    Variable {
        name: String,
        position: Position,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        position: Position,
    },
    Member {
        object: Box<Expr>,
        property: String,
        position: Position,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        position: Position,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        position: Position,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        position: Position,
    },
    /// `{ expr }`, a one-argument callable that sees its argument as `it`.
    Block {
        body: Rc<Expr>,
        position: Position,
    },
    /// Anonymous function with named parameters. No source syntax produces it yet.
    Function {
        params: Vec<String>,
        body: Rc<[Stmt]>,
        position: Position,
    },
    Increment {
        target: Box<Expr>,
        amount: Option<Box<Expr>>,
        position: Position,
    },
    Decrement {
        target: Box<Expr>,
        amount: Option<Box<Expr>>,
        position: Position,
    },
}

impl Expr {
    pub fn position(&self) -> Position {
        match self {
            Expr::Number { position, .. }
            | Expr::String { position, .. }
            | Expr::Boolean { position, .. }
            | Expr::Nil { position }
            | Expr::Array { position, .. }
            | Expr::Hash { position, .. }
            | Expr::Variable { position, .. }
            | Expr::Index { position, .. }
            | Expr::Member { position, .. }
            | Expr::Call { position, .. }
            | Expr::Unary { position, .. }
            | Expr::Binary { position, .. }
            | Expr::Block { position, .. }
            | Expr::Function { position, .. }
            | Expr::Increment { position, .. }
            | Expr::Decrement { position, .. } => *position,
        }
    }

    /// Whether the expression may appear on the left of `=` or as an `inc`/`dec` target.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expr::Variable { .. } | Expr::Index { .. } | Expr::Member { .. }
        )
    }
}

//=====================================================
// Section 3.0 - Statements
//=====================================================

/// One `else if`, `when` case, or `when <value>` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    My {
        name: String,
        value: Option<Expr>,
        position: Position,
    },
    Sub {
        name: String,
        params: Vec<String>,
        body: Rc<[Stmt]>,
        position: Position,
    },
    If {
        condition: Expr,
        body: Vec<Stmt>,
        else_ifs: Vec<Branch>,
        else_body: Option<Vec<Stmt>>,
        position: Position,
    },
    /// Like `If` with the leading condition negated; the else-if chain is unchanged.
    Unless {
        condition: Expr,
        body: Vec<Stmt>,
        else_ifs: Vec<Branch>,
        else_body: Option<Vec<Stmt>>,
        position: Position,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        position: Position,
    },
    Until {
        condition: Expr,
        body: Vec<Stmt>,
        position: Position,
    },
    DoWhile {
        body: Vec<Stmt>,
        condition: Expr,
        position: Position,
    },
    DoUntil {
        body: Vec<Stmt>,
        condition: Expr,
        position: Position,
    },
    For {
        variable: String,
        iterable: Expr,
        body: Vec<Stmt>,
        position: Position,
    },
    When {
        cases: Vec<Branch>,
        else_body: Option<Vec<Stmt>>,
        position: Position,
    },
    WhenMatch {
        value: Expr,
        cases: Vec<Branch>,
        else_body: Option<Vec<Stmt>>,
        position: Position,
    },
    Call {
        callee: Expr,
        args: Vec<Expr>,
        position: Position,
    },
    Return {
        value: Option<Expr>,
        position: Position,
    },
    /// Target is always a variable, index, or member expression.
    Assign {
        target: Expr,
        value: Expr,
        position: Position,
    },
    Break {
        position: Position,
    },
    Next {
        position: Position,
    },
    Increment {
        target: Expr,
        amount: Option<Expr>,
        position: Position,
    },
    Decrement {
        target: Expr,
        amount: Option<Expr>,
        position: Position,
    },
}

impl Stmt {
    pub fn position(&self) -> Position {
        match self {
            Stmt::My { position, .. }
            | Stmt::Sub { position, .. }
            | Stmt::If { position, .. }
            | Stmt::Unless { position, .. }
            | Stmt::While { position, .. }
            | Stmt::Until { position, .. }
            | Stmt::DoWhile { position, .. }
            | Stmt::DoUntil { position, .. }
            | Stmt::For { position, .. }
            | Stmt::When { position, .. }
            | Stmt::WhenMatch { position, .. }
            | Stmt::Call { position, .. }
            | Stmt::Return { position, .. }
            | Stmt::Assign { position, .. }
            | Stmt::Break { position }
            | Stmt::Next { position }
            | Stmt::Increment { position, .. }
            | Stmt::Decrement { position, .. } => *position,
        }
    }
}

//=====================================================
// Section 4.0 - Program
//=====================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

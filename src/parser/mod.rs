//=============================================
// src/parser/mod.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Clam recursive descent parser implementation
// Objective: Pull tokens from the lexer on demand and build AST statements
//=============================================

//=============================================
//            Section 1: Imports
//=============================================

use crate::ast::{BinaryOp, Branch, Expr, Program, Stmt, UnaryOp};
use crate::tokenizer::{LexError, Lexer, Position, Token, TokenKind};
use std::rc::Rc;
use thiserror::Error;

//=============================================
//            Section 2: Parse Errors
//=============================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected} but found {} at {position}", describe_found(.found, .literal))]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        literal: String,
        position: Position,
    },
    #[error("invalid assignment target at {position}")]
    InvalidAssignmentTarget { position: Position },
    #[error("loop variable must be a plain name at {position}")]
    InvalidLoopVariable { position: Position },
    #[error("invalid number literal '{literal}' at {position}")]
    InvalidNumber { literal: String, position: Position },
    #[error("nesting deeper than {limit} levels at {position}")]
    NestingTooDeep { limit: usize, position: Position },
    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::InvalidAssignmentTarget { position }
            | ParseError::InvalidLoopVariable { position }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
            ParseError::Lex(err) => err.position(),
        }
    }
}

fn describe_found(kind: &TokenKind, literal: &str) -> String {
    match *kind {
        TokenKind::Eof => kind.describe().to_string(),
        TokenKind::Identifier | TokenKind::Number => format!("{} '{}'", kind, literal),
        TokenKind::String => format!("string \"{}\"", literal),
        _ => kind.describe().to_string(),
    }
}

/// Parse a complete source text into a program.
pub fn parse_source(source: &str) -> Result<Program, ParseError> {
    Parser::new(Lexer::new(source))?.parse_program()
}

//=============================================
//            Section 3: Parser State
//=============================================

const MAX_NESTING_DEPTH: usize = 128;

/// Recursive descent parser for Clam with one token of lookahead.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    previous_end: Position,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            previous_end: Position::default(),
            depth: 0,
        })
    }

    /// Parse statements until the end-of-input token.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program::new(statements))
    }

    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    //=============================================
    //            Section 4: Statements
    //=============================================

    //Function: parse_statement
    //Purpose: Parse one top-level or block-level statement
    //Inputs: &mut self
    //Returns: Result<Stmt, ParseError>
    pub fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current.kind {
            TokenKind::If => self.parse_conditional(false),
            TokenKind::Unless => self.parse_conditional(true),
            TokenKind::While => self.parse_loop(false),
            TokenKind::Until => self.parse_loop(true),
            TokenKind::For => self.parse_for(),
            TokenKind::Sub => self.parse_sub(),
            TokenKind::When => self.parse_when(),
            TokenKind::Do => {
                let stmt = self.parse_do()?;
                self.consume(TokenKind::Semicolon, "';' after do loop")?;
                Ok(stmt)
            }
            TokenKind::My => {
                let stmt = self.parse_my()?;
                self.consume(TokenKind::Semicolon, "';' after declaration")?;
                Ok(stmt)
            }
            _ => {
                let stmt = self.parse_simple_statement()?;
                let stmt = self.parse_modifier(stmt)?;
                self.consume(TokenKind::Semicolon, "';'")?;
                Ok(stmt)
            }
        }
    }

    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        match self.current.kind {
            TokenKind::Return => {
                self.advance()?;
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                Ok(Stmt::Return { value, position })
            }
            TokenKind::Break => {
                self.advance()?;
                Ok(Stmt::Break { position })
            }
            TokenKind::Next => {
                self.advance()?;
                Ok(Stmt::Next { position })
            }
            TokenKind::Inc | TokenKind::Dec => {
                let increment = self.check(TokenKind::Inc);
                self.advance()?;
                let (target, amount) = self.parse_step()?;
                let amount = amount.map(|boxed| *boxed);
                Ok(if increment {
                    Stmt::Increment {
                        target,
                        amount,
                        position,
                    }
                } else {
                    Stmt::Decrement {
                        target,
                        amount,
                        position,
                    }
                })
            }
            _ => self.parse_assignment_or_call(),
        }
    }

    // `target = value`, `callee(args) more args`, or `callee arg arg`.
    // The head only takes `(` and `[` that touch it, so `print (a + b) * 2;`
    // and `print [1, 2];` pass arguments instead of calling or indexing.
    fn parse_assignment_or_call(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        let left = self.parse_postfix(true)?;

        if self.match_kind(TokenKind::Equal)? {
            return self.finish_assignment(left, position);
        }

        let (callee, mut args) = match left {
            Expr::Call { callee, args, .. } => (*callee, args),
            other => (other, Vec::new()),
        };
        let had_args = !args.is_empty();
        while !self.at_statement_end() {
            args.push(self.parse_expression()?);
            // `a [0] = 5;` reads the bracket as an array argument first.
            if !had_args && args.len() == 1 && self.check(TokenKind::Equal) {
                if let Some(target) = reattach_index(callee.clone(), &args[0]) {
                    self.advance()?;
                    return self.finish_assignment(target, position);
                }
            }
        }
        Ok(Stmt::Call {
            callee,
            args,
            position,
        })
    }

    fn finish_assignment(&mut self, target: Expr, position: Position) -> Result<Stmt, ParseError> {
        if !target.is_assignable() {
            return Err(ParseError::InvalidAssignmentTarget { position });
        }
        let value = self.parse_expression()?;
        Ok(Stmt::Assign {
            target,
            value,
            position,
        })
    }

    fn parse_modifier(&mut self, stmt: Stmt) -> Result<Stmt, ParseError> {
        let position = stmt.position();
        let kind = self.current.kind;
        if !matches!(
            kind,
            TokenKind::If | TokenKind::Unless | TokenKind::While | TokenKind::Until
        ) {
            return Ok(stmt);
        }
        self.advance()?;
        let condition = self.parse_expression()?;
        let body = vec![stmt];
        Ok(match kind {
            TokenKind::If => Stmt::If {
                condition,
                body,
                else_ifs: Vec::new(),
                else_body: None,
                position,
            },
            TokenKind::Unless => Stmt::Unless {
                condition,
                body,
                else_ifs: Vec::new(),
                else_body: None,
                position,
            },
            TokenKind::While => Stmt::While {
                condition,
                body,
                position,
            },
            _ => Stmt::Until {
                condition,
                body,
                position,
            },
        })
    }

    fn parse_conditional(&mut self, negated: bool) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        self.advance()?;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;

        let mut else_ifs = Vec::new();
        let mut else_body = None;
        while self.match_kind(TokenKind::Else)? {
            if self.match_kind(TokenKind::If)? {
                let condition = self.parse_expression()?;
                let body = self.parse_block()?;
                else_ifs.push(Branch { condition, body });
            } else if self.match_kind(TokenKind::Unless)? {
                let inner = self.parse_expression()?;
                let condition = Expr::Unary {
                    operator: UnaryOp::Not,
                    position: inner.position(),
                    operand: Box::new(inner),
                };
                let body = self.parse_block()?;
                else_ifs.push(Branch { condition, body });
            } else {
                else_body = Some(self.parse_block()?);
                break;
            }
        }

        Ok(if negated {
            Stmt::Unless {
                condition,
                body,
                else_ifs,
                else_body,
                position,
            }
        } else {
            Stmt::If {
                condition,
                body,
                else_ifs,
                else_body,
                position,
            }
        })
    }

    fn parse_loop(&mut self, until: bool) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        self.advance()?;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(if until {
            Stmt::Until {
                condition,
                body,
                position,
            }
        } else {
            Stmt::While {
                condition,
                body,
                position,
            }
        })
    }

    fn parse_do(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        self.advance()?;
        let body = self.parse_block()?;
        if self.match_kind(TokenKind::While)? {
            let condition = self.parse_expression()?;
            return Ok(Stmt::DoWhile {
                body,
                condition,
                position,
            });
        }
        self.consume(TokenKind::Until, "'while' or 'until' after do block")?;
        let condition = self.parse_expression()?;
        Ok(Stmt::DoUntil {
            body,
            condition,
            position,
        })
    }

    /// `for name in expr { ... }` or `for expr { ... }` binding `it`.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        self.advance()?;
        let head = self.parse_expression()?;

        let (variable, iterable) = if self.match_kind(TokenKind::In)? {
            let variable = match head {
                Expr::Variable { name, .. } => name,
                other => {
                    return Err(ParseError::InvalidLoopVariable {
                        position: other.position(),
                    });
                }
            };
            (variable, self.parse_expression()?)
        } else {
            ("it".to_string(), head)
        };

        let body = self.parse_block()?;
        Ok(Stmt::For {
            variable,
            iterable,
            body,
            position,
        })
    }

    fn parse_sub(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        self.advance()?;
        let name = self.consume_identifier()?;

        let mut params = Vec::new();
        if self.match_kind(TokenKind::LeftParen)? {
            while !self.match_kind(TokenKind::RightParen)? {
                params.push(self.consume_identifier()?);
                if !self.check(TokenKind::RightParen) {
                    self.consume(TokenKind::Comma, "',' or ')' in parameter list")?;
                }
            }
        }

        let body = self.parse_block()?;
        Ok(Stmt::Sub {
            name,
            params,
            body: Rc::from(body),
            position,
        })
    }

    fn parse_my(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        self.advance()?;
        let name = self.consume_identifier()?;
        let value = if self.match_kind(TokenKind::Equal)? {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Stmt::My {
            name,
            value,
            position,
        })
    }

    /// `when { case cond {..} }` or `when value { case v {..} else {..} }`.
    fn parse_when(&mut self) -> Result<Stmt, ParseError> {
        let position = self.current.position;
        self.advance()?;
        let scrutinee = if self.check(TokenKind::LeftBrace) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::LeftBrace, "'{' after when")?;

        let mut cases = Vec::new();
        let mut else_body = None;
        loop {
            match self.current.kind {
                TokenKind::RightBrace => {
                    self.advance()?;
                    break;
                }
                TokenKind::Case => {
                    self.advance()?;
                    let condition = self.parse_expression()?;
                    let body = self.parse_block()?;
                    cases.push(Branch { condition, body });
                }
                TokenKind::Else => {
                    self.advance()?;
                    else_body = Some(self.parse_block()?);
                    self.consume(TokenKind::RightBrace, "'}' after else branch")?;
                    break;
                }
                _ => return Err(self.unexpected("'case', 'else' or '}'")),
            }
        }

        Ok(match scrutinee {
            Some(value) => Stmt::WhenMatch {
                value,
                cases,
                else_body,
                position,
            },
            None => Stmt::When {
                cases,
                else_body,
                position,
            },
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.consume(TokenKind::LeftBrace, "'{'")?;
        self.enter_nesting()?;
        let mut statements = Vec::new();
        let result = loop {
            if self.check(TokenKind::RightBrace) {
                break self.advance();
            }
            if self.is_at_end() {
                break Err(self.unexpected("'}'"));
            }
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => break Err(err),
            }
        };
        self.exit_nesting();
        result.map(|_| statements)
    }

    //=============================================
    //            Section 5: Expressions
    //=============================================

    fn enter_nesting(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                position: self.current.position,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Parse expression with precedence climbing
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.enter_nesting()?;
        let result = self.parse_or();
        self.exit_nesting();
        result
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let position = self.current.position;
            self.advance()?;
            let right = self.parse_and()?;
            expr = binary(expr, BinaryOp::Or, right, position);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_equality()?;
        while self.check(TokenKind::And) {
            let position = self.current.position;
            self.advance()?;
            let right = self.parse_equality()?;
            expr = binary(expr, BinaryOp::And, right, position);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_comparison()?;
        loop {
            let operator = match self.current.kind {
                TokenKind::EqualEqual => BinaryOp::Equal,
                TokenKind::NotEqual => BinaryOp::NotEqual,
                _ => return Ok(expr),
            };
            let position = self.current.position;
            self.advance()?;
            let right = self.parse_comparison()?;
            expr = binary(expr, operator, right, position);
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_addition()?;
        loop {
            let operator = match self.current.kind {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                _ => return Ok(expr),
            };
            let position = self.current.position;
            self.advance()?;
            let right = self.parse_addition()?;
            expr = binary(expr, operator, right, position);
        }
    }

    fn parse_addition(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_multiplication()?;
        loop {
            let operator = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => return Ok(expr),
            };
            let position = self.current.position;
            self.advance()?;
            let right = self.parse_multiplication()?;
            expr = binary(expr, operator, right, position);
        }
    }

    fn parse_multiplication(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_unary()?;
        loop {
            let operator = match self.current.kind {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                TokenKind::Percent => BinaryOp::Modulo,
                _ => return Ok(expr),
            };
            let position = self.current.position;
            self.advance()?;
            let right = self.parse_unary()?;
            expr = binary(expr, operator, right, position);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let operator = match self.current.kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.parse_postfix(false),
        };
        let position = self.current.position;
        self.advance()?;

        self.enter_nesting()?;
        let operand = self.parse_unary();
        self.exit_nesting();

        Ok(Expr::Unary {
            operator,
            operand: Box::new(operand?),
            position,
        })
    }

    // With `touching_only`, `(` and `[` continue the chain only when they touch
    // the previous token.
    fn parse_postfix(&mut self, touching_only: bool) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let attached = !touching_only || self.current.position == self.previous_end;
            let position = expr.position();
            match self.current.kind {
                TokenKind::LeftParen if attached => {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        position,
                    };
                }
                TokenKind::LeftBracket if attached => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.consume(TokenKind::RightBracket, "']' after index")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        position,
                    };
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let property = self.consume_member_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        position,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        while !self.match_kind(TokenKind::RightParen)? {
            args.push(self.parse_expression()?);
            if !self.check(TokenKind::RightParen) {
                self.consume(TokenKind::Comma, "',' or ')' in argument list")?;
            }
        }
        Ok(args)
    }

    //Function: parse_primary
    //Purpose: Parse literals, names, grouping, collections, blocks and inc/dec
    //Inputs: &mut self
    //Returns: Result<Expr, ParseError>
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let position = self.current.position;
        match self.current.kind {
            TokenKind::Identifier => {
                let name = self.advance()?.literal;
                Ok(Expr::Variable { name, position })
            }
            TokenKind::String => {
                let value = self.advance()?.literal;
                Ok(Expr::String { value, position })
            }
            TokenKind::Number => {
                let literal = self.advance()?.literal;
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        literal: literal.clone(),
                        position,
                    })?;
                Ok(Expr::Number { value, position })
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(TokenKind::True);
                self.advance()?;
                Ok(Expr::Boolean { value, position })
            }
            TokenKind::Nil => {
                self.advance()?;
                Ok(Expr::Nil { position })
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_collection(),
            TokenKind::LeftBrace => {
                self.advance()?;
                let body = self.parse_expression()?;
                self.consume(TokenKind::RightBrace, "'}' after block expression")?;
                Ok(Expr::Block {
                    body: Rc::new(body),
                    position,
                })
            }
            TokenKind::Inc | TokenKind::Dec => {
                let increment = self.check(TokenKind::Inc);
                self.advance()?;
                let (target, amount) = self.parse_step()?;
                let target = Box::new(target);
                Ok(if increment {
                    Expr::Increment {
                        target,
                        amount,
                        position,
                    }
                } else {
                    Expr::Decrement {
                        target,
                        amount,
                        position,
                    }
                })
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    // Shared tail of `inc`/`dec`: the target and an optional `by` amount.
    fn parse_step(&mut self) -> Result<(Expr, Option<Box<Expr>>), ParseError> {
        let position = self.current.position;
        let target = self.parse_expression()?;
        if !target.is_assignable() {
            return Err(ParseError::InvalidAssignmentTarget { position });
        }
        let amount = if self.match_kind(TokenKind::By)? {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok((target, amount))
    }

    /// `[]`, `[:]`, `[a, b]` or `[k: v, ...]`.
    fn parse_collection(&mut self) -> Result<Expr, ParseError> {
        let position = self.current.position;
        self.advance()?;

        if self.match_kind(TokenKind::Colon)? {
            self.consume(TokenKind::RightBracket, "']' after '[:'")?;
            return Ok(Expr::Hash {
                entries: Vec::new(),
                position,
            });
        }
        if self.match_kind(TokenKind::RightBracket)? {
            return Ok(Expr::Array {
                elements: Vec::new(),
                position,
            });
        }

        let first = self.parse_expression()?;
        if self.match_kind(TokenKind::Colon)? {
            let mut entries = vec![(first, self.parse_expression()?)];
            while self.match_kind(TokenKind::Comma)? {
                let key = self.parse_expression()?;
                self.consume(TokenKind::Colon, "':' in hash literal")?;
                entries.push((key, self.parse_expression()?));
            }
            self.consume(TokenKind::RightBracket, "']' after hash literal")?;
            return Ok(Expr::Hash { entries, position });
        }

        let mut elements = vec![first];
        while self.match_kind(TokenKind::Comma)? {
            elements.push(self.parse_expression()?);
        }
        self.consume(TokenKind::RightBracket, "']' after array literal")?;
        Ok(Expr::Array { elements, position })
    }

    //=============================================
    //            Section 6: Token Utilities
    //=============================================

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    // Advance to the next token and return the one just passed.
    fn advance(&mut self) -> Result<Token, ParseError> {
        self.previous_end = self.lexer.position();
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn match_kind(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn consume_identifier(&mut self) -> Result<String, ParseError> {
        Ok(self.consume(TokenKind::Identifier, "identifier")?.literal)
    }

    // Member names may reuse keyword spellings such as `h.next` or `time.until`.
    fn consume_member_name(&mut self) -> Result<String, ParseError> {
        let is_word = self
            .current
            .literal
            .starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$');
        if is_word && self.current.kind != TokenKind::String {
            Ok(self.advance()?.literal)
        } else {
            Err(self.unexpected("member name"))
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Semicolon
                | TokenKind::If
                | TokenKind::Unless
                | TokenKind::While
                | TokenKind::Until
                | TokenKind::Eof
        )
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current.kind,
            literal: self.current.literal.clone(),
            position: self.current.position,
        }
    }
}

// Rebuild `callee [i]...` from a head and an argument parsed as `[i]...`.
fn reattach_index(callee: Expr, arg: &Expr) -> Option<Expr> {
    match arg {
        Expr::Array { elements, position } if elements.len() == 1 => Some(Expr::Index {
            object: Box::new(callee),
            index: Box::new(elements[0].clone()),
            position: *position,
        }),
        Expr::Index {
            object,
            index,
            position,
        } => Some(Expr::Index {
            object: Box::new(reattach_index(callee, object)?),
            index: index.clone(),
            position: *position,
        }),
        Expr::Member {
            object,
            property,
            position,
        } => Some(Expr::Member {
            object: Box::new(reattach_index(callee, object)?),
            property: property.clone(),
            position: *position,
        }),
        _ => None,
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr, position: Position) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        position,
    }
}

//=============================================
//            Section 7: Tests
//=============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Stmt> {
        parse_source(source)
            .unwrap_or_else(|err| panic!("parse failed: {err}"))
            .statements
    }

    fn expression(source: &str) -> Expr {
        match parse(&format!("my subject = {source};")).remove(0) {
            Stmt::My {
                value: Some(expr), ..
            } => expr,
            other => panic!("expected declaration, found {other:?}"),
        }
    }

    #[test]
    fn empty_program_parses() {
        assert!(parse("").is_empty());
        assert!(parse("  # only a comment\n").is_empty());
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match expression("1 + 2 * 3") {
            Expr::Binary {
                operator: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(
                *right,
                Expr::Binary {
                    operator: BinaryOp::Multiply,
                    ..
                }
            )),
            other => panic!("expected addition at the root, found {other:?}"),
        }
    }

    #[test]
    fn binary_chains_are_left_associative() {
        match expression("10 - 4 - 3") {
            Expr::Binary { left, right, .. } => {
                assert!(matches!(
                    *left,
                    Expr::Binary {
                        operator: BinaryOp::Subtract,
                        ..
                    }
                ));
                assert!(matches!(*right, Expr::Number { value, .. } if value == 3.0));
            }
            other => panic!("expected subtraction chain, found {other:?}"),
        }
    }

    #[test]
    fn or_is_lowest_precedence() {
        assert!(matches!(
            expression("a & b | c == d"),
            Expr::Binary {
                operator: BinaryOp::Or,
                ..
            }
        ));
    }

    #[test]
    fn bracket_literals_disambiguate() {
        assert!(matches!(expression("[]"), Expr::Array { elements, .. } if elements.is_empty()));
        assert!(matches!(expression("[:]"), Expr::Hash { entries, .. } if entries.is_empty()));
        assert!(matches!(expression("[1, 2]"), Expr::Array { elements, .. } if elements.len() == 2));
        match expression("['a': 1, 'b': 2]") {
            Expr::Hash { entries, .. } => {
                assert_eq!(entries.len(), 2);
                assert!(matches!(&entries[0].0, Expr::String { value, .. } if value == "a"));
            }
            other => panic!("expected hash literal, found {other:?}"),
        }
    }

    #[test]
    fn inc_expression_defaults_amount() {
        match expression("inc counter") {
            Expr::Increment { target, amount, .. } => {
                assert!(matches!(*target, Expr::Variable { ref name, .. } if name == "counter"));
                assert!(amount.is_none());
            }
            other => panic!("expected increment, found {other:?}"),
        }
        assert!(matches!(
            expression("dec h.x by 2"),
            Expr::Decrement {
                amount: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn block_expression_wraps_body() {
        assert!(matches!(expression("{ it * 2 }"), Expr::Block { .. }));
    }

    #[test]
    fn call_statement_with_parentheses() {
        match parse("add(2, 3);").remove(0) {
            Stmt::Call { callee, args, .. } => {
                assert!(matches!(callee, Expr::Variable { ref name, .. } if name == "add"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call statement, found {other:?}"),
        }
    }

    #[test]
    fn call_statement_with_spaced_arguments() {
        match parse("print (1 + 2) * 3 \"b\" x;").remove(0) {
            Stmt::Call { callee, args, .. } => {
                assert!(matches!(callee, Expr::Variable { ref name, .. } if name == "print"));
                assert_eq!(args.len(), 3);
                assert!(matches!(
                    args[0],
                    Expr::Binary {
                        operator: BinaryOp::Multiply,
                        ..
                    }
                ));
            }
            other => panic!("expected call statement, found {other:?}"),
        }
    }

    #[test]
    fn statement_head_keeps_spaced_brackets_as_arguments() {
        match parse("print [1, 2];").remove(0) {
            Stmt::Call { args, .. } => {
                assert!(matches!(&args[0], Expr::Array { elements, .. } if elements.len() == 2));
            }
            other => panic!("expected call statement, found {other:?}"),
        }
    }

    #[test]
    fn spaced_postfix_operators_inside_expressions() {
        assert!(matches!(expression("add (2, 3)"), Expr::Call { args, .. } if args.len() == 2));
        assert!(matches!(expression("a [0]"), Expr::Index { .. }));
        assert!(matches!(expression("h .x [1] (2)"), Expr::Call { .. }));
    }

    #[test]
    fn spaced_index_assignment_targets() {
        match parse("a [0] = 5;").remove(0) {
            Stmt::Assign {
                target: Expr::Index { object, index, .. },
                ..
            } => {
                assert!(matches!(*object, Expr::Variable { ref name, .. } if name == "a"));
                assert!(matches!(*index, Expr::Number { value, .. } if value == 0.0));
            }
            other => panic!("expected index assignment, found {other:?}"),
        }
        match parse("h [0][1].x = 2;").remove(0) {
            Stmt::Assign {
                target: Expr::Member { object, .. },
                ..
            } => match *object {
                Expr::Index { object, .. } => {
                    assert!(matches!(*object, Expr::Index { .. }));
                }
                other => panic!("expected nested index, found {other:?}"),
            },
            other => panic!("expected member assignment, found {other:?}"),
        }
    }

    #[test]
    fn member_call_statement() {
        match parse("os.exit 1;").remove(0) {
            Stmt::Call { callee, args, .. } => {
                assert!(matches!(callee, Expr::Member { ref property, .. } if property == "exit"));
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call statement, found {other:?}"),
        }
    }

    #[test]
    fn assignment_targets() {
        assert!(matches!(
            parse("x = 1;").remove(0),
            Stmt::Assign {
                target: Expr::Variable { .. },
                ..
            }
        ));
        assert!(matches!(
            parse("h[1] = 2;").remove(0),
            Stmt::Assign {
                target: Expr::Index { .. },
                ..
            }
        ));
        assert!(matches!(
            parse("h.x = 1;").remove(0),
            Stmt::Assign {
                target: Expr::Member { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_call_as_assignment_target() {
        let err = parse_source("f(1) = 2;").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidAssignmentTarget {
                position: Position::new(1, 1)
            }
        );
    }

    #[test]
    fn trailing_modifier_wraps_statement() {
        match parse("print x if ready;").remove(0) {
            Stmt::If {
                body, position, ..
            } => {
                assert_eq!(position, Position::new(1, 1));
                assert!(matches!(body[0], Stmt::Call { .. }));
            }
            other => panic!("expected modifier if, found {other:?}"),
        }
        assert!(matches!(
            parse("inc i until done;").remove(0),
            Stmt::Until { .. }
        ));
        assert!(matches!(
            parse("return unless ok;").remove(0),
            Stmt::Unless { ref body, .. } if matches!(body[0], Stmt::Return { value: None, .. })
        ));
    }

    #[test]
    fn only_one_modifier_is_accepted() {
        assert!(parse_source("print x if a if b;").is_err());
    }

    #[test]
    fn if_chain_with_else_unless() {
        let source = "if a { x = 1; } else if b { x = 2; } else unless c { x = 3; } else { x = 4; }";
        match parse(source).remove(0) {
            Stmt::If {
                else_ifs,
                else_body,
                ..
            } => {
                assert_eq!(else_ifs.len(), 2);
                assert!(matches!(
                    else_ifs[1].condition,
                    Expr::Unary {
                        operator: UnaryOp::Not,
                        ..
                    }
                ));
                assert!(else_body.is_some());
            }
            other => panic!("expected if chain, found {other:?}"),
        }
    }

    #[test]
    fn loops_parse() {
        assert!(matches!(parse("while i < 3 { inc i; }").remove(0), Stmt::While { .. }));
        assert!(matches!(parse("until done { next; }").remove(0), Stmt::Until { .. }));
        assert!(matches!(
            parse("do { i = i + 1; } while (i < 0);").remove(0),
            Stmt::DoWhile { .. }
        ));
        assert!(matches!(
            parse("do { break; } until true;").remove(0),
            Stmt::DoUntil { .. }
        ));
    }

    #[test]
    fn for_loop_forms() {
        match parse("for x in [1, 2] { print x; }").remove(0) {
            Stmt::For { variable, .. } => assert_eq!(variable, "x"),
            other => panic!("expected for loop, found {other:?}"),
        }
        match parse("for items { print it; }").remove(0) {
            Stmt::For {
                variable, iterable, ..
            } => {
                assert_eq!(variable, "it");
                assert!(matches!(iterable, Expr::Variable { ref name, .. } if name == "items"));
            }
            other => panic!("expected bare for loop, found {other:?}"),
        }
        assert!(matches!(
            parse_source("for a.b in xs { }"),
            Err(ParseError::InvalidLoopVariable { .. })
        ));
    }

    #[test]
    fn sub_with_and_without_params() {
        match parse("sub add(a, b) { return a + b; }").remove(0) {
            Stmt::Sub { name, params, body, .. } => {
                assert_eq!(name, "add");
                assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected sub, found {other:?}"),
        }
        assert!(matches!(
            parse("sub hello { print 'hi'; }").remove(0),
            Stmt::Sub { ref params, .. } if params.is_empty()
        ));
    }

    #[test]
    fn when_forms() {
        let source = "when { case x > 1 { a; } case x > 0 { b; } else { c; } }";
        match parse(source).remove(0) {
            Stmt::When {
                cases, else_body, ..
            } => {
                assert_eq!(cases.len(), 2);
                assert!(else_body.is_some());
            }
            other => panic!("expected when, found {other:?}"),
        }
        assert!(matches!(
            parse("when x { case 1 { a; } }").remove(0),
            Stmt::WhenMatch { else_body: None, .. }
        ));
    }

    #[test]
    fn when_rejects_stray_tokens() {
        match parse_source("when x { print 1; }") {
            Err(ParseError::UnexpectedToken { found, .. }) => {
                assert_eq!(found, TokenKind::Identifier)
            }
            other => panic!("expected unexpected token, found {other:?}"),
        }
    }

    #[test]
    fn missing_semicolon_reports_position() {
        match parse_source("my x = 1\nmy y = 2;") {
            Err(ParseError::UnexpectedToken {
                expected,
                found,
                position,
                ..
            }) => {
                assert!(expected.contains("';'"), "expected ';', got {expected}");
                assert_eq!(found, TokenKind::My);
                assert_eq!(position, Position::new(2, 1));
            }
            other => panic!("expected unexpected token, found {other:?}"),
        }
    }

    #[test]
    fn lex_errors_surface_through_parser() {
        assert!(matches!(
            parse_source("my s = 'open"),
            Err(ParseError::Lex(LexError::UnterminatedString { .. }))
        ));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let source = format!("my x = {}1{};", "(".repeat(400), ")".repeat(400));
        let result = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(move || parse_source(&source).map(drop))
            .expect("spawn")
            .join()
            .expect("join");
        assert!(matches!(result, Err(ParseError::NestingTooDeep { .. })));
    }

    #[test]
    fn member_names_may_be_keywords() {
        assert!(matches!(
            expression("list.next"),
            Expr::Member { ref property, .. } if property == "next"
        ));
    }
}

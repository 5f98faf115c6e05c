//=============================================
// src/tokenizer/mod.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Clam lexical analysis
// Objective: Turn source text into positioned tokens, one token per pull
//=============================================

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

//=============================================
//            Section 1: Positions & Tokens
//=============================================

/// Location of a token in the source text. Lines and columns start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Every token type the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Identifier,
    Number,
    String,
    True,
    False,
    Nil,

    // Keywords
    My,
    Sub,
    When,
    Case,
    If,
    Unless,
    Else,
    While,
    For,
    In,
    Until,
    Do,
    Return,
    Inc,
    Dec,
    By,
    Break,
    Next,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    And,
    Or,
    Not,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,

    // Punctuation
    Comma,
    Colon,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Dot,

    Eof,
}

impl TokenKind {
    //Function: describe
    //Purpose: Human-readable label used in parser diagnostics
    //Inputs: self
    //Returns: &'static str
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Nil => "'nil'",
            TokenKind::My => "'my'",
            TokenKind::Sub => "'sub'",
            TokenKind::When => "'when'",
            TokenKind::Case => "'case'",
            TokenKind::If => "'if'",
            TokenKind::Unless => "'unless'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::Until => "'until'",
            TokenKind::Do => "'do'",
            TokenKind::Return => "'return'",
            TokenKind::Inc => "'inc'",
            TokenKind::Dec => "'dec'",
            TokenKind::By => "'by'",
            TokenKind::Break => "'break'",
            TokenKind::Next => "'next'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::And => "'&'",
            TokenKind::Or => "'|'",
            TokenKind::Not => "'!'",
            TokenKind::EqualEqual => "'=='",
            TokenKind::NotEqual => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Equal => "'='",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Dot => "'.'",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A lexical unit with its literal text and start position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            position,
        }
    }

    /// Numbers keep their source text, so the integer/float form stays recoverable.
    pub fn is_float_literal(&self) -> bool {
        self.kind == TokenKind::Number && self.literal.contains('.')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}' ({})", self.kind, self.literal, self.position)
    }
}

//=============================================
//            Section 2: Lexical Errors
//=============================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown character '{character}' at {position}")]
    UnknownCharacter { character: char, position: Position },
    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },
    #[error("unterminated comment starting at {position}")]
    UnterminatedComment { position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnknownCharacter { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::UnterminatedComment { position } => *position,
        }
    }
}

//=============================================
//            Section 3: Lexer
//=============================================

pub struct Lexer {
    source: Vec<char>,
    offset: usize,
    line: usize,
    column: usize,
    keywords: HashMap<&'static str, TokenKind>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            offset: 0,
            line: 1,
            column: 1,
            keywords: Self::keyword_table(),
        }
    }

    fn keyword_table() -> HashMap<&'static str, TokenKind> {
        HashMap::from([
            ("my", TokenKind::My),
            ("sub", TokenKind::Sub),
            ("when", TokenKind::When),
            ("case", TokenKind::Case),
            ("if", TokenKind::If),
            ("unless", TokenKind::Unless),
            ("else", TokenKind::Else),
            ("while", TokenKind::While),
            ("for", TokenKind::For),
            ("in", TokenKind::In),
            ("until", TokenKind::Until),
            ("do", TokenKind::Do),
            ("return", TokenKind::Return),
            ("true", TokenKind::True),
            ("false", TokenKind::False),
            ("nil", TokenKind::Nil),
            ("inc", TokenKind::Inc),
            ("dec", TokenKind::Dec),
            ("by", TokenKind::By),
            ("break", TokenKind::Break),
            ("next", TokenKind::Next),
        ])
    }

    /// Drain the lexer into a vector ending with the `Eof` token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    //Function: next_token
    //Purpose: Produce exactly one token, skipping whitespace and comments
    //Inputs: &mut self
    //Returns: Result<Token, LexError>
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let start = self.position();
            let start_offset = self.offset;
            let Some(ch) = self.read_char() else {
                return Ok(Token::new(TokenKind::Eof, "", start));
            };

            let kind = match ch {
                ' ' | '\t' | '\r' => continue,
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                    continue;
                }
                '#' => {
                    self.skip_comment(start)?;
                    continue;
                }
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                '.' => TokenKind::Dot,
                '=' => self.either('=', TokenKind::EqualEqual, TokenKind::Equal),
                '<' => self.either('=', TokenKind::LessEqual, TokenKind::Less),
                '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::Greater),
                '!' => self.either('=', TokenKind::NotEqual, TokenKind::Not),
                '&' => self.either('&', TokenKind::And, TokenKind::And),
                '|' => self.either('|', TokenKind::Or, TokenKind::Or),
                '"' | '\'' => return self.read_string(ch, start),
                c if is_identifier_start(c) => return Ok(self.read_identifier(start_offset, start)),
                c if c.is_ascii_digit() => return Ok(self.read_number(start_offset, start)),
                other => {
                    return Err(LexError::UnknownCharacter {
                        character: other,
                        position: start,
                    });
                }
            };

            let literal: String = self.source[start_offset..self.offset].iter().collect();
            return Ok(Token::new(kind, literal, start));
        }
    }

    /// Position just past the most recently produced token.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.source.get(self.offset).copied()
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.offset += 1;
        self.column += 1;
        Some(ch)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.read_char();
            true
        } else {
            false
        }
    }

    fn either(&mut self, follow: char, matched: TokenKind, single: TokenKind) -> TokenKind {
        if self.match_char(follow) { matched } else { single }
    }

    // The newline itself is left for `next_token` so the line counter moves once.
    fn skip_comment(&mut self, start: Position) -> Result<(), LexError> {
        loop {
            match self.peek_char() {
                Some('\n') => return Ok(()),
                Some(_) => {
                    self.read_char();
                }
                None => return Err(LexError::UnterminatedComment { position: start }),
            }
        }
    }

    fn read_identifier(&mut self, start_offset: usize, start: Position) -> Token {
        while self.peek_char().is_some_and(is_identifier_part) {
            self.read_char();
        }
        let literal: String = self.source[start_offset..self.offset].iter().collect();
        let kind = self
            .keywords
            .get(literal.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        Token::new(kind, literal, start)
    }

    fn read_number(&mut self, start_offset: usize, start: Position) -> Token {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.read_char();
        }
        if self.match_char('.') {
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.read_char();
            }
        }
        let literal: String = self.source[start_offset..self.offset].iter().collect();
        Token::new(TokenKind::Number, literal, start)
    }

    // Embedded newlines bump the line but leave the column running.
    fn read_string(&mut self, delimiter: char, start: Position) -> Result<Token, LexError> {
        let body_start = self.offset;
        loop {
            match self.read_char() {
                None => return Err(LexError::UnterminatedString { position: start }),
                Some(c) if c == delimiter => break,
                Some('\n') => self.line += 1,
                Some('\\') => {
                    self.match_char(delimiter);
                }
                Some(_) => {}
            }
        }

        let raw: String = self.source[body_start..self.offset - 1].iter().collect();
        let literal = raw
            .replace(&format!("\\{delimiter}"), &delimiter.to_string())
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t");
        Ok(Token::new(TokenKind::String, literal, start))
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

//=============================================
//            Section 4: Tests
//=============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn recognises_keywords_and_identifiers() {
        assert_eq!(
            kinds("my $count = next_value;"),
            vec![
                TokenKind::My,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_character_operators_take_precedence() {
        assert_eq!(
            kinds("== != <= >= < > = ! && ||"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Equal,
                TokenKind::Not,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_literals_keep_their_form() {
        let tokens = Lexer::new("42 3.14 7.").tokenize().expect("tokenize");
        assert_eq!(tokens[0].literal, "42");
        assert!(!tokens[0].is_float_literal());
        assert_eq!(tokens[1].literal, "3.14");
        assert!(tokens[1].is_float_literal());
        assert_eq!(tokens[2].literal, "7.");
        assert!(tokens[2].is_float_literal());
    }

    #[test]
    fn string_escapes_are_substituted() {
        let tokens = Lexer::new(r#""say \"hi\"\n" 'it\'s\t'"#)
            .tokenize()
            .expect("tokenize");
        assert_eq!(tokens[0].literal, "say \"hi\"\n");
        assert_eq!(tokens[1].literal, "it's\t");
    }

    #[test]
    fn other_backslashes_are_kept_verbatim() {
        let tokens = Lexer::new(r#""a\qb" "x\'y""#).tokenize().expect("tokenize");
        assert_eq!(tokens[0].literal, "a\\qb");
        assert_eq!(tokens[1].literal, "x\\'y");
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = Lexer::new("my x;\n  x = 1;").tokenize().expect("tokenize");
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[1].position, Position::new(1, 4));
        assert_eq!(tokens[3].position, Position::new(2, 3));
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let tokens = Lexer::new("# header\nfoo # trailing\nbar")
            .tokenize()
            .expect("tokenize");
        assert_eq!(tokens[0].literal, "foo");
        assert_eq!(tokens[0].position.line, 2);
        assert_eq!(tokens[1].literal, "bar");
        assert_eq!(tokens[1].position.line, 3);
    }

    #[test]
    fn multi_line_string_keeps_counting_columns() {
        let tokens = Lexer::new("'a\nb' x").tokenize().expect("tokenize");
        assert_eq!(tokens[1].position.line, 2);
        assert_eq!(tokens[1].position.column, 7);
    }

    #[test]
    fn reports_unterminated_string() {
        let err = Lexer::new("my s = \"open").tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedString {
                position: Position::new(1, 8)
            }
        );
    }

    #[test]
    fn reports_comment_without_newline() {
        let err = Lexer::new("x; # dangling").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
    }

    #[test]
    fn reports_unknown_character() {
        match Lexer::new("my a = 1 @ 2;").tokenize() {
            Err(LexError::UnknownCharacter {
                character,
                position,
            }) => {
                assert_eq!(character, '@');
                assert_eq!(position, Position::new(1, 10));
            }
            other => panic!("expected unknown character error, found {other:?}"),
        }
    }

    #[test]
    fn lexing_is_deterministic() {
        let source = "sub f(a) { return a * 2; } f(3);";
        assert_eq!(
            Lexer::new(source).tokenize().expect("first"),
            Lexer::new(source).tokenize().expect("second")
        );
    }
}

// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lexer for the RDCL statement language
//!
//! The lexer is a stateful cursor over the input string that tracks the
//! current line and column. Errors are reported in-band as [`TokenKind::Illegal`]
//! tokens whose lexeme carries the message; the parser surfaces them with
//! their source position. Identifiers and keywords are matched
//! case-insensitively via uppercase normalization, and the boolean and null
//! literals are normalized to lowercase lexemes.

use std::fmt;

/// Token kinds for the RDCL language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special
    Eof,
    Illegal,

    // Identifiers + literals
    Ident,  // Person, email, ...
    Number, // 42, 3.14
    Str,    // 'hello'
    Bool,   // true, false
    Null,   // null

    // Keywords (normalized to upper case)
    Create,
    Node,
    Edge,
    From,
    To,
    Props,
    Primary,
    Key,
    Unique,
    Not,
    NullKw,
    Default,
    Check,
    Alter,
    Drop,
    Add,
    Modify,
    Set,
    Index,
    On,
    One,
    Many,
    Array,
    Enum,
    Show,
    Describe,
    TypeKw,
    Date,
    Time,
    DateTime,
    Json,
    Blob,
    Int,
    Float,
    StringKw,
    Text,
    BoolKw,
    Uuid,

    // DML keywords
    Insert,
    Update,
    Delete,
    Match,
    Where,
    Return,

    // Symbols
    LParen, // (
    RParen, // )
    Lt,     // <
    Gt,     // >
    Comma,  // ,
    Semi,   // ;
    Colon,  // :
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Bool => "boolean",
            TokenKind::Null => "null",
            TokenKind::Create => "CREATE",
            TokenKind::Node => "NODE",
            TokenKind::Edge => "EDGE",
            TokenKind::From => "FROM",
            TokenKind::To => "TO",
            TokenKind::Props => "PROPS",
            TokenKind::Primary => "PRIMARY",
            TokenKind::Key => "KEY",
            TokenKind::Unique => "UNIQUE",
            TokenKind::Not => "NOT",
            TokenKind::NullKw => "NULL",
            TokenKind::Default => "DEFAULT",
            TokenKind::Check => "CHECK",
            TokenKind::Alter => "ALTER",
            TokenKind::Drop => "DROP",
            TokenKind::Add => "ADD",
            TokenKind::Modify => "MODIFY",
            TokenKind::Set => "SET",
            TokenKind::Index => "INDEX",
            TokenKind::On => "ON",
            TokenKind::One => "ONE",
            TokenKind::Many => "MANY",
            TokenKind::Array => "ARRAY",
            TokenKind::Enum => "ENUM",
            TokenKind::Show => "SHOW",
            TokenKind::Describe => "DESCRIBE",
            TokenKind::TypeKw => "TYPE",
            TokenKind::Date => "DATE",
            TokenKind::Time => "TIME",
            TokenKind::DateTime => "DATETIME",
            TokenKind::Json => "JSON",
            TokenKind::Blob => "BLOB",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::StringKw => "STRING",
            TokenKind::Text => "TEXT",
            TokenKind::BoolKw => "BOOL",
            TokenKind::Uuid => "UUID",
            TokenKind::Insert => "INSERT",
            TokenKind::Update => "UPDATE",
            TokenKind::Delete => "DELETE",
            TokenKind::Match => "MATCH",
            TokenKind::Where => "WHERE",
            TokenKind::Return => "RETURN",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Colon => ":",
        };
        f.write_str(name)
    }
}

/// A single lexed token with its source position (1-based line and column)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

/// Resolve an identifier to its keyword kind, or [`TokenKind::Ident`].
///
/// The comparison is done on the uppercased text; `TRUE`/`FALSE` and `NULL`
/// map to the literal kinds rather than keywords.
pub fn lookup_ident(ident: &str) -> TokenKind {
    match ident.to_ascii_uppercase().as_str() {
        "CREATE" => TokenKind::Create,
        "NODE" => TokenKind::Node,
        "EDGE" => TokenKind::Edge,
        "FROM" => TokenKind::From,
        "TO" => TokenKind::To,
        "PROPS" => TokenKind::Props,
        "PRIMARY" => TokenKind::Primary,
        "KEY" => TokenKind::Key,
        "UNIQUE" => TokenKind::Unique,
        "NOT" => TokenKind::Not,
        "NULL" => TokenKind::NullKw,
        "DEFAULT" => TokenKind::Default,
        "CHECK" => TokenKind::Check,
        "ALTER" => TokenKind::Alter,
        "DROP" => TokenKind::Drop,
        "ADD" => TokenKind::Add,
        "MODIFY" => TokenKind::Modify,
        "SET" => TokenKind::Set,
        "INDEX" => TokenKind::Index,
        "ON" => TokenKind::On,
        "ONE" => TokenKind::One,
        "MANY" => TokenKind::Many,
        "ARRAY" => TokenKind::Array,
        "ENUM" => TokenKind::Enum,
        "SHOW" => TokenKind::Show,
        "DESCRIBE" => TokenKind::Describe,
        "TYPE" => TokenKind::TypeKw,
        "DATE" => TokenKind::Date,
        "TIME" => TokenKind::Time,
        "DATETIME" => TokenKind::DateTime,
        "JSON" => TokenKind::Json,
        "BLOB" => TokenKind::Blob,
        "INT" => TokenKind::Int,
        "FLOAT" => TokenKind::Float,
        "STRING" => TokenKind::StringKw,
        "TEXT" => TokenKind::Text,
        "BOOL" => TokenKind::BoolKw,
        "UUID" => TokenKind::Uuid,
        "INSERT" => TokenKind::Insert,
        "UPDATE" => TokenKind::Update,
        "DELETE" => TokenKind::Delete,
        "MATCH" => TokenKind::Match,
        "WHERE" => TokenKind::Where,
        "RETURN" => TokenKind::Return,
        "TRUE" | "FALSE" => TokenKind::Bool,
        _ => TokenKind::Ident,
    }
}

/// Stateful lexer over an RDCL source string
#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Produce the next token and advance. At end of input this returns
    /// [`TokenKind::Eof`] repeatedly.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        // Comments restart scanning after they are consumed.
        if self.peek() == Some('-') && self.peek_n(1) == Some('-') {
            self.skip_line_comment();
            return self.next_token();
        }
        if self.peek() == Some('/') && self.peek_n(1) == Some('*') {
            let (line, col) = (self.line, self.col);
            if !self.skip_block_comment() {
                return self.error_token("unterminated block comment", line, col);
            }
            return self.next_token();
        }

        let (line, col) = (self.line, self.col);
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return self.make_token(TokenKind::Eof, String::new(), line, col),
        };

        match ch {
            '(' => self.symbol(TokenKind::LParen, "(", line, col),
            ')' => self.symbol(TokenKind::RParen, ")", line, col),
            '<' => self.symbol(TokenKind::Lt, "<", line, col),
            '>' => self.symbol(TokenKind::Gt, ">", line, col),
            ',' => self.symbol(TokenKind::Comma, ",", line, col),
            ';' => self.symbol(TokenKind::Semi, ";", line, col),
            ':' => self.symbol(TokenKind::Colon, ":", line, col),
            '`' => self.lex_quoted_ident(line, col),
            '\'' => self.lex_string(line, col),
            _ if is_ident_start(ch) => self.lex_ident_or_keyword(line, col),
            _ if ch.is_ascii_digit() => self.lex_number(line, col),
            _ => {
                self.advance();
                self.error_token(&format!("unexpected character: {:?}", ch), line, col)
            }
        }
    }

    fn lex_ident_or_keyword(&mut self, line: usize, col: usize) -> Token {
        let start = self.pos;
        while self.peek().map_or(false, is_ident_part) {
            self.advance();
        }
        let lit: String = self.input[start..self.pos].iter().collect();
        let kind = lookup_ident(&lit);
        match kind {
            // true/false/null carry normalized lowercase lexemes
            TokenKind::Bool => self.make_token(TokenKind::Bool, lit.to_ascii_lowercase(), line, col),
            TokenKind::NullKw => {
                self.make_token(TokenKind::Null, lit.to_ascii_lowercase(), line, col)
            }
            _ => self.make_token(kind, lit, line, col),
        }
    }

    fn lex_quoted_ident(&mut self, line: usize, col: usize) -> Token {
        self.advance(); // opening backtick
        let start = self.pos;
        loop {
            match self.peek() {
                None => return self.error_token("unterminated quoted identifier", line, col),
                Some('`') => break,
                Some(_) => self.advance(),
            }
        }
        let lit: String = self.input[start..self.pos].iter().collect();
        self.advance(); // closing backtick
        self.make_token(TokenKind::Ident, lit, line, col)
    }

    fn lex_string(&mut self, line: usize, col: usize) -> Token {
        self.advance(); // opening quote
        let mut val = String::new();
        loop {
            match self.peek() {
                None => return self.error_token("unterminated string literal", line, col),
                Some('\'') => {
                    // '' escapes to a literal apostrophe
                    if self.peek_n(1) == Some('\'') {
                        val.push('\'');
                        self.advance();
                        self.advance();
                        continue;
                    }
                    break;
                }
                Some(ch) => {
                    val.push(ch);
                    self.advance();
                }
            }
        }
        self.advance(); // closing quote
        self.make_token(TokenKind::Str, val, line, col)
    }

    fn lex_number(&mut self, line: usize, col: usize) -> Token {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        let lit: String = self.input[start..self.pos].iter().collect();
        self.make_token(TokenKind::Number, lit, line, col)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == ' ' || ch == '\t' || ch == '\n' || ch == '\r' {
                self.advance();
            } else {
                return;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                return;
            }
            self.advance();
        }
    }

    /// Returns false when the comment is not terminated before EOF.
    fn skip_block_comment(&mut self) -> bool {
        self.advance(); // '/'
        self.advance(); // '*'
        loop {
            match self.peek() {
                None => return false,
                Some('*') if self.peek_n(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    return true;
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn symbol(&mut self, kind: TokenKind, lexeme: &str, line: usize, col: usize) -> Token {
        self.advance();
        self.make_token(kind, lexeme.to_string(), line, col)
    }

    fn make_token(&self, kind: TokenKind, lexeme: String, line: usize, col: usize) -> Token {
        Token {
            kind,
            lexeme,
            line,
            column: col,
        }
    }

    fn error_token(&self, msg: &str, line: usize, col: usize) -> Token {
        Token {
            kind: TokenKind::Illegal,
            lexeme: msg.to_string(),
            line,
            column: col,
        }
    }

    fn advance(&mut self) {
        if let Some(&ch) = self.input.get(self.pos) {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_n(&self, n: usize) -> Option<char> {
        self.input.get(self.pos + n).copied()
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

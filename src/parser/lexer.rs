//! Lexer (tokenizer)
//!
//! Converts raw source text into [`Token`]s, one per [`Lexer::next_token`]
//! call. Once the input is exhausted every further call returns an
//! end-of-file token. [`Lexer::tokenize`] drains the lexer into the buffer the
//! parser works on.
//!
//! # Integer Literals
//!
//! A leading `0` may be followed by a base prefix: `0b` (2), `0o` (8),
//! `0d` (10) or `0x` (16). Every following letter or digit is a digit of that
//! base (`a`/`A` is 10 up to `z`/`Z` at 35) and `_` separates digit groups.

use crate::parser::ast::SourcePosition;
use crate::parser::errors::CompileError;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Token variants; literals carry their payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    EndOfFile,

    // Literals and identifiers
    Name(String),
    Integer(i64),

    // Keywords
    Typedef,
    Distinct,
    If,
    Else,
    While,
    Return,
    Var,

    // Punctuation
    Comma,     // ,
    Semicolon, // ;
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }

    // Operators
    Plus,  // +
    Minus, // -
    Star,  // *
    Slash, // /
    Eq,    // =
    Lt,    // <
    Gt,    // >
    Amp,   // &

    // Two-character operators
    PlusEq,  // +=
    MinusEq, // -=
    StarEq,  // *=
    SlashEq, // /=
    EqEq,    // ==
    Le,      // <=
    Ge,      // >=
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::EndOfFile => write!(f, "end of file"),
            TokenKind::Name(name) => write!(f, "identifier '{}'", name),
            TokenKind::Integer(value) => write!(f, "integer literal {}", value),
            TokenKind::Typedef => write!(f, "'typedef'"),
            TokenKind::Distinct => write!(f, "'distinct'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Var => write!(f, "'var'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::PlusEq => write!(f, "'+='"),
            TokenKind::MinusEq => write!(f, "'-='"),
            TokenKind::StarEq => write!(f, "'*='"),
            TokenKind::SlashEq => write!(f, "'/='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Ge => write!(f, "'>='"),
        }
    }
}

/// A token and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: SourcePosition,
    /// Length of the token text in bytes
    pub length: usize,
}

fn keyword(name: &str) -> Option<TokenKind> {
    match name {
        "typedef" => Some(TokenKind::Typedef),
        "distinct" => Some(TokenKind::Distinct),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "return" => Some(TokenKind::Return),
        "var" => Some(TokenKind::Var),
        _ => None,
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        ',' => Some(TokenKind::Comma),
        ';' => Some(TokenKind::Semicolon),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        '{' => Some(TokenKind::LBrace),
        '}' => Some(TokenKind::RBrace),
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Star),
        '/' => Some(TokenKind::Slash),
        '=' => Some(TokenKind::Eq),
        '<' => Some(TokenKind::Lt),
        '>' => Some(TokenKind::Gt),
        '&' => Some(TokenKind::Amp),
        _ => None,
    }
}

fn double_char_token(first: char, second: char) -> Option<TokenKind> {
    match (first, second) {
        ('+', '=') => Some(TokenKind::PlusEq),
        ('-', '=') => Some(TokenKind::MinusEq),
        ('*', '=') => Some(TokenKind::StarEq),
        ('/', '=') => Some(TokenKind::SlashEq),
        ('=', '=') => Some(TokenKind::EqEq),
        ('<', '=') => Some(TokenKind::Le),
        ('>', '=') => Some(TokenKind::Ge),
        _ => None,
    }
}

fn base_for_prefix(ch: char) -> Option<i64> {
    match ch {
        'b' => Some(2),
        'o' => Some(8),
        'd' => Some(10),
        'x' => Some(16),
        _ => None,
    }
}

/// Pull-based lexer over one source file
pub struct Lexer {
    filepath: Rc<str>,
    source: Rc<str>,
    offset: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given file contents.
    pub fn new(filepath: impl Into<Rc<str>>, source: impl Into<Rc<str>>) -> Self {
        Self {
            filepath: filepath.into(),
            source: source.into(),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input, ending with a single end-of-file token
    pub fn tokenize(&mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::EndOfFile;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token
    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        self.skip_whitespace_and_comments();

        let start = self.current_position();
        let kind = match self.peek() {
            None => TokenKind::EndOfFile,
            Some('0'..='9') => self.integer_literal(&start)?,
            Some('a'..='z' | 'A'..='Z' | '_') => self.name_or_keyword(),
            Some(ch) => self.operator_or_punctuation(ch, &start)?,
        };

        let token = Token {
            kind,
            length: self.offset - start.offset,
            position: start,
        };
        trace!(
            kind = %token.kind,
            line = token.position.line,
            column = token.position.column,
            "token"
        );
        Ok(token)
    }

    /// Parse integer literal with optional base prefix
    fn integer_literal(&mut self, start: &SourcePosition) -> Result<TokenKind, CompileError> {
        let mut base = 10;
        if self.peek() == Some('0') {
            self.advance();
            if let Some(prefixed) = self.peek().and_then(base_for_prefix) {
                self.advance();
                base = prefixed;
            }
        }

        let mut value: i64 = 0;
        while let Some(ch) = self.peek() {
            if ch == '_' {
                self.advance();
                continue;
            }
            if !ch.is_ascii_alphanumeric() {
                break;
            }

            // Every ASCII alphanumeric has a base-36 value
            let digit = ch.to_digit(36).map(i64::from).unwrap_or(i64::MAX);
            if digit >= base {
                return Err(CompileError::new(
                    format!("Digit '{ch}' too big for base {base}"),
                    self.current_position(),
                ));
            }

            value = value
                .checked_mul(base)
                .and_then(|value| value.checked_add(digit))
                .ok_or_else(|| CompileError::new("Integer literal too large", start.clone()))?;
            self.advance();
        }

        Ok(TokenKind::Integer(value))
    }

    /// Parse identifier or keyword
    fn name_or_keyword(&mut self) -> TokenKind {
        let begin = self.offset;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let name = &self.source[begin..self.offset];
        keyword(name).unwrap_or_else(|| TokenKind::Name(name.to_string()))
    }

    fn operator_or_punctuation(
        &mut self,
        first: char,
        start: &SourcePosition,
    ) -> Result<TokenKind, CompileError> {
        self.advance();

        if let Some(kind) = self.peek().and_then(|second| double_char_token(first, second)) {
            self.advance();
            return Ok(kind);
        }

        single_char_token(first).ok_or_else(|| {
            CompileError::new(format!("Unknown character '{first}'"), start.clone())
        })
    }

    /// Skip whitespace and line comments
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_ahead(1) == Some('/') {
                self.skip_line_comment();
            } else {
                break;
            }
        }
    }

    /// Skip single-line comment (// ...), leaving the newline
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.source[self.offset..].chars().nth(n)
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Get current source position
    fn current_position(&self) -> SourcePosition {
        SourcePosition {
            filepath: Rc::clone(&self.filepath),
            source: Rc::clone(&self.source),
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }
}

//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, its token-buffer helpers and
//! the file-level parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: C-style declarators (pointers, arrays, parameter lists)
//! - `statements`: Statements, blocks and function definitions
//! - `expressions`: Expressions with precedence climbing and operator typing
//!
//! Name resolution and type checking are not a separate pass. Every node is
//! checked against the [`Scopes`] as it is built, and the first violation
//! aborts the parse with a [`CompileError`].
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.
//!
//! The whole file is tokenized up front. The declarator parser relies on this:
//! it scans ahead and then seeks `position` back to interpret what it found.

use crate::parser::ast::{File, SourcePosition};
use crate::parser::errors::CompileError;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::scope::Scopes;
use crate::parser::types::{builtin_types, Type};
use std::mem;
use std::rc::Rc;
use tracing::debug;

/// Recursive descent parser and type checker for one source file
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) scopes: Scopes,
    /// The built-in `bool`, result type of comparisons
    pub(crate) bool_type: Type,
    /// Return type of the function whose body is being parsed
    pub(crate) return_type: Option<Type>,
    filepath: Rc<str>,
}

impl Parser {
    pub fn new(
        filepath: impl Into<Rc<str>>,
        source: impl Into<Rc<str>>,
    ) -> Result<Self, CompileError> {
        let filepath = filepath.into();
        let tokens = Lexer::new(Rc::clone(&filepath), source).tokenize()?;

        let builtins = builtin_types();
        let bool_type = builtins
            .iter()
            .find(|(name, _)| *name == "bool")
            .map(|(_, ty)| ty.clone())
            .unwrap_or_else(Type::bool);

        Ok(Self {
            tokens,
            position: 0,
            scopes: Scopes::new(builtins),
            bool_type,
            return_type: None,
            filepath,
        })
    }

    /// Parse the entire file (top-level statements)
    #[tracing::instrument(skip(self), fields(file = %self.filepath))]
    pub fn parse_file(&mut self) -> Result<File, CompileError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        debug!(statements = statements.len(), "parsed file");
        Ok(File {
            filepath: self.filepath.to_string(),
            statements,
        })
    }

    // ===== Helper methods =====

    /// Whether the current token names a type visible in scope
    pub(crate) fn is_type_name(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Name(name) => self.scopes.resolve_type(name).is_some(),
            _ => false,
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(self.peek_kind()) == mem::discriminant(kind)
    }

    /// Consume the current token. The end-of-file token is never consumed.
    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
            &self.tokens[self.position - 1]
        } else {
            self.peek()
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::EndOfFile)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn current_position(&self) -> SourcePosition {
        self.peek().position.clone()
    }

    /// An error positioned at the current token
    pub(crate) fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(message, self.current_position())
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: &TokenKind,
        message: &str,
    ) -> Result<Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.error(format!("{}, found {}", message, self.peek_kind())))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<Token, CompileError> {
        self.expect_token(&TokenKind::Semicolon, &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<Token, CompileError> {
        self.expect_token(&TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_name(&mut self) -> Result<(String, SourcePosition), CompileError> {
        if let TokenKind::Name(name) = self.peek_kind() {
            let name = name.clone();
            let position = self.advance().position.clone();
            Ok((name, position))
        } else {
            Err(self.error(format!("Expected identifier, found {}", self.peek_kind())))
        }
    }
}

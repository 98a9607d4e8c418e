//! Compile error type for the front end
//!
//! This module defines [`CompileError`], the single error value produced by the
//! lexer and the parser. Lexical, syntactic and semantic failures are all
//! reported through it and are distinguished only by their message text.
//!
//! Every error is fatal: the first one aborts the parse and is handed back to
//! the caller, which formats it as `<filepath>:<line>:<column>: <message>`.

use crate::parser::ast::SourcePosition;
use thiserror::Error;

/// A lexical, syntactic or semantic error at a source position
#[derive(Debug, Clone, Error)]
#[error("{position}: {message}")]
pub struct CompileError {
    pub message: String,
    pub position: SourcePosition,
}

impl CompileError {
    pub fn new(message: impl Into<String>, position: SourcePosition) -> Self {
        CompileError {
            message: message.into(),
            position,
        }
    }
}

//! # Introduction
//!
//! lilc is the front end of a compiler for a small C-like language. It reads
//! one source file and produces an AST in which every expression is already
//! typed and every name is already resolved.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser (+ scopes, type checks) → File AST
//! ```
//!
//! 1. [`parser::lexer`] turns the source into tokens.
//! 2. [`parser::parse::Parser`] walks the tokens with recursive descent,
//!    resolving names and checking types as it builds each node.
//! 3. The first error stops everything and comes back as a
//!    [`CompileError`], whose `Display` is `path:line:column: message`.
//!
//! ## Example
//!
//! ```
//! let file = lilc::parse_source("add.lc", "int32 add(int32 a, int32 b) { return a + b; }")
//!     .unwrap();
//! assert_eq!(file.statements.len(), 1);
//!
//! let err = lilc::parse_source("bad.lc", "1 + 1;").unwrap_err();
//! assert_eq!(err.to_string(), "bad.lc:1:1: Ambiguous type for integer literal");
//! ```

use std::fs;
use std::path::Path;

pub mod parser;

pub use parser::ast::{File, SourcePosition};
pub use parser::errors::CompileError;
pub use parser::parse::Parser;

/// Parse and type-check source text that came from `filepath`
pub fn parse_source(filepath: &str, source: &str) -> Result<File, CompileError> {
    Parser::new(filepath, source)?.parse_file()
}

/// Read and parse a file.
///
/// A file that cannot be read is reported as a [`CompileError`] at its first
/// line and column.
pub fn parse_file(path: impl AsRef<Path>) -> Result<File, CompileError> {
    let filepath = path.as_ref().display().to_string();
    let source = fs::read_to_string(path.as_ref()).map_err(|err| {
        CompileError::new(
            format!("Unable to read file: {err}"),
            SourcePosition::new(filepath.as_str(), "", 0, 1, 1),
        )
    })?;

    parse_source(&filepath, &source)
}

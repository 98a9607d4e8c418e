//! Source parser and type checker
//!
//! This module transforms source text into a fully typed Abstract Syntax Tree:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing and checking (tokens → AST), split across
//!   `declarations`, `statements` and `expressions`
//! - [`ast`]: AST node definitions
//! - [`types`]: Type representation and matching rules
//! - [`scope`]: Nested scopes for type names and declarations
//! - [`errors`]: The error every stage reports
//! - `stack`: Stack growth for deeply nested input
//!
//! # Language
//!
//! - Types: `void`, `bool`, `int8` to `int64`, pointers, arrays, functions
//! - Type names: `typedef` aliases and `distinct` nominal copies
//! - Statements: declarations, `var`, assignments, `if`/`else`, `while`,
//!   `return`, blocks
//! - Expressions: arithmetic, comparisons, `&`/`*`, casts, calls
//! - No preprocessor, one file per parse
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
pub mod errors;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod scope;
mod stack;
mod statements;
pub mod types;

//! Declarator parsing implementation
//!
//! A declaration is a base type name followed by a declarator that wraps it in
//! pointers, arrays and function types and (usually) names the declared
//! entity:
//!
//! ```text
//! int32 *values[4];                     // array 4 of pointer to int32
//! int32 (*grid)[4];                     // pointer to array 4 of int32
//! int32 (*make_adder(int32 base))(int32)
//! ```
//!
//! # Algorithm
//!
//! Suffixes bind tighter than a leading `*`, and parentheses regroup. Rather
//! than a grammar, the declarator is read in two phases:
//!
//! 1. Leading `*`s wrap the base type. The rest of the declarator is then
//!    scanned up to its end while tracking parenthesis depth, recording the
//!    position of every name, `[` and `(` seen at depth 0.
//! 2. The recorded positions are revisited last-first. `[N]` wraps in an
//!    array, a parameter list wraps in a function type, a grouping `( ... )`
//!    recurses with the type built so far as its base, and a name is the
//!    declared name.
//!
//! Afterwards the cursor is put back at the end found in phase 1.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::SourcePosition;
use crate::parser::errors::CompileError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::stack::ensure_sufficient_stack;
use crate::parser::types::{Parameter, Type};

/// The declared name and where it was spelled
#[derive(Debug, Clone)]
pub(crate) struct DeclaredName {
    pub name: String,
    pub position: SourcePosition,
}

/// Result of parsing one declarator
#[derive(Debug, Clone)]
pub(crate) struct Declarator {
    pub ty: Type,
    pub name: Option<DeclaredName>,
}

impl Parser {
    /// Parse a type specifier and declarator.
    ///
    /// With `base` set, no type name is read and `base` is used instead; this
    /// is how a parenthesized group receives the type built around it.
    pub(crate) fn parse_declarator(&mut self, base: Option<Type>) -> Result<Declarator, CompileError> {
        ensure_sufficient_stack(|| self.parse_declarator_inner(base))
    }

    fn parse_declarator_inner(&mut self, base: Option<Type>) -> Result<Declarator, CompileError> {
        let mut ty = match base {
            Some(ty) => ty,
            None => self.parse_type_name()?,
        };

        while self.match_token(&TokenKind::Star) {
            ty = Type::pointer(ty);
        }

        let components = self.scan_declarator()?;
        let end = self.position;

        let mut name: Option<DeclaredName> = None;
        for start in components.into_iter().rev() {
            self.position = start;

            match self.peek_kind() {
                TokenKind::LBracket => {
                    ty = self.parse_array_suffix(ty)?;
                }
                TokenKind::LParen => {
                    self.advance();
                    if self.check(&TokenKind::RParen) || self.is_type_name() {
                        let parameters = self.parse_parameter_list()?;
                        ty = Type::function(ty, parameters);
                    } else {
                        let inner = self.parse_declarator(Some(ty))?;
                        self.expect_rparen("to close declarator group")?;
                        ty = inner.ty;
                        if let Some(inner_name) = inner.name {
                            set_name(&mut name, inner_name)?;
                        }
                    }
                }
                TokenKind::Name(spelling) => {
                    let declared = DeclaredName {
                        name: spelling.clone(),
                        position: self.current_position(),
                    };
                    set_name(&mut name, declared)?;
                }
                other => {
                    return Err(self.error(format!("Unexpected {other} in declarator")));
                }
            }
        }

        self.position = end;
        Ok(Declarator { ty, name })
    }

    /// Consume a type name that resolves in scope
    pub(crate) fn parse_type_name(&mut self) -> Result<Type, CompileError> {
        if let TokenKind::Name(name) = self.peek_kind() {
            if let Some(ty) = self.scopes.resolve_type(name) {
                let ty = ty.clone();
                self.advance();
                return Ok(ty);
            }
        }
        Err(self.error(format!("Expected type name, found {}", self.peek_kind())))
    }

    /// Phase one: find the end of the declarator and the components to revisit
    fn scan_declarator(&mut self) -> Result<Vec<usize>, CompileError> {
        let mut components = Vec::new();
        let mut depth: usize = 0;

        loop {
            match self.peek_kind() {
                TokenKind::EndOfFile | TokenKind::Semicolon | TokenKind::Eq => break,
                TokenKind::Comma | TokenKind::LBrace if depth == 0 => break,
                TokenKind::LParen => {
                    if depth == 0 {
                        components.push(self.position);
                    }
                    depth += 1;
                }
                TokenKind::RParen => {
                    if depth == 0 {
                        // Closes an enclosing group or parameter list
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Name(_) | TokenKind::LBracket if depth == 0 => {
                    components.push(self.position);
                }
                TokenKind::Integer(_) | TokenKind::RBracket => {}
                other if depth == 0 => {
                    return Err(self.error(format!("Unexpected {other} in declarator")));
                }
                _ => {}
            }
            self.advance();
        }

        Ok(components)
    }

    /// Parse `[N]` and wrap `element` in an array type
    pub(crate) fn parse_array_suffix(&mut self, element: Type) -> Result<Type, CompileError> {
        self.expect_token(&TokenKind::LBracket, "Expected '['")?;

        let count = match self.peek_kind() {
            TokenKind::Integer(value) => *value,
            other => {
                return Err(self.error(format!("Expected array length, found {other}")));
            }
        };
        let count = u64::try_from(count)
            .map_err(|_| self.error(format!("Invalid array length {count}")))?;
        self.advance();

        self.expect_token(&TokenKind::RBracket, "Expected ']' after array length")?;
        Ok(Type::array(element, count))
    }

    /// Parse parameter declarators up to and including the closing `)`.
    ///
    /// The opening `(` has already been consumed. Parameter names are optional
    /// here; function definitions check for them separately.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, CompileError> {
        let mut parameters = Vec::new();

        if !self.check(&TokenKind::RParen) {
            loop {
                let start = self.current_position();
                let declarator = self.parse_declarator(None)?;
                let (name, position) = match declarator.name {
                    Some(declared) => (Some(declared.name), declared.position),
                    None => (None, start),
                };
                parameters.push(Parameter {
                    name,
                    ty: declarator.ty,
                    position,
                });

                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect_rparen("after parameter list")?;
        Ok(parameters)
    }
}

fn set_name(slot: &mut Option<DeclaredName>, declared: DeclaredName) -> Result<(), CompileError> {
    if slot.is_some() {
        return Err(CompileError::new(
            format!("Unexpected name '{}' in declarator", declared.name),
            declared.position,
        ));
    }
    *slot = Some(declared);
    Ok(())
}

//! Expression parsing implementation
//!
//! This module handles parsing of expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//! Each node's type is computed as it is built.
//!
//! # Supported Expressions
//!
//! - Integer literals, typed by the surrounding context
//! - Names, resolved against the enclosing scopes
//! - Unary operators: `+`, `-`, `&`, `*`
//! - Binary operators: `*` `/`, `+` `-`, `<` `<=` `>` `>=`, `==`
//! - Casts `(type) expr` and parenthesized grouping
//! - Function calls, which may chain: `f(1)(2)`
//!
//! # Suggested Types
//!
//! A literal has no type of its own. Every parse function takes the type the
//! context expects, if any, and a literal takes that type when it is an
//! integer type. Declarations suggest the declared type, the right operand of
//! a binary operator gets the left operand's type, arguments get their
//! parameter's type.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::errors::CompileError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::stack::ensure_sufficient_stack;
use crate::parser::types::Type;

/// Unary operators bind tighter than every binary operator.
const UNARY_PRECEDENCE: u8 = 5;

/// The operand of a cast is a single unary expression.
const CAST_PRECEDENCE: u8 = u8::MAX;

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(
        &mut self,
        suggested: Option<&Type>,
    ) -> Result<Expression, CompileError> {
        self.parse_precedence(0, suggested)
    }

    /// Precedence climbing: parse operators binding tighter than `min_precedence`
    fn parse_precedence(
        &mut self,
        min_precedence: u8,
        suggested: Option<&Type>,
    ) -> Result<Expression, CompileError> {
        ensure_sufficient_stack(|| self.parse_precedence_inner(min_precedence, suggested))
    }

    fn parse_precedence_inner(
        &mut self,
        min_precedence: u8,
        suggested: Option<&Type>,
    ) -> Result<Expression, CompileError> {
        let mut left = self.parse_unary(suggested)?;

        while let Some(operator) = self.peek_binary_operator() {
            let precedence = operator.precedence();
            if precedence <= min_precedence {
                break;
            }

            let operator_position = self.advance().position.clone();
            let right = self.parse_precedence(precedence, Some(left.ty()))?;
            let ty = self.binary_result_type(operator, left.ty(), right.ty())
                .ok_or_else(|| {
                    CompileError::new(
                        format!(
                            "No binary operator {} for types {} and {}",
                            operator,
                            left.ty(),
                            right.ty()
                        ),
                        operator_position,
                    )
                })?;

            let position = left.position().clone();
            left = Expression::Binary {
                ty,
                left: Box::new(left),
                operator,
                right: Box::new(right),
                position,
            };
        }

        Ok(left)
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperator> {
        match self.peek_kind() {
            TokenKind::Plus => Some(BinaryOperator::Add),
            TokenKind::Minus => Some(BinaryOperator::Subtract),
            TokenKind::Star => Some(BinaryOperator::Multiply),
            TokenKind::Slash => Some(BinaryOperator::Divide),
            TokenKind::Lt => Some(BinaryOperator::Less),
            TokenKind::Le => Some(BinaryOperator::LessEqual),
            TokenKind::Gt => Some(BinaryOperator::Greater),
            TokenKind::Ge => Some(BinaryOperator::GreaterEqual),
            TokenKind::EqEq => Some(BinaryOperator::Equal),
            _ => None,
        }
    }

    /// Parse unary prefix operators: + - & *
    fn parse_unary(&mut self, suggested: Option<&Type>) -> Result<Expression, CompileError> {
        let operator = match self.peek_kind() {
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Minus => UnaryOperator::Minus,
            TokenKind::Amp => UnaryOperator::AddressOf,
            TokenKind::Star => UnaryOperator::Dereference,
            _ => return self.parse_postfix(suggested),
        };
        let position = self.advance().position.clone();

        // Only sign operators keep the literal's suggested type
        let operand_suggestion = match operator {
            UnaryOperator::Plus | UnaryOperator::Minus => suggested,
            UnaryOperator::AddressOf | UnaryOperator::Dereference => None,
        };
        let operand = self.parse_precedence(UNARY_PRECEDENCE, operand_suggestion)?;

        let ty = unary_result_type(operator, operand.ty()).ok_or_else(|| {
            CompileError::new(
                format!("No unary operator {} for type {}", operator, operand.ty()),
                position.clone(),
            )
        })?;

        Ok(Expression::Unary {
            ty,
            operator,
            operand: Box::new(operand),
            position,
        })
    }

    /// Parse a primary expression followed by any number of calls
    fn parse_postfix(&mut self, suggested: Option<&Type>) -> Result<Expression, CompileError> {
        let mut expression = self.parse_primary(suggested)?;

        while self.check(&TokenKind::LParen) {
            let Some(function) = expression.ty().as_function().cloned() else {
                return Err(self.error(format!(
                    "Cannot call a non-function of type {}",
                    expression.ty()
                )));
            };
            self.advance();

            let expected = function.parameters.len();
            let mut arguments = Vec::with_capacity(expected);
            for (index, parameter) in function.parameters.iter().enumerate() {
                if self.check(&TokenKind::RParen) {
                    return Err(self.error(format!(
                        "Too few arguments, expected {expected}, found {index}"
                    )));
                }
                if index > 0 {
                    self.expect_token(&TokenKind::Comma, "Expected ',' between arguments")?;
                }

                let argument = self.parse_expression(Some(&parameter.ty))?;
                if !argument.ty().matches(&parameter.ty) {
                    return Err(CompileError::new(
                        format!(
                            "Argument {} has type {}, expected {}",
                            index + 1,
                            argument.ty(),
                            parameter.ty
                        ),
                        argument.position().clone(),
                    ));
                }
                arguments.push(argument);
            }
            if !self.check(&TokenKind::RParen) && (expected == 0 || self.check(&TokenKind::Comma)) {
                return Err(self.error(format!("Too many arguments, expected {expected}")));
            }
            self.expect_rparen("after arguments")?;

            let callee_type = expression.ty().clone();
            let position = expression.position().clone();
            expression = Expression::FunctionCall {
                function: callee_type,
                ty: function.return_type,
                callee: Box::new(expression),
                arguments,
                position,
            };
        }

        Ok(expression)
    }

    /// Parse primary expression: literal, name, cast, parenthesized
    fn parse_primary(&mut self, suggested: Option<&Type>) -> Result<Expression, CompileError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Integer(value) => {
                let ty = match suggested {
                    Some(ty) if ty.is_integer() => ty.clone(),
                    _ => return Err(self.error("Ambiguous type for integer literal")),
                };
                self.advance();
                Ok(Expression::Integer {
                    ty,
                    value,
                    position: token.position,
                })
            }

            TokenKind::Name(name) => {
                let Some(declaration) = self.scopes.resolve_declaration(&name).cloned() else {
                    return Err(self.error(format!("Unable to find name '{name}'")));
                };
                self.advance();
                Ok(Expression::Name {
                    declaration,
                    name,
                    position: token.position,
                })
            }

            TokenKind::LParen => {
                self.advance();
                if self.is_type_name() {
                    return self.parse_cast(token.position);
                }

                let inner = self.parse_expression(suggested)?;
                self.expect_rparen("after expression")?;
                Ok(inner)
            }

            other => Err(self.error(format!("Expected expression, found {other}"))),
        }
    }

    /// Parse the rest of `(type) operand` after the opening parenthesis
    fn parse_cast(&mut self, position: SourcePosition) -> Result<Expression, CompileError> {
        let declarator = self.parse_declarator(None)?;
        if let Some(name) = declarator.name {
            return Err(CompileError::new("Unexpected name in cast", name.position));
        }
        self.expect_rparen("after cast type")?;

        let ty = declarator.ty;
        let operand = self.parse_precedence(CAST_PRECEDENCE, Some(&ty))?;

        if !ty.same_kind(operand.ty()) && ty.size() != operand.ty().size() {
            return Err(CompileError::new(
                format!("Invalid cast from {} to {}", operand.ty(), ty),
                position,
            ));
        }

        Ok(Expression::Cast {
            ty,
            operand: Box::new(operand),
            position,
        })
    }

    /// Result type of `left operator right`, `None` if the operator does not apply
    pub(crate) fn binary_result_type(
        &self,
        operator: BinaryOperator,
        left: &Type,
        right: &Type,
    ) -> Option<Type> {
        let integers = left.is_integer() && right.is_integer() && left.matches(right);

        if operator.is_arithmetic() {
            integers.then(|| left.clone())
        } else if operator.is_relational() {
            integers.then(|| self.bool_type.clone())
        } else {
            left.matches(right).then(|| self.bool_type.clone())
        }
    }
}

/// Result type of a unary operator, `None` if it does not apply
fn unary_result_type(operator: UnaryOperator, operand: &Type) -> Option<Type> {
    match operator {
        UnaryOperator::Plus | UnaryOperator::Minus => {
            operand.is_integer().then(|| operand.clone())
        }
        UnaryOperator::AddressOf => Some(Type::pointer(operand.clone())),
        UnaryOperator::Dereference => operand.pointee().cloned(),
    }
}

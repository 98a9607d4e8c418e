//! Statement parsing implementation
//!
//! This module handles parsing of all statement types:
//!
//! - Declarations: `int32 x = 42;`, `var y = x;`
//! - Function definitions: `int32 add(int32 a, int32 b) { ... }`
//! - Type names: `typedef int32 *IntPtr;`, `distinct int32 Meters;`
//! - Control flow: `if`, `while`, `return`
//! - Blocks: `{ ... }`
//! - Expression statements and assignments: `f(x);`, `*p += 1;`
//!
//! # Grammar
//!
//! ```text
//! statement ::= declaration | function_def | typedef | distinct
//!             | if_stmt | while_stmt | return_stmt | var_decl
//!             | block | assignment | expr_stmt
//! ```
//!
//! Control-flow bodies are always braced blocks, each with its own scope.
//! A function body shares its scope with the function's parameters.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::declarations::DeclaredName;
use crate::parser::errors::CompileError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::stack::ensure_sufficient_stack;
use crate::parser::types::Type;
use std::rc::Rc;
use tracing::debug;

impl Parser {
    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, CompileError> {
        // Check for keywords first
        if self.check(&TokenKind::Typedef) {
            return self.parse_type_definition(false);
        }

        if self.check(&TokenKind::Distinct) {
            return self.parse_type_definition(true);
        }

        if self.check(&TokenKind::If) {
            return self.parse_if_statement();
        }

        if self.check(&TokenKind::While) {
            return self.parse_while_statement();
        }

        if self.check(&TokenKind::Return) {
            return self.parse_return_statement();
        }

        if self.check(&TokenKind::Var) {
            return self.parse_var_declaration();
        }

        if self.check(&TokenKind::LBrace) {
            return Ok(Statement::Scope(self.parse_scope()?));
        }

        if self.is_type_name() {
            return self.parse_declaration();
        }

        self.parse_expression_statement()
    }

    /// Parse a braced block in a new scope
    pub(crate) fn parse_scope(&mut self) -> Result<Scope, CompileError> {
        self.scopes.push();
        let block = self.parse_block();
        self.scopes.pop();

        let (scope, _) = block?;
        Ok(scope)
    }

    /// Parse `{ statements }` in the current scope.
    ///
    /// Returns the position of the closing brace alongside the block.
    fn parse_block(&mut self) -> Result<(Scope, SourcePosition), CompileError> {
        ensure_sufficient_stack(|| self.parse_block_inner())
    }

    fn parse_block_inner(&mut self) -> Result<(Scope, SourcePosition), CompileError> {
        let position = self.current_position();
        self.expect_token(&TokenKind::LBrace, "Expected '{' to open block")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        let closing = self.current_position();
        self.expect_token(&TokenKind::RBrace, "Expected '}' to close block")?;

        Ok((
            Scope {
                statements,
                position,
            },
            closing,
        ))
    }

    /// Parse a declaration or a function definition, both starting with a type
    pub(crate) fn parse_declaration(&mut self) -> Result<Statement, CompileError> {
        let start = self.current_position();
        let declarator = self.parse_declarator(None)?;
        let Some(name) = declarator.name else {
            return Err(CompileError::new("Expected name in declaration", start));
        };

        if declarator.ty.is_function() && self.check(&TokenKind::LBrace) {
            return self.parse_function_definition(declarator.ty, name);
        }

        let ty = declarator.ty;
        let value = if self.match_token(&TokenKind::Eq) {
            let value = self.parse_expression(Some(&ty))?;
            if !value.ty().matches(&ty) {
                return Err(CompileError::new(
                    format!(
                        "Initializer type {} does not match declared type {}",
                        value.ty(),
                        ty
                    ),
                    value.position().clone(),
                ));
            }
            Some(value)
        } else {
            None
        };
        self.expect_semicolon("after declaration")?;

        let declaration = Rc::new(Declaration {
            name: name.name,
            ty,
            value,
            position: name.position,
        });
        self.scopes.declare(Rc::clone(&declaration))?;

        Ok(Statement::Declaration(declaration))
    }

    /// Parse a function body after its declarator
    fn parse_function_definition(
        &mut self,
        ty: Type,
        name: DeclaredName,
    ) -> Result<Statement, CompileError> {
        if self.scopes.depth() > 1 {
            return Err(CompileError::new(
                "Cannot define nested functions",
                name.position,
            ));
        }

        let Some(function) = ty.as_function() else {
            return Err(CompileError::new(
                format!("Expected a function type, found {ty}"),
                name.position,
            ));
        };

        let mut parameters = Vec::with_capacity(function.parameters.len());
        for parameter in &function.parameters {
            let Some(parameter_name) = &parameter.name else {
                return Err(CompileError::new(
                    "Expected name in function parameter",
                    parameter.position.clone(),
                ));
            };
            parameters.push(Rc::new(Declaration {
                name: parameter_name.clone(),
                ty: parameter.ty.clone(),
                value: None,
                position: parameter.position.clone(),
            }));
        }
        let return_type = function.return_type.clone();

        // Registered before the body so the function can call itself
        let declaration = Rc::new(Declaration {
            name: name.name,
            ty,
            value: None,
            position: name.position,
        });
        self.scopes.declare(Rc::clone(&declaration))?;
        debug!(function = %declaration.name, ty = %declaration.ty, "define function");

        self.scopes.push();
        let body = self.parse_function_body(&parameters, return_type);
        self.scopes.pop();

        Ok(Statement::Function {
            declaration,
            parameters,
            body: body?,
        })
    }

    fn parse_function_body(
        &mut self,
        parameters: &[Rc<Declaration>],
        return_type: Type,
    ) -> Result<Scope, CompileError> {
        for parameter in parameters {
            self.scopes.declare(Rc::clone(parameter))?;
        }

        let enclosing = self.return_type.replace(return_type.clone());
        let block = self.parse_block();
        self.return_type = enclosing;
        let (mut body, closing) = block?;

        if !returns_on_all_paths(&body.statements) {
            if !return_type.is_void() {
                return Err(CompileError::new(
                    "Function does not return in all code paths",
                    closing,
                ));
            }
            debug!(line = closing.line, "implicit return");
            body.statements.push(Statement::Return {
                value: None,
                position: closing,
            });
        }

        Ok(body)
    }

    /// Parse `typedef <decl>;` or `distinct <decl>;`
    fn parse_type_definition(&mut self, distinct: bool) -> Result<Statement, CompileError> {
        let position = self.advance().position.clone();

        let start = self.current_position();
        let declarator = self.parse_declarator(None)?;
        let Some(name) = declarator.name else {
            return Err(CompileError::new("Expected name in declaration", start));
        };
        self.expect_semicolon("after type definition")?;

        let ty = if distinct {
            declarator.ty.distinct(name.name.as_str())
        } else {
            declarator.ty
        };
        self.scopes.define_type(&name.name, ty.clone(), &name.position)?;

        Ok(if distinct {
            Statement::Distinct {
                name: name.name,
                ty,
                position,
            }
        } else {
            Statement::Typedef {
                name: name.name,
                ty,
                position,
            }
        })
    }

    /// Parse the condition of `if` or `while`, which must be a `bool`
    fn parse_condition(&mut self) -> Result<Expression, CompileError> {
        let bool_type = self.bool_type.clone();
        let condition = self.parse_expression(Some(&bool_type))?;

        if !condition.ty().is_bool() {
            return Err(CompileError::new(
                format!("Condition must be bool, found {}", condition.ty()),
                condition.position().clone(),
            ));
        }
        Ok(condition)
    }

    fn parse_if_statement(&mut self) -> Result<Statement, CompileError> {
        let position = self.advance().position.clone();

        let condition = self.parse_condition()?;
        let then_scope = self.parse_scope()?;
        let else_scope = if self.match_token(&TokenKind::Else) {
            Some(self.parse_scope()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_scope,
            else_scope,
            position,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, CompileError> {
        let position = self.advance().position.clone();

        let condition = self.parse_condition()?;
        let body = self.parse_scope()?;

        Ok(Statement::While {
            condition,
            body,
            position,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, CompileError> {
        let position = self.advance().position.clone();

        let Some(return_type) = self.return_type.clone() else {
            return Err(CompileError::new("Return outside of a function", position));
        };

        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(Some(&return_type))?)
        };

        match &value {
            Some(value) if return_type.is_void() => {
                return Err(CompileError::new(
                    "Cannot return a value from a void function",
                    value.position().clone(),
                ));
            }
            Some(value) if !value.ty().matches(&return_type) => {
                return Err(CompileError::new(
                    format!(
                        "Return type {} does not match function return type {}",
                        value.ty(),
                        return_type
                    ),
                    value.position().clone(),
                ));
            }
            None if !return_type.is_void() => {
                return Err(CompileError::new(
                    format!("Expected a return value of type {return_type}"),
                    position,
                ));
            }
            _ => {}
        }
        self.expect_semicolon("after return")?;

        Ok(Statement::Return { value, position })
    }

    /// Parse `var name = value;`, typed by its initializer
    fn parse_var_declaration(&mut self) -> Result<Statement, CompileError> {
        self.advance();

        let (name, position) = self.expect_name()?;
        self.expect_token(&TokenKind::Eq, "Expected '=' after variable name")?;
        let value = self.parse_expression(None)?;
        self.expect_semicolon("after declaration")?;

        let declaration = Rc::new(Declaration {
            name,
            ty: value.ty().clone(),
            value: Some(value),
            position,
        });
        self.scopes.declare(Rc::clone(&declaration))?;

        Ok(Statement::Declaration(declaration))
    }

    /// Parse an expression statement or an assignment
    fn parse_expression_statement(&mut self) -> Result<Statement, CompileError> {
        let target = self.parse_expression(None)?;

        let operator = match self.peek_kind() {
            TokenKind::Eq => AssignmentOperator::Assign,
            TokenKind::PlusEq => AssignmentOperator::AddAssign,
            TokenKind::MinusEq => AssignmentOperator::SubtractAssign,
            TokenKind::StarEq => AssignmentOperator::MultiplyAssign,
            TokenKind::SlashEq => AssignmentOperator::DivideAssign,
            _ => {
                self.expect_semicolon("after expression")?;
                return Ok(Statement::Expression(target));
            }
        };

        if !target.is_assignable() {
            return Err(CompileError::new(
                "Expression is not assignable",
                target.position().clone(),
            ));
        }
        let operator_position = self.advance().position.clone();

        let value = self.parse_expression(Some(target.ty()))?;
        let compatible = match operator.binary_operator() {
            Some(binary) => self
                .binary_result_type(binary, target.ty(), value.ty())
                .is_some(),
            None => value.ty().matches(target.ty()),
        };
        if !compatible {
            return Err(CompileError::new(
                format!(
                    "Cannot apply {} to {} and {}",
                    operator,
                    target.ty(),
                    value.ty()
                ),
                operator_position,
            ));
        }
        self.expect_semicolon("after assignment")?;

        let position = target.position().clone();
        Ok(Statement::Assignment {
            target,
            operator,
            value,
            position,
        })
    }
}

/// Whether every path through `statements` reaches a `return`.
///
/// An `if` only counts when both branches return; a missing `else` falls
/// through.
pub(crate) fn returns_on_all_paths(statements: &[Statement]) -> bool {
    ensure_sufficient_stack(|| {
        statements.iter().any(|statement| match statement {
            Statement::Return { .. } => true,
            Statement::Scope(scope) => returns_on_all_paths(&scope.statements),
            Statement::If {
                then_scope,
                else_scope: Some(else_scope),
                ..
            } => {
                returns_on_all_paths(&then_scope.statements)
                    && returns_on_all_paths(&else_scope.statements)
            }
            _ => false,
        })
    })
}

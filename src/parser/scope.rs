//! Lexical scopes for type names and declarations
//!
//! [`Scopes`] keeps two parallel stacks of maps, one for type names and one
//! for value names. A level is pushed when the parser enters a function body
//! or a nested block and popped when it leaves it. Lookups walk from the
//! innermost level outwards, so an inner declaration shadows an outer one.
//!
//! The root level is seeded with the built-in types and never popped.

use crate::parser::ast::{Declaration, SourcePosition};
use crate::parser::errors::CompileError;
use crate::parser::types::Type;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::debug;

/// Nested type and declaration scopes
#[derive(Debug)]
pub struct Scopes {
    types: Vec<FxHashMap<String, Type>>,
    declarations: Vec<FxHashMap<String, Rc<Declaration>>>,
}

impl Scopes {
    /// Create the root scope with the given built-in types
    pub fn new<'a>(builtins: impl IntoIterator<Item = (&'a str, Type)>) -> Self {
        let root = builtins
            .into_iter()
            .map(|(name, ty)| (name.to_string(), ty))
            .collect();
        Scopes {
            types: vec![root],
            declarations: vec![FxHashMap::default()],
        }
    }

    /// Number of open levels, 1 at file level
    pub fn depth(&self) -> usize {
        self.declarations.len()
    }

    /// Enter a new scope
    pub fn push(&mut self) {
        self.types.push(FxHashMap::default());
        self.declarations.push(FxHashMap::default());
        debug!(depth = self.depth(), "enter scope");
    }

    /// Exit the current scope
    pub fn pop(&mut self) {
        if self.depth() > 1 {
            self.types.pop();
            self.declarations.pop();
            debug!(depth = self.depth(), "leave scope");
        }
    }

    pub fn resolve_type(&self, name: &str) -> Option<&Type> {
        self.types.iter().rev().find_map(|level| level.get(name))
    }

    pub fn resolve_declaration(&self, name: &str) -> Option<&Rc<Declaration>> {
        self.declarations
            .iter()
            .rev()
            .find_map(|level| level.get(name))
    }

    /// Declare a value name in the innermost scope
    pub fn declare(&mut self, declaration: Rc<Declaration>) -> Result<(), CompileError> {
        let level = self
            .declarations
            .last_mut()
            .ok_or_else(|| CompileError::new("No open scope", declaration.position.clone()))?;

        if level.contains_key(&declaration.name) {
            return Err(CompileError::new(
                format!("'{}' is already declared in this scope", declaration.name),
                declaration.position.clone(),
            ));
        }

        level.insert(declaration.name.clone(), declaration);
        Ok(())
    }

    /// Bind a type name in the innermost scope
    pub fn define_type(
        &mut self,
        name: &str,
        ty: Type,
        position: &SourcePosition,
    ) -> Result<(), CompileError> {
        let level = self
            .types
            .last_mut()
            .ok_or_else(|| CompileError::new("No open scope", position.clone()))?;

        if level.contains_key(name) {
            return Err(CompileError::new(
                format!("Type '{name}' is already defined in this scope"),
                position.clone(),
            ));
        }

        debug!(type_name = name, ty = %ty, "define type");
        level.insert(name.to_string(), ty);
        Ok(())
    }
}

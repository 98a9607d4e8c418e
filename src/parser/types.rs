//! Type representation and type compatibility
//!
//! A [`Type`] is a reference-counted handle to one type *instance*. Cloning the
//! handle shares the instance; [`Type::duplicate`] creates a new one.
//!
//! # Matching Rules
//!
//! [`Type::matches`] mixes two notions of equality:
//!
//! - `void`, `bool` and integers are nominal: they match only the very same
//!   instance. Two `int32` built separately do not match each other.
//! - Pointers and arrays are structural: they match when their pointee or
//!   element types match. Array lengths are not compared.
//! - Functions match when they take the same number of parameters and every
//!   parameter type matches pairwise. Return types are not compared.
//!
//! The nominal rule is what gives `distinct` its meaning: the duplicate of
//! `int32` has the same width and signedness but is a different instance.
//! A `distinct` instance also remembers its name, so diagnostics can tell it
//! apart from its base.

use crate::parser::ast::SourcePosition;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// Size of a pointer or function reference, in bytes
pub const WORD_SIZE: u64 = 8;

/// Handle to a type instance
#[derive(Debug, Clone)]
pub struct Type(Rc<Instance>);

#[derive(Debug)]
struct Instance {
    kind: TypeKind,
    name: Option<String>,
}

/// The closed set of type shapes
#[derive(Debug, Clone)]
pub enum TypeKind {
    Void,
    Bool,
    Integer { bits: u32, signed: bool },
    Pointer(Type),
    Array { element: Type, count: u64 },
    Function(FunctionType),
}

/// Return type and ordered parameter list of a function type
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
}

/// One entry of a parameter list
///
/// The name is optional in a bare function type such as the `(int32)` in
/// `int32 (*callback)(int32)`.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Option<String>,
    pub ty: Type,
    pub position: SourcePosition,
}

impl Type {
    fn new(kind: TypeKind) -> Self {
        Type(Rc::new(Instance { kind, name: None }))
    }

    pub fn void() -> Self {
        Type::new(TypeKind::Void)
    }

    pub fn bool() -> Self {
        Type::new(TypeKind::Bool)
    }

    pub fn integer(bits: u32, signed: bool) -> Self {
        Type::new(TypeKind::Integer { bits, signed })
    }

    pub fn pointer(pointee: Type) -> Self {
        Type::new(TypeKind::Pointer(pointee))
    }

    pub fn array(element: Type, count: u64) -> Self {
        Type::new(TypeKind::Array { element, count })
    }

    pub fn function(return_type: Type, parameters: Vec<Parameter>) -> Self {
        Type::new(TypeKind::Function(FunctionType {
            return_type,
            parameters,
        }))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    /// Name given by `distinct`, if any
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        match self.kind() {
            TypeKind::Void => 0,
            TypeKind::Bool => 8,
            TypeKind::Integer { bits, .. } => u64::from(*bits) / 8,
            TypeKind::Pointer(_) | TypeKind::Function(_) => WORD_SIZE,
            TypeKind::Array { element, count } => count.saturating_mul(element.size()),
        }
    }

    /// A new instance with the same structure. Component types are shared.
    pub fn duplicate(&self) -> Type {
        Type::new(self.kind().clone())
    }

    /// A named duplicate, as created by `distinct`
    pub fn distinct(&self, name: impl Into<String>) -> Type {
        Type(Rc::new(Instance {
            kind: self.kind().clone(),
            name: Some(name.into()),
        }))
    }

    /// Instance identity
    pub fn same(&self, other: &Type) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Whether both types have the same shape, ignoring components
    pub fn same_kind(&self, other: &Type) -> bool {
        mem::discriminant(self.kind()) == mem::discriminant(other.kind())
    }

    /// Type compatibility, see the module documentation
    pub fn matches(&self, other: &Type) -> bool {
        match (self.kind(), other.kind()) {
            (TypeKind::Pointer(a), TypeKind::Pointer(b)) => a.matches(b),
            (TypeKind::Array { element: a, .. }, TypeKind::Array { element: b, .. }) => {
                a.matches(b)
            }
            (TypeKind::Function(a), TypeKind::Function(b)) => {
                a.parameters.len() == b.parameters.len()
                    && a
                        .parameters
                        .iter()
                        .zip(&b.parameters)
                        .all(|(a, b)| a.ty.matches(&b.ty))
            }
            (TypeKind::Pointer(_) | TypeKind::Array { .. } | TypeKind::Function(_), _) => false,
            _ => self.same(other),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind(), TypeKind::Void)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.kind(), TypeKind::Bool)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.kind(), TypeKind::Integer { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind(), TypeKind::Function(_))
    }

    /// The pointed-to type, if this is a pointer
    pub fn pointee(&self) -> Option<&Type> {
        match self.kind() {
            TypeKind::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self.kind() {
            TypeKind::Function(function) => Some(function),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return write!(f, "{name}");
        }

        match self.kind() {
            TypeKind::Void => write!(f, "void"),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Integer { bits, signed: true } => write!(f, "int{bits}"),
            TypeKind::Integer {
                bits,
                signed: false,
            } => write!(f, "uint{bits}"),
            TypeKind::Pointer(pointee) => write!(f, "pointer to {pointee}"),
            TypeKind::Array { element, count } => write!(f, "array {count} of {element}"),
            TypeKind::Function(function) => {
                write!(f, "function (")?;
                for (index, parameter) in function.parameters.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", parameter.ty)?;
                }
                write!(f, ") returning {}", function.return_type)
            }
        }
    }
}

/// The types every file starts with, in root-scope order
pub fn builtin_types() -> Vec<(&'static str, Type)> {
    vec![
        ("void", Type::void()),
        ("bool", Type::bool()),
        ("int8", Type::integer(8, true)),
        ("int16", Type::integer(16, true)),
        ("int32", Type::integer(32, true)),
        ("int64", Type::integer(64, true)),
    ]
}

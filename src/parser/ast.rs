//! AST (Abstract Syntax Tree) definitions
//!
//! Every node is built exactly once, during the single top-to-bottom parse, and
//! is never mutated afterwards. Expressions carry the [`Type`] they were
//! resolved to at construction time; [`Expression::Name`] holds a shared handle
//! to the [`Declaration`] it resolved to, so declarations stay reachable after
//! their scope has closed.

use crate::parser::types::Type;
use std::fmt;
use std::rc::Rc;

/// Source position for error reporting
///
/// Keeps the file path and the full source text alongside the offset so a
/// diagnostic can re-slice context without re-reading the file. Both strings
/// are shared between all positions of one file.
#[derive(Clone, PartialEq, Eq)]
pub struct SourcePosition {
    pub filepath: Rc<str>,
    pub source: Rc<str>,
    /// Byte offset into `source`
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(
        filepath: impl Into<Rc<str>>,
        source: impl Into<Rc<str>>,
        offset: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            filepath: filepath.into(),
            source: source.into(),
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filepath, self.line, self.column)
    }
}

// Omits the source text.
impl fmt::Debug for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SourcePosition({}:{}:{} @{})",
            self.filepath, self.line, self.column, self.offset
        )
    }
}

/// Unary prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,        // +x
    Minus,       // -x
    AddressOf,   // &x
    Dereference, // *x
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Plus => write!(f, "'+'"),
            UnaryOperator::Minus => write!(f, "'-'"),
            UnaryOperator::AddressOf => write!(f, "'&'"),
            UnaryOperator::Dereference => write!(f, "'*'"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    // Relational
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    // Equality
    Equal,
}

impl BinaryOperator {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide => 4,
            BinaryOperator::Add | BinaryOperator::Subtract => 3,
            BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => 2,
            BinaryOperator::Equal => 1,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEqual
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Equal => "==",
        };
        write!(f, "'{symbol}'")
    }
}

/// Assignment operators, plain and compound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,         // =
    AddAssign,      // +=
    SubtractAssign, // -=
    MultiplyAssign, // *=
    DivideAssign,   // /=
}

impl AssignmentOperator {
    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary_operator(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubtractAssign => Some(BinaryOperator::Subtract),
            AssignmentOperator::MultiplyAssign => Some(BinaryOperator::Multiply),
            AssignmentOperator::DivideAssign => Some(BinaryOperator::Divide),
        }
    }
}

impl fmt::Display for AssignmentOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubtractAssign => "-=",
            AssignmentOperator::MultiplyAssign => "*=",
            AssignmentOperator::DivideAssign => "/=",
        };
        write!(f, "'{symbol}'")
    }
}

/// A named value: variable, parameter, or function
#[derive(Debug)]
pub struct Declaration {
    pub name: String,
    pub ty: Type,
    pub value: Option<Expression>,
    pub position: SourcePosition,
}

/// A braced block of statements
#[derive(Debug, Clone)]
pub struct Scope {
    pub statements: Vec<Statement>,
    pub position: SourcePosition,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Statement {
    Declaration(Rc<Declaration>),
    Typedef {
        name: String,
        ty: Type,
        position: SourcePosition,
    },
    /// A new nominal type cloned from `ty`'s structure
    Distinct {
        name: String,
        ty: Type,
        position: SourcePosition,
    },
    Scope(Scope),
    Function {
        declaration: Rc<Declaration>,
        parameters: Vec<Rc<Declaration>>,
        body: Scope,
    },
    If {
        condition: Expression,
        then_scope: Scope,
        else_scope: Option<Scope>,
        position: SourcePosition,
    },
    While {
        condition: Expression,
        body: Scope,
        position: SourcePosition,
    },
    Return {
        value: Option<Expression>,
        position: SourcePosition,
    },
    Assignment {
        target: Expression,
        operator: AssignmentOperator,
        value: Expression,
        position: SourcePosition,
    },
    Expression(Expression),
}

impl Statement {
    /// Get the source position of this statement
    pub fn position(&self) -> &SourcePosition {
        match self {
            Statement::Declaration(declaration) => &declaration.position,
            Statement::Typedef { position, .. } => position,
            Statement::Distinct { position, .. } => position,
            Statement::Scope(scope) => &scope.position,
            Statement::Function { declaration, .. } => &declaration.position,
            Statement::If { position, .. } => position,
            Statement::While { position, .. } => position,
            Statement::Return { position, .. } => position,
            Statement::Assignment { position, .. } => position,
            Statement::Expression(expression) => expression.position(),
        }
    }
}

/// Expressions, each carrying its resolved type
#[derive(Debug, Clone)]
pub enum Expression {
    Integer {
        ty: Type,
        value: i64,
        position: SourcePosition,
    },
    Name {
        declaration: Rc<Declaration>,
        name: String,
        position: SourcePosition,
    },
    Unary {
        ty: Type,
        operator: UnaryOperator,
        operand: Box<Expression>,
        position: SourcePosition,
    },
    Binary {
        ty: Type,
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
        position: SourcePosition,
    },
    Cast {
        ty: Type,
        operand: Box<Expression>,
        position: SourcePosition,
    },
    FunctionCall {
        /// The callee's function type; `ty` is its return type
        function: Type,
        ty: Type,
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        position: SourcePosition,
    },
}

impl Expression {
    /// The type this expression was resolved to
    pub fn ty(&self) -> &Type {
        match self {
            Expression::Integer { ty, .. }
            | Expression::Unary { ty, .. }
            | Expression::Binary { ty, .. }
            | Expression::Cast { ty, .. }
            | Expression::FunctionCall { ty, .. } => ty,
            Expression::Name { declaration, .. } => &declaration.ty,
        }
    }

    /// Get the source position of this expression
    pub fn position(&self) -> &SourcePosition {
        match self {
            Expression::Integer { position, .. }
            | Expression::Name { position, .. }
            | Expression::Unary { position, .. }
            | Expression::Binary { position, .. }
            | Expression::Cast { position, .. }
            | Expression::FunctionCall { position, .. } => position,
        }
    }

    /// Whether this expression may appear on the left of an assignment
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Name { .. }
                | Expression::Unary {
                    operator: UnaryOperator::Dereference,
                    ..
                }
        )
    }
}

/// A parsed source file, the root of the tree
#[derive(Debug, Clone)]
pub struct File {
    pub filepath: String,
    pub statements: Vec<Statement>,
}

//! Expression nodes.
//!
//! Expressions form an immutable tree built once by the parser and consumed
//! by every pass. Child expressions are boxed; statement sequences are owned
//! vectors. Function literal bodies sit behind `Rc` so closure values can
//! share them without cloning whole subtrees.

use std::rc::Rc;

use super::operators::BinaryOp;
use super::stmt::Stmt;
use crate::Name;

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Unit value: the result of statements and value-less branches.
    Unit,

    /// Integer literal: `42`
    Int(i64),

    /// Float literal: `3.14`
    Float(f64),

    /// String literal: `"hello"`
    Str(String),

    /// Boolean literal: `true`, `false`
    Bool(bool),

    /// Variable reference by interned name.
    Variable(Name),

    /// Binary operation: `a + b`, `a <= b`
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Array literal: `[a, b, c]`
    Array(Vec<Expr>),

    /// Map literal: `{k1: v1, k2: v2}`
    ///
    /// Entries are an ordered sequence of key/value expression pairs;
    /// evaluation order is the source order.
    Map(Vec<(Expr, Expr)>),

    /// Field access: `base.field`
    ///
    /// Sugar for subscripting `base` with the field name as a string key.
    Field { base: Box<Expr>, field: Name },

    /// Subscript access: `base[index]`
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },

    /// Function literal: `fn(a, b) { ... }`
    Function(Rc<FunctionLit>),

    /// Call: `callee(arg1, arg2)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// Conditional with optional else.
    If(IfExpr),

    /// Condition-driven loop; evaluates to unit.
    While {
        condition: Box<Expr>,
        body: Vec<Stmt>,
    },

    /// Nested block: a statement sequence evaluating to the value of its
    /// trailing expression statement, or unit.
    Block(Vec<Stmt>),
}

/// Function literal: ordered parameter names plus a body statement sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub params: Vec<Name>,
    pub body: Vec<Stmt>,
}

/// Conditional node: condition, then-branch, and an else-branch that may be
/// absent, a chained conditional, or a statement sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_branch: Vec<Stmt>,
    pub else_branch: ElseBranch,
}

/// The else side of a conditional.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    /// No else: the false path yields unit.
    None,
    /// `else if ...` chain.
    ElseIf(Box<IfExpr>),
    /// Plain `else { ... }` statement sequence.
    Else(Vec<Stmt>),
}

impl Expr {
    /// Whether this expression is atomic: a literal or a variable reference.
    ///
    /// Atomic expressions cannot be decomposed further by lowering and are
    /// never bound to a temporary.
    pub const fn is_atomic(&self) -> bool {
        matches!(
            self,
            Expr::Unit
                | Expr::Int(_)
                | Expr::Float(_)
                | Expr::Str(_)
                | Expr::Bool(_)
                | Expr::Variable(_)
        )
    }
}

//! Syntax tree node types.
//!
//! The shapes here are a fixed input contract: the excluded parser produces
//! them, and the scope analyzer, evaluator, and lowerer all consume them.
//! Nodes carry no behavior beyond small shape predicates.

mod expr;
mod operators;
mod stmt;

pub use expr::{ElseBranch, Expr, FunctionLit, IfExpr};
pub use operators::BinaryOp;
pub use stmt::Stmt;

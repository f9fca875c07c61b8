//! Tarn IR - syntax tree and identifier types.
//!
//! This crate contains the data structures shared by every Tarn pass:
//! - `Name` for interned identifiers
//! - `StringInterner` / `SharedInterner` for name storage
//! - Syntax tree nodes (`Expr`, `Stmt`, `BinaryOp`)
//!
//! The tree is built once upstream and never mutated; passes that transform
//! programs (lowering) build new trees from the same node types.

pub mod ast;
mod interner;
mod name;

pub use ast::{BinaryOp, ElseBranch, Expr, FunctionLit, IfExpr, Stmt};
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;

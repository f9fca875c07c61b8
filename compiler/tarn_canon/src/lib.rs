//! A-normal form lowering for Tarn programs.
//!
//! This pass flattens nested expression evaluation into straight-line
//! statement sequences: every intermediate result of a compound
//! expression is bound to a numbered temporary (`$0`, `$1`, ...) by its
//! own binding declaration, and the use site refers to the temporary.
//! After lowering, every expression nested inside another is a literal or
//! a variable reference.
//!
//! # Pipeline Position
//!
//! ```text
//! Syntax → Scope Analysis → **Lowering** → downstream consumers
//! ```
//!
//! Lowering neither evaluates nor validates; it assumes a scope-valid
//! program and produces an observably equivalent one. Evaluating the
//! lowered form yields the same value, the same output, and the same
//! first error as evaluating the original.
//!
//! Control-flow nodes survive as nodes: conditionals and loops keep their
//! branch and body statement sequences (each lowered in its own nested
//! pass instance, with temporary numbering restarting at zero), because
//! their sub-sequences must not execute before the node itself runs. For
//! the same reason a loop's non-atomic condition is re-expressed as a
//! block expression rather than hoisted, so it is re-evaluated on every
//! iteration.

mod lower;

pub use lower::{lower, Lowerer};

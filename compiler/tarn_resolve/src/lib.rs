//! Scope analysis for Tarn programs.
//!
//! The analyzer walks a program before execution and validates that every
//! variable reference resolves to a binding introduced by an enclosing
//! `let`, a function parameter, or the global environment. It evaluates
//! nothing and checks no types or arities; binding existence is the entire
//! contract.
//!
//! Programs this pass accepts are *scope-valid*: the evaluator will never
//! fail a variable lookup on them.

mod analyzer;
mod errors;

pub use errors::{ScopeError, ScopeErrorKind};

use analyzer::ScopeAnalyzer;
use tarn_ir::{Name, Stmt, StringLookup};

/// Validate every variable reference in `program`.
///
/// `globals` seeds the outermost frame with the names the embedding host
/// provides (the native functions). Analysis stops at the first violation.
///
/// # Example
///
/// ```ignore
/// let globals = global_names(&interner);
/// analyze(&program, &globals, &interner)?;
/// let result = Interpreter::new(interner, handler).eval_program(&program)?;
/// ```
#[tracing::instrument(level = "debug", skip_all)]
pub fn analyze<I: StringLookup>(
    program: &[Stmt],
    globals: &[Name],
    interner: &I,
) -> Result<(), ScopeError> {
    let mut analyzer = ScopeAnalyzer::new(globals, interner);
    analyzer.analyze_program(program)
}

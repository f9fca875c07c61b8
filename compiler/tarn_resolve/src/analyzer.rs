//! Tree walk validating that every variable reference resolves.

use rustc_hash::FxHashSet;
use tarn_ir::{ElseBranch, Expr, IfExpr, Name, Stmt, StringLookup};

use crate::errors::{self, ScopeError};

/// Scope analysis walker.
///
/// Maintains a stack of name-presence frames mirroring the frame stack the
/// evaluator will build, so that acceptance here guarantees the evaluator
/// never fails a variable lookup. Values are never computed; presence is all
/// that matters.
pub(crate) struct ScopeAnalyzer<'a, I> {
    frames: Vec<FxHashSet<Name>>,
    interner: &'a I,
}

impl<'a, I: StringLookup> ScopeAnalyzer<'a, I> {
    /// Create an analyzer whose outermost frame holds the global names.
    pub(crate) fn new(globals: &[Name], interner: &'a I) -> Self {
        let global_frame: FxHashSet<Name> = globals.iter().copied().collect();
        Self {
            frames: vec![global_frame],
            interner,
        }
    }

    /// Analyze a whole program as one block.
    pub(crate) fn analyze_program(&mut self, program: &[Stmt]) -> Result<(), ScopeError> {
        self.block(program)
    }

    /// Analyze a statement sequence in a fresh frame.
    ///
    /// The frame is popped whether or not analysis succeeds, keeping the
    /// stack balanced for callers that hold the analyzer across calls.
    fn block(&mut self, stmts: &[Stmt]) -> Result<(), ScopeError> {
        self.frames.push(FxHashSet::default());
        let result = stmts.iter().try_for_each(|stmt| self.stmt(stmt));
        self.frames.pop();
        result
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), ScopeError> {
        match stmt {
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Let { name, init } => {
                if matches!(init, Expr::Function(_)) {
                    // The name is visible inside the function body, allowing
                    // direct self-recursion.
                    self.define(*name);
                    self.expr(init)
                } else {
                    self.expr(init)?;
                    self.define(*name);
                    Ok(())
                }
            }
            Stmt::Assign { target, value } => match target {
                Expr::Variable(_) => {
                    self.expr(target)?;
                    self.expr(value)
                }
                _ => Err(errors::invalid_lvalue()),
            },
            Stmt::Return(expr) => self.expr(expr),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), ScopeError> {
        match expr {
            Expr::Unit | Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) => Ok(()),

            Expr::Variable(name) => self.lookup(*name),

            Expr::Binary { lhs, rhs, .. } => {
                self.expr(lhs)?;
                self.expr(rhs)
            }

            Expr::Array(elements) => elements.iter().try_for_each(|element| self.expr(element)),
            Expr::Map(entries) => entries.iter().try_for_each(|(key, value)| {
                self.expr(key)?;
                self.expr(value)
            }),

            // A field name is a literal key, not a variable reference.
            Expr::Field { base, .. } => self.expr(base),
            Expr::Index { base, index } => {
                self.expr(base)?;
                self.expr(index)
            }

            Expr::Function(function) => {
                // Parameters get their own frame; the body block pushes a
                // second one. Neither leaks into the enclosing scope.
                self.frames.push(function.params.iter().copied().collect());
                let result = self.block(&function.body);
                self.frames.pop();
                result
            }

            Expr::Call { callee, args } => {
                self.expr(callee)?;
                args.iter().try_for_each(|arg| self.expr(arg))
            }

            Expr::If(if_expr) => self.if_expr(if_expr),

            Expr::While { condition, body } => {
                self.expr(condition)?;
                self.block(body)
            }

            Expr::Block(stmts) => self.block(stmts),
        }
    }

    fn if_expr(&mut self, if_expr: &IfExpr) -> Result<(), ScopeError> {
        self.expr(&if_expr.condition)?;
        self.block(&if_expr.then_branch)?;
        match &if_expr.else_branch {
            ElseBranch::None => Ok(()),
            ElseBranch::ElseIf(chained) => self.if_expr(chained),
            ElseBranch::Else(stmts) => self.block(stmts),
        }
    }

    fn define(&mut self, name: Name) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name);
        }
    }

    fn lookup(&self, name: Name) -> Result<(), ScopeError> {
        if self.frames.iter().rev().any(|frame| frame.contains(&name)) {
            Ok(())
        } else {
            let name = self.interner.lookup(name);
            tracing::debug!(name, "unresolved variable reference");
            Err(errors::unbound_variable(name))
        }
    }
}

//! The lowering pass.
//!
//! One `Lowerer` instance owns one flat statement sequence and a
//! temporary counter. Statement sequences that execute conditionally
//! (function bodies, conditional branches, loop bodies, nested blocks)
//! are lowered by fresh nested instances so their temporaries stay inside
//! their own sequence; everything else flattens into the current one in
//! evaluation order.

use std::rc::Rc;

use tarn_ir::{ElseBranch, Expr, FunctionLit, IfExpr, Name, Stmt, StringInterner};

/// Lower a program into A-normal form.
///
/// Every compound expression is hoisted into a fresh `$N` temporary
/// binding at its point of use, in evaluation order; atoms pass through
/// untouched. The interner mints the temporary names and renders field
/// names into string keys.
#[tracing::instrument(level = "debug", skip_all)]
pub fn lower(program: &[Stmt], interner: &StringInterner) -> Vec<Stmt> {
    let lowered = Lowerer::new(interner).lower_program(program);
    tracing::debug!(
        source_statements = program.len(),
        lowered_statements = lowered.len(),
        "lowered program"
    );
    lowered
}

/// A single lowering pass instance over one statement sequence.
pub struct Lowerer<'i> {
    out: Vec<Stmt>,
    next_temp: u32,
    interner: &'i StringInterner,
}

impl<'i> Lowerer<'i> {
    /// Fresh instance with temporary numbering starting at `$0`.
    pub fn new(interner: &'i StringInterner) -> Self {
        Lowerer {
            out: Vec::new(),
            next_temp: 0,
            interner,
        }
    }

    /// Lower a whole program.
    ///
    /// A trailing expression statement survives as one, referencing the
    /// final atom, so the lowered program keeps the original's value.
    pub fn lower_program(mut self, program: &[Stmt]) -> Vec<Stmt> {
        let trailing = matches!(program.last(), Some(Stmt::Expr(_)));
        let atom = self.lower_block(program);
        if trailing {
            self.out.push(Stmt::Expr(atom));
        }
        self.out
    }

    /// Lower a statement sequence into `self.out`, returning the atom for
    /// the sequence's value: the lowered trailing expression statement,
    /// or unit when the sequence is empty or ends in another statement
    /// kind.
    fn lower_block(&mut self, stmts: &[Stmt]) -> Expr {
        let Some((last, rest)) = stmts.split_last() else {
            return Expr::Unit;
        };
        for stmt in rest {
            self.lower_statement(stmt);
        }
        match last {
            Stmt::Expr(expr) => self.lower_expr(expr),
            other => {
                self.lower_statement(other);
                Expr::Unit
            }
        }
    }

    fn lower_statement(&mut self, stmt: &Stmt) {
        match stmt {
            // The atom is pure; its effects were already emitted, so a
            // non-trailing expression statement reduces to them.
            Stmt::Expr(expr) => {
                self.lower_expr(expr);
            }
            Stmt::Let { name, init } => {
                let init = match init {
                    // Keep the function directly under its let-bound name;
                    // detouring through a temporary would break the
                    // self-recursion patch on the closure.
                    Expr::Function(function) => self.lower_function(function),
                    other => self.lower_expr(other),
                };
                self.out.push(Stmt::Let { name: *name, init });
            }
            Stmt::Assign { target, value } => self.lower_assign(target, value),
            Stmt::Return(expr) => {
                let atom = self.lower_expr(expr);
                self.out.push(Stmt::Return(atom));
            }
        }
    }

    fn lower_assign(&mut self, target: &Expr, value: &Expr) {
        match target {
            Expr::Variable(_) => {
                let value = self.lower_expr(value);
                self.out.push(Stmt::Assign {
                    target: target.clone(),
                    value,
                });
            }
            Expr::Index { base, index } => {
                let base = self.lower_expr(base);
                let index = self.lower_expr(index);
                let value = self.lower_expr(value);
                self.out.push(Stmt::Assign {
                    target: Expr::Index {
                        base: Box::new(base),
                        index: Box::new(index),
                    },
                    value,
                });
            }
            // Field assignment re-expressed as subscript by string key.
            Expr::Field { base, field } => {
                let base = self.lower_expr(base);
                let value = self.lower_expr(value);
                let key = Expr::Str(self.interner.lookup(*field).to_string());
                self.out.push(Stmt::Assign {
                    target: Expr::Index {
                        base: Box::new(base),
                        index: Box::new(key),
                    },
                    value,
                });
            }
            _ => unreachable!("assignment target must be a variable, subscript, or field"),
        }
    }

    /// Lower one expression, emitting its compound pieces as temporary
    /// bindings, and return the atom that stands for its value.
    fn lower_expr(&mut self, expr: &Expr) -> Expr {
        if expr.is_atomic() {
            return expr.clone();
        }
        match expr {
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.lower_expr(lhs);
                let rhs = self.lower_expr(rhs);
                self.bind_temp(Expr::Binary {
                    op: *op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }
            Expr::Array(elements) => {
                let elements: Vec<Expr> =
                    elements.iter().map(|element| self.lower_expr(element)).collect();
                self.bind_temp(Expr::Array(elements))
            }
            Expr::Map(entries) => {
                let entries: Vec<(Expr, Expr)> = entries
                    .iter()
                    .map(|(key, value)| {
                        let key = self.lower_expr(key);
                        let value = self.lower_expr(value);
                        (key, value)
                    })
                    .collect();
                self.bind_temp(Expr::Map(entries))
            }
            Expr::Field { base, field } => {
                let base = self.lower_expr(base);
                let key = Expr::Str(self.interner.lookup(*field).to_string());
                self.bind_temp(Expr::Index {
                    base: Box::new(base),
                    index: Box::new(key),
                })
            }
            Expr::Index { base, index } => {
                let base = self.lower_expr(base);
                let index = self.lower_expr(index);
                self.bind_temp(Expr::Index {
                    base: Box::new(base),
                    index: Box::new(index),
                })
            }
            Expr::Function(function) => {
                let function = self.lower_function(function);
                self.bind_temp(function)
            }
            Expr::Call { callee, args } => {
                let callee = self.lower_expr(callee);
                let args: Vec<Expr> = args.iter().map(|arg| self.lower_expr(arg)).collect();
                self.bind_temp(Expr::Call {
                    callee: Box::new(callee),
                    args,
                })
            }
            Expr::If(conditional) => {
                let conditional = self.lower_conditional(conditional);
                self.bind_temp(Expr::If(conditional))
            }
            Expr::While { condition, body } => {
                let condition = self.lower_loop_condition(condition);
                let body = self.lower_branch(body);
                self.bind_temp(Expr::While {
                    condition: Box::new(condition),
                    body,
                })
            }
            Expr::Block(stmts) => {
                if stmts.is_empty() {
                    return Expr::Unit;
                }
                let stmts = self.lower_branch(stmts);
                self.bind_temp(Expr::Block(stmts))
            }
            // Atomic cases were handled above.
            _ => expr.clone(),
        }
    }

    /// Conditions are hoisted into the current sequence: they run exactly
    /// once, before the node. Branches are lowered nested so they stay
    /// conditional. An else-if chain is re-expressed as an else sequence
    /// holding the lowered inner conditional, keeping its condition from
    /// running unless the outer one fails.
    fn lower_conditional(&mut self, conditional: &IfExpr) -> IfExpr {
        let condition = self.lower_expr(&conditional.condition);
        let then_branch = self.lower_branch(&conditional.then_branch);
        let else_branch = match &conditional.else_branch {
            ElseBranch::None => ElseBranch::None,
            ElseBranch::ElseIf(chained) => {
                let chain = Stmt::Expr(Expr::If((**chained).clone()));
                ElseBranch::Else(self.lower_branch(&[chain]))
            }
            ElseBranch::Else(stmts) => ElseBranch::Else(self.lower_branch(stmts)),
        };
        IfExpr {
            condition: Box::new(condition),
            then_branch,
            else_branch,
        }
    }

    /// A loop condition must be re-evaluated on every iteration, so a
    /// non-atomic one becomes a block expression carrying its own lowered
    /// statements instead of being hoisted once before the loop.
    fn lower_loop_condition(&self, condition: &Expr) -> Expr {
        if condition.is_atomic() {
            return condition.clone();
        }
        let mut nested = self.nested();
        let atom = nested.lower_expr(condition);
        let mut stmts = nested.out;
        stmts.push(Stmt::Expr(atom));
        Expr::Block(stmts)
    }

    /// Lower a branch or body statement sequence with a nested instance.
    ///
    /// When the source sequence ends in an expression statement, the
    /// lowered one does too, so the sequence keeps its value.
    fn lower_branch(&self, stmts: &[Stmt]) -> Vec<Stmt> {
        let trailing = matches!(stmts.last(), Some(Stmt::Expr(_)));
        let mut nested = self.nested();
        let atom = nested.lower_block(stmts);
        if trailing {
            nested.out.push(Stmt::Expr(atom));
        }
        nested.out
    }

    /// Lower a function body with a nested instance and wrap a non-unit
    /// trailing atom in an explicit return.
    fn lower_function(&self, function: &FunctionLit) -> Expr {
        let mut nested = self.nested();
        let atom = nested.lower_block(&function.body);
        if !matches!(atom, Expr::Unit) {
            nested.out.push(Stmt::Return(atom));
        }
        Expr::Function(Rc::new(FunctionLit {
            params: function.params.clone(),
            body: nested.out,
        }))
    }

    fn nested(&self) -> Lowerer<'i> {
        Lowerer::new(self.interner)
    }

    /// Bind `init` to a fresh `$N` temporary and return the reference.
    fn bind_temp(&mut self, init: Expr) -> Expr {
        let name = self.fresh_name();
        self.out.push(Stmt::Let { name, init });
        Expr::Variable(name)
    }

    fn fresh_name(&mut self) -> Name {
        let name = self.interner.intern_owned(format!("${}", self.next_temp));
        self.next_temp += 1;
        name
    }
}

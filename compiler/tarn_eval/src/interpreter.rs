//! Tree-walking interpreter.
//!
//! Statements and expressions both evaluate to a [`Flow`]: normal
//! completion carrying a value, or an early return unwinding toward the
//! nearest call boundary. Return is ordinary data in the `Ok` channel,
//! not an error; every block, conditional, and loop re-propagates it
//! untouched, and only a closure call consumes it.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tarn_ir::{ElseBranch, Expr, FunctionLit, IfExpr, Name, SharedInterner, Stmt};

use crate::environment::{Environment, Frame};
use crate::errors::{self, EvalError, ExpectedKind};
use crate::natives::global_frame;
use crate::operators::evaluate_binary;
use crate::print_handler::SharedPrintHandler;
use crate::value::{ClosureValue, MapKey, Value};

/// Result of evaluating a statement or expression.
#[derive(Debug)]
pub(crate) enum Flow {
    /// Normal completion with the produced value.
    Value(Value),
    /// Early return unwinding toward the nearest call boundary.
    Return(Value),
}

/// Unwrap normal completion; re-propagate an early return to the caller.
macro_rules! try_value {
    ($flow:expr) => {
        match $flow {
            Flow::Value(value) => value,
            Flow::Return(value) => return Ok(Flow::Return(value)),
        }
    };
}

/// Evaluator for scope-valid programs.
///
/// Holds the shared interner for rendering names in diagnostics, the
/// print handler `puts` writes through, and the live frame stack. The
/// global frame is seeded with the native functions at construction.
pub struct Interpreter {
    interner: SharedInterner,
    handler: SharedPrintHandler,
    env: Environment,
}

impl Interpreter {
    /// Build an interpreter whose global frame holds the natives.
    pub fn new(interner: SharedInterner, handler: SharedPrintHandler) -> Self {
        let env = Environment::with_global(global_frame(&interner));
        Interpreter {
            interner,
            handler,
            env,
        }
    }

    /// Evaluate a whole program and produce its final value.
    ///
    /// The program body runs as one block above the global frame. A
    /// `return` that unwinds past the outermost block is a caller error:
    /// there is no call boundary to absorb it.
    pub fn eval_program(&mut self, program: &[Stmt]) -> Result<Value, EvalError> {
        match self.block(program)? {
            Flow::Value(value) => Ok(value),
            Flow::Return(_) => Err(errors::internal("return outside function")),
        }
    }

    /// Evaluate a statement sequence in its own frame.
    ///
    /// The frame is popped on every way out, including early return and
    /// error unwinding.
    fn block(&mut self, stmts: &[Stmt]) -> Result<Flow, EvalError> {
        self.env.push_frame();
        let flow = self.block_body(stmts);
        self.env.pop_frame();
        flow
    }

    /// Block rule: run all but the last statement for effect; a trailing
    /// expression statement supplies the block's value, anything else
    /// leaves it unit.
    fn block_body(&mut self, stmts: &[Stmt]) -> Result<Flow, EvalError> {
        let Some((last, rest)) = stmts.split_last() else {
            return Ok(Flow::Value(Value::Unit));
        };
        for stmt in rest {
            try_value!(self.exec_stmt(stmt)?);
        }
        match last {
            Stmt::Expr(expr) => self.eval(expr),
            other => {
                try_value!(self.exec_stmt(other)?);
                Ok(Flow::Value(Value::Unit))
            }
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, EvalError> {
        match stmt {
            Stmt::Expr(expr) => {
                try_value!(self.eval(expr)?);
                Ok(Flow::Value(Value::Unit))
            }
            Stmt::Let { name, init } => {
                let value = match init {
                    Expr::Function(function) => self.make_recursive_closure(*name, function),
                    other => try_value!(self.eval(other)?),
                };
                self.env.define(*name, value);
                Ok(Flow::Value(Value::Unit))
            }
            Stmt::Assign { target, value } => self.assign(target, value),
            Stmt::Return(expr) => {
                let value = try_value!(self.eval(expr)?);
                Ok(Flow::Return(value))
            }
        }
    }

    /// Assignment mutates the innermost frame that already binds the
    /// target name; it never creates a binding.
    fn assign(&mut self, target: &Expr, value: &Expr) -> Result<Flow, EvalError> {
        let Expr::Variable(name) = target else {
            return Err(errors::invalid_lvalue());
        };
        let value = try_value!(self.eval(value)?);
        if self.env.assign(*name, value) {
            Ok(Flow::Value(Value::Unit))
        } else {
            Err(errors::unbound_variable(self.interner.lookup(*name)))
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Flow, EvalError> {
        match expr {
            Expr::Unit => Ok(Flow::Value(Value::Unit)),
            Expr::Int(n) => Ok(Flow::Value(Value::Int(*n))),
            Expr::Float(f) => Ok(Flow::Value(Value::Float(*f))),
            Expr::Str(s) => Ok(Flow::Value(Value::string(s.clone()))),
            Expr::Bool(b) => Ok(Flow::Value(Value::Bool(*b))),
            Expr::Variable(name) => match self.env.lookup(*name) {
                Some(value) => Ok(Flow::Value(value)),
                None => Err(errors::unbound_variable(self.interner.lookup(*name))),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = try_value!(self.eval(lhs)?);
                let rhs = try_value!(self.eval(rhs)?);
                evaluate_binary(*op, &lhs, &rhs).map(Flow::Value)
            }
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(try_value!(self.eval(element)?));
                }
                Ok(Flow::Value(Value::array(items)))
            }
            Expr::Map(entries) => {
                let mut map = FxHashMap::default();
                for (key_expr, value_expr) in entries {
                    let key = try_value!(self.eval(key_expr)?);
                    let key = MapKey::from_value(&key)?;
                    let value = try_value!(self.eval(value_expr)?);
                    map.insert(key, value);
                }
                Ok(Flow::Value(Value::map(map)))
            }
            Expr::Field { base, field } => {
                let base = try_value!(self.eval(base)?);
                let Value::Map(entries) = base else {
                    return Err(errors::type_error(ExpectedKind::HashMap));
                };
                let key = self.interner.lookup(*field);
                match entries.get(&MapKey::string(key)) {
                    Some(value) => Ok(Flow::Value(value.clone())),
                    None => Err(errors::key_not_found(key)),
                }
            }
            Expr::Index { base, index } => self.subscript(base, index),
            Expr::Function(function) => {
                Ok(Flow::Value(Value::Closure(ClosureValue {
                    function: Rc::clone(function),
                    captured: self.env.capture(),
                })))
            }
            Expr::Call { callee, args } => {
                let callee = try_value!(self.eval(callee)?);
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(try_value!(self.eval(arg)?));
                }
                match callee {
                    Value::Closure(closure) => {
                        self.call_closure(&closure, values).map(Flow::Value)
                    }
                    Value::Native(native, _) => native(&values, &self.handler).map(Flow::Value),
                    _ => Err(errors::type_error(ExpectedKind::Closure)),
                }
            }
            Expr::If(conditional) => self.eval_if(conditional),
            Expr::While { condition, body } => {
                loop {
                    let condition = try_value!(self.eval(condition)?);
                    let Value::Bool(keep_going) = condition else {
                        return Err(errors::type_error(ExpectedKind::Bool));
                    };
                    if !keep_going {
                        break;
                    }
                    try_value!(self.block(body)?);
                }
                Ok(Flow::Value(Value::Unit))
            }
            Expr::Block(stmts) => self.block(stmts),
        }
    }

    fn eval_if(&mut self, conditional: &IfExpr) -> Result<Flow, EvalError> {
        let condition = try_value!(self.eval(&conditional.condition)?);
        let Value::Bool(condition) = condition else {
            return Err(errors::type_error(ExpectedKind::Bool));
        };
        if condition {
            return self.block(&conditional.then_branch);
        }
        match &conditional.else_branch {
            ElseBranch::None => Ok(Flow::Value(Value::Unit)),
            ElseBranch::ElseIf(chained) => self.eval_if(chained),
            ElseBranch::Else(stmts) => self.block(stmts),
        }
    }

    /// Subscript: maps look up the evaluated index through the key model,
    /// arrays require an integer index within bounds.
    fn subscript(&mut self, base: &Expr, index: &Expr) -> Result<Flow, EvalError> {
        let base = try_value!(self.eval(base)?);
        match base {
            Value::Map(entries) => {
                let index = try_value!(self.eval(index)?);
                let key = MapKey::from_value(&index)?;
                match entries.get(&key) {
                    Some(value) => Ok(Flow::Value(value.clone())),
                    None => Err(errors::key_not_found(&key.display_key())),
                }
            }
            Value::Array(items) => {
                let index = try_value!(self.eval(index)?);
                let Value::Int(index) = index else {
                    return Err(errors::type_error(ExpectedKind::Int));
                };
                usize::try_from(index)
                    .ok()
                    .and_then(|at| items.get(at).cloned())
                    .map(Flow::Value)
                    .ok_or_else(|| errors::index_out_of_bounds(index))
            }
            _ => Err(errors::type_error(ExpectedKind::Subscriptable)),
        }
    }

    /// Closure definition bound by `let`: capture the frame stack, then
    /// patch the closure into its own innermost captured frame under the
    /// bound name so the body can call itself directly. Names defined
    /// later in the scope stay invisible, so mutual recursion does not
    /// come with this.
    fn make_recursive_closure(&self, name: Name, function: &Rc<FunctionLit>) -> Value {
        let captured = self.env.capture();
        let innermost = captured.last().cloned();
        let value = Value::Closure(ClosureValue {
            function: Rc::clone(function),
            captured,
        });
        if let Some(frame) = innermost {
            frame.borrow_mut().insert(name, value.clone());
        }
        value
    }

    /// Call boundary: arity-check, bind parameters in a fresh frame above
    /// the captured stack, run the body as a block, and absorb any early
    /// return into the call's result.
    fn call_closure(&mut self, closure: &ClosureValue, args: Vec<Value>) -> Result<Value, EvalError> {
        let params = &closure.function.params;
        if args.len() != params.len() {
            return Err(errors::incorrect_arity(params.len(), args.len()));
        }
        let mut arguments = Frame::default();
        for (param, arg) in params.iter().zip(args) {
            arguments.insert(*param, arg);
        }
        let call_env = Environment::for_call(closure.captured.clone(), arguments);
        let saved = std::mem::replace(&mut self.env, call_env);
        let flow = self.block(&closure.function.body);
        self.env = saved;
        match flow? {
            Flow::Value(value) | Flow::Return(value) => Ok(value),
        }
    }
}

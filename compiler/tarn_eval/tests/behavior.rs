//! End-to-end evaluation behavior.
//!
//! Programs here are built as syntax trees, pushed through scope analysis
//! with the real global name set, and then evaluated with a buffering
//! print handler so output is part of the assertion surface.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use tarn_eval::{
    buffer_handler, global_names, EvalError, EvalErrorKind, ExpectedKind, Interpreter, Value,
};
use tarn_ir::{BinaryOp, ElseBranch, Expr, FunctionLit, IfExpr, Name, SharedInterner, Stmt};
use tarn_resolve::analyze;

fn var(name: Name) -> Expr {
    Expr::Variable(name)
}

fn bin(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn func(params: Vec<Name>, body: Vec<Stmt>) -> Expr {
    Expr::Function(Rc::new(FunctionLit { params, body }))
}

fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        args,
    }
}

fn index(base: Expr, idx: Expr) -> Expr {
    Expr::Index {
        base: Box::new(base),
        index: Box::new(idx),
    }
}

fn field(base: Expr, name: Name) -> Expr {
    Expr::Field {
        base: Box::new(base),
        field: name,
    }
}

fn if_then(condition: Expr, then_branch: Vec<Stmt>) -> Expr {
    Expr::If(IfExpr {
        condition: Box::new(condition),
        then_branch,
        else_branch: ElseBranch::None,
    })
}

fn if_else(condition: Expr, then_branch: Vec<Stmt>, else_branch: Vec<Stmt>) -> Expr {
    Expr::If(IfExpr {
        condition: Box::new(condition),
        then_branch,
        else_branch: ElseBranch::Else(else_branch),
    })
}

fn while_loop(condition: Expr, body: Vec<Stmt>) -> Expr {
    Expr::While {
        condition: Box::new(condition),
        body,
    }
}

fn let_(name: Name, init: Expr) -> Stmt {
    Stmt::Let { name, init }
}

fn assign(name: Name, value: Expr) -> Stmt {
    Stmt::Assign {
        target: var(name),
        value,
    }
}

/// Analyze with the real global name set, then evaluate with a buffer
/// handler. Panics if the analyzer rejects the program: every program in
/// this suite is meant to be scope-valid.
fn run(interner: &SharedInterner, program: &[Stmt]) -> (Result<Value, EvalError>, String) {
    analyze(program, &global_names(interner), &**interner).unwrap();
    let handler = buffer_handler();
    let mut interp = Interpreter::new(interner.clone(), handler.clone());
    let result = interp.eval_program(program);
    (result, handler.output())
}

fn run_value(interner: &SharedInterner, program: &[Stmt]) -> Value {
    let (result, _) = run(interner, program);
    result.unwrap()
}

#[test]
fn test_division_between_integers_is_real_valued() {
    let interner = SharedInterner::new();
    let program = vec![Stmt::Expr(bin(BinaryOp::Div, Expr::Int(7), Expr::Int(2)))];
    assert_eq!(run_value(&interner, &program), Value::Float(3.5));
}

#[test]
fn test_division_by_zero_aborts_evaluation() {
    let interner = SharedInterner::new();
    let program = vec![Stmt::Expr(bin(BinaryOp::Div, Expr::Int(5), Expr::Int(0)))];
    let (result, _) = run(&interner, &program);
    assert_eq!(result.unwrap_err().kind, EvalErrorKind::DivisionByZero);
}

#[test]
fn test_mixed_arithmetic_promotes_once_and_stays_float() {
    let interner = SharedInterner::new();
    // 1 + 2.5 * 2 = 6.0
    let program = vec![Stmt::Expr(bin(
        BinaryOp::Add,
        Expr::Int(1),
        bin(BinaryOp::Mul, Expr::Float(2.5), Expr::Int(2)),
    ))];
    assert_eq!(run_value(&interner, &program), Value::Float(6.0));
}

#[test]
fn test_block_shadowing_restores_outer_binding() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    // let x = 1; { let x = 2; puts(x) }; puts(x); x
    let puts = interner.intern("puts");
    let program = vec![
        let_(x, Expr::Int(1)),
        Stmt::Expr(Expr::Block(vec![
            let_(x, Expr::Int(2)),
            Stmt::Expr(call(var(puts), vec![var(x)])),
        ])),
        Stmt::Expr(call(var(puts), vec![var(x)])),
        Stmt::Expr(var(x)),
    ];
    let (result, output) = run(&interner, &program);
    assert_eq!(result.unwrap(), Value::Int(1));
    assert_eq!(output, "2\n1\n");
}

#[test]
fn test_assignment_mutates_outer_binding_through_block_frames() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    // let x = 1; { x = 2 }; x
    let program = vec![
        let_(x, Expr::Int(1)),
        Stmt::Expr(Expr::Block(vec![assign(x, Expr::Int(2))])),
        Stmt::Expr(var(x)),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(2));
}

#[test]
fn test_closure_captures_a_snapshot_not_the_live_scope() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let f = interner.intern("f");
    // let x = 1; let f = fn() { return x }; x = 2; f()
    let program = vec![
        let_(x, Expr::Int(1)),
        let_(f, func(vec![], vec![Stmt::Return(var(x))])),
        assign(x, Expr::Int(2)),
        Stmt::Expr(call(var(f), vec![])),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(1));
}

#[test]
fn test_closure_state_persists_across_its_own_calls() {
    let interner = SharedInterner::new();
    let count = interner.intern("count");
    let tick = interner.intern("tick");
    // let count = 0;
    // let tick = fn() { count = count + 1; return count };
    // tick(); tick(); tick()
    let program = vec![
        let_(count, Expr::Int(0)),
        let_(
            tick,
            func(
                vec![],
                vec![
                    assign(count, bin(BinaryOp::Add, var(count), Expr::Int(1))),
                    Stmt::Return(var(count)),
                ],
            ),
        ),
        Stmt::Expr(call(var(tick), vec![])),
        Stmt::Expr(call(var(tick), vec![])),
        Stmt::Expr(call(var(tick), vec![])),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(3));
}

#[test]
fn test_let_bound_function_can_recurse_into_itself() {
    let interner = SharedInterner::new();
    let fact = interner.intern("fact");
    let n = interner.intern("n");
    // let fact = fn(n) {
    //   if (n <= 1) { return 1 };
    //   return n * fact(n - 1)
    // };
    // fact(5)
    let program = vec![
        let_(
            fact,
            func(
                vec![n],
                vec![
                    Stmt::Expr(if_then(
                        bin(BinaryOp::LtEq, var(n), Expr::Int(1)),
                        vec![Stmt::Return(Expr::Int(1))],
                    )),
                    Stmt::Return(bin(
                        BinaryOp::Mul,
                        var(n),
                        call(var(fact), vec![bin(BinaryOp::Sub, var(n), Expr::Int(1))]),
                    )),
                ],
            ),
        ),
        Stmt::Expr(call(var(fact), vec![Expr::Int(5)])),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(120));
}

#[test]
fn test_parameter_shadows_captured_binding() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let f = interner.intern("f");
    // let x = 10; let f = fn(x) { return x + 1 }; f(1)
    let program = vec![
        let_(x, Expr::Int(10)),
        let_(
            f,
            func(vec![x], vec![Stmt::Return(bin(BinaryOp::Add, var(x), Expr::Int(1)))]),
        ),
        Stmt::Expr(call(var(f), vec![Expr::Int(1)])),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(2));
}

#[test]
fn test_early_return_unwinds_nested_conditionals_and_loop() {
    let interner = SharedInterner::new();
    let f = interner.intern("f");
    let i = interner.intern("i");
    let puts = interner.intern("puts");
    // let f = fn() {
    //   let i = 0;
    //   while (true) {
    //     if (1 <= i) {
    //       if (true) { return i }
    //     };
    //     puts(i);
    //     i = i + 1
    //   };
    //   return -1
    // };
    // f()
    let program = vec![
        let_(
            f,
            func(
                vec![],
                vec![
                    let_(i, Expr::Int(0)),
                    Stmt::Expr(while_loop(
                        Expr::Bool(true),
                        vec![
                            Stmt::Expr(if_then(
                                bin(BinaryOp::LtEq, Expr::Int(1), var(i)),
                                vec![Stmt::Expr(if_then(
                                    Expr::Bool(true),
                                    vec![Stmt::Return(var(i))],
                                ))],
                            )),
                            Stmt::Expr(call(var(puts), vec![var(i)])),
                            assign(i, bin(BinaryOp::Add, var(i), Expr::Int(1))),
                        ],
                    )),
                    Stmt::Return(Expr::Int(-1)),
                ],
            ),
        ),
        Stmt::Expr(call(var(f), vec![])),
    ];
    let (result, output) = run(&interner, &program);
    assert_eq!(result.unwrap(), Value::Int(1));
    assert_eq!(output, "0\n");
}

#[test]
fn test_return_stops_at_the_nearest_call_boundary() {
    let interner = SharedInterner::new();
    let inner = interner.intern("inner");
    let outer = interner.intern("outer");
    // let inner = fn() { return 1; return 99 };
    // let outer = fn() { inner(); return 2 };
    // outer()
    let program = vec![
        let_(
            inner,
            func(
                vec![],
                vec![Stmt::Return(Expr::Int(1)), Stmt::Return(Expr::Int(99))],
            ),
        ),
        let_(
            outer,
            func(
                vec![],
                vec![
                    Stmt::Expr(call(var(inner), vec![])),
                    Stmt::Return(Expr::Int(2)),
                ],
            ),
        ),
        Stmt::Expr(call(var(outer), vec![])),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(2));
}

#[test]
fn test_arity_mismatch_is_reported_both_ways() {
    let interner = SharedInterner::new();
    let f = interner.intern("f");
    let a = interner.intern("a");
    let b = interner.intern("b");
    let two_param = || vec![let_(f, func(vec![a, b], vec![Stmt::Return(var(a))]))];

    let mut too_few = two_param();
    too_few.push(Stmt::Expr(call(var(f), vec![Expr::Int(1)])));
    let (result, _) = run(&interner, &too_few);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::IncorrectArity {
            expected: 2,
            actual: 1
        }
    );

    let mut too_many = two_param();
    too_many.push(Stmt::Expr(call(
        var(f),
        vec![Expr::Int(1), Expr::Int(2), Expr::Int(3)],
    )));
    let (result, _) = run(&interner, &too_many);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::IncorrectArity {
            expected: 2,
            actual: 3
        }
    );
}

#[test]
fn test_while_loop_accumulates_and_evaluates_to_unit() {
    let interner = SharedInterner::new();
    let i = interner.intern("i");
    let total = interner.intern("total");
    // let i = 0; let total = 0;
    // while (i <= 4) { total = total + i; i = i + 1 };
    // total
    let program = vec![
        let_(i, Expr::Int(0)),
        let_(total, Expr::Int(0)),
        Stmt::Expr(while_loop(
            bin(BinaryOp::LtEq, var(i), Expr::Int(4)),
            vec![
                assign(total, bin(BinaryOp::Add, var(total), var(i))),
                assign(i, bin(BinaryOp::Add, var(i), Expr::Int(1))),
            ],
        )),
        Stmt::Expr(var(total)),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(10));
}

#[test]
fn test_else_if_chain_selects_one_branch() {
    let interner = SharedInterner::new();
    let pick = interner.intern("pick");
    let n = interner.intern("n");
    // let pick = fn(n) {
    //   if (n <= 0) { "low" } else if (n <= 5) { "mid" } else { "high" }
    // };
    // pick(3)
    let chain = Expr::If(IfExpr {
        condition: Box::new(bin(BinaryOp::LtEq, var(n), Expr::Int(0))),
        then_branch: vec![Stmt::Expr(Expr::Str("low".to_string()))],
        else_branch: ElseBranch::ElseIf(Box::new(IfExpr {
            condition: Box::new(bin(BinaryOp::LtEq, var(n), Expr::Int(5))),
            then_branch: vec![Stmt::Expr(Expr::Str("mid".to_string()))],
            else_branch: ElseBranch::Else(vec![Stmt::Expr(Expr::Str("high".to_string()))]),
        })),
    });
    let program = vec![
        let_(pick, func(vec![n], vec![Stmt::Return(chain)])),
        Stmt::Expr(call(var(pick), vec![Expr::Int(3)])),
    ];
    assert_eq!(run_value(&interner, &program), Value::string("mid"));
}

#[test]
fn test_conditional_without_else_evaluates_to_unit() {
    let interner = SharedInterner::new();
    let program = vec![Stmt::Expr(if_then(Expr::Bool(false), vec![Stmt::Expr(Expr::Int(1))]))];
    assert_eq!(run_value(&interner, &program), Value::Unit);
}

#[test]
fn test_conditional_branch_value_is_the_expression_value() {
    let interner = SharedInterner::new();
    let program = vec![Stmt::Expr(if_else(
        Expr::Bool(true),
        vec![let_(interner.intern("t"), Expr::Int(0)), Stmt::Expr(Expr::Int(7))],
        vec![Stmt::Expr(Expr::Int(8))],
    ))];
    assert_eq!(run_value(&interner, &program), Value::Int(7));
}

#[test]
fn test_array_subscript_and_len() {
    let interner = SharedInterner::new();
    let xs = interner.intern("xs");
    let len = interner.intern("len");
    // let xs = [10, 20, 30]; xs[1] + len(xs)
    let program = vec![
        let_(
            xs,
            Expr::Array(vec![Expr::Int(10), Expr::Int(20), Expr::Int(30)]),
        ),
        Stmt::Expr(bin(
            BinaryOp::Add,
            index(var(xs), Expr::Int(1)),
            call(var(len), vec![var(xs)]),
        )),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(23));
}

#[test]
fn test_array_subscript_rejects_non_integer_and_out_of_bounds() {
    let interner = SharedInterner::new();
    let xs = interner.intern("xs");
    let base = vec![let_(xs, Expr::Array(vec![Expr::Int(1)]))];

    let mut float_index = base.clone();
    float_index.push(Stmt::Expr(index(var(xs), Expr::Float(0.0))));
    let (result, _) = run(&interner, &float_index);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::TypeError {
            expected: ExpectedKind::Int
        }
    );

    let mut negative = base.clone();
    negative.push(Stmt::Expr(index(var(xs), Expr::Int(-1))));
    let (result, _) = run(&interner, &negative);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::IndexOutOfBounds { index: -1 }
    );

    let mut past_end = base;
    past_end.push(Stmt::Expr(index(var(xs), Expr::Int(1))));
    let (result, _) = run(&interner, &past_end);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::IndexOutOfBounds { index: 1 }
    );
}

#[test]
fn test_map_literal_field_access_and_subscript_agree() {
    let interner = SharedInterner::new();
    let m = interner.intern("m");
    let speed = interner.intern("speed");
    // let m = {"speed": 88, 2: "two"}; m.speed
    let program = vec![
        let_(
            m,
            Expr::Map(vec![
                (Expr::Str("speed".to_string()), Expr::Int(88)),
                (Expr::Int(2), Expr::Str("two".to_string())),
            ]),
        ),
        Stmt::Expr(field(var(m), speed)),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(88));

    // m[2.0] addresses the same entry as m[2].
    let program = vec![
        let_(
            m,
            Expr::Map(vec![(Expr::Int(2), Expr::Str("two".to_string()))]),
        ),
        Stmt::Expr(index(var(m), Expr::Float(2.0))),
    ];
    assert_eq!(run_value(&interner, &program), Value::string("two"));
}

#[test]
fn test_missing_map_key_reports_the_rendered_key() {
    let interner = SharedInterner::new();
    let m = interner.intern("m");
    let ghost = interner.intern("ghost");
    let program = vec![
        let_(m, Expr::Map(vec![])),
        Stmt::Expr(field(var(m), ghost)),
    ];
    let (result, _) = run(&interner, &program);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::KeyNotFound {
            key: String::from("ghost")
        }
    );
}

#[test]
fn test_compound_map_key_is_rejected() {
    let interner = SharedInterner::new();
    let program = vec![Stmt::Expr(Expr::Map(vec![(
        Expr::Array(vec![]),
        Expr::Int(1),
    )]))];
    let (result, _) = run(&interner, &program);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::UnsupportedKey { kind: "array" }
    );
}

#[test]
fn test_field_access_requires_a_map_base() {
    let interner = SharedInterner::new();
    let xs = interner.intern("xs");
    let speed = interner.intern("speed");
    let program = vec![
        let_(xs, Expr::Array(vec![])),
        Stmt::Expr(field(var(xs), speed)),
    ];
    let (result, _) = run(&interner, &program);
    assert_eq!(
        result.unwrap_err().kind,
        EvalErrorKind::TypeError {
            expected: ExpectedKind::HashMap
        }
    );
}

#[test]
fn test_equality_spans_kinds_and_representations() {
    let interner = SharedInterner::new();
    let cases = vec![
        (bin(BinaryOp::Eq, Expr::Int(1), Expr::Float(1.0)), true),
        (
            bin(
                BinaryOp::Eq,
                Expr::Str("a".to_string()),
                Expr::Str("a".to_string()),
            ),
            true,
        ),
        (bin(BinaryOp::Eq, Expr::Int(1), Expr::Str("1".to_string())), false),
        (
            bin(
                BinaryOp::Eq,
                Expr::Array(vec![Expr::Int(1), Expr::Int(2)]),
                Expr::Array(vec![Expr::Float(1.0), Expr::Int(2)]),
            ),
            true,
        ),
    ];
    for (expr, expected) in cases {
        let program = vec![Stmt::Expr(expr)];
        assert_eq!(run_value(&interner, &program), Value::Bool(expected));
    }
}

#[test]
fn test_closures_never_compare_equal() {
    let interner = SharedInterner::new();
    let f = interner.intern("f");
    // let f = fn() { return 0 }; f == f
    let program = vec![
        let_(f, func(vec![], vec![Stmt::Return(Expr::Int(0))])),
        Stmt::Expr(bin(BinaryOp::Eq, var(f), var(f))),
    ];
    assert_eq!(run_value(&interner, &program), Value::Bool(false));
}

#[test]
fn test_puts_renders_every_kind_unquoted() {
    let interner = SharedInterner::new();
    let puts = interner.intern("puts");
    let program = vec![Stmt::Expr(call(
        var(puts),
        vec![
            Expr::Str("plain".to_string()),
            Expr::Unit,
            Expr::Array(vec![Expr::Int(1), Expr::Str("a".to_string())]),
            func(vec![], vec![]),
            var(puts),
        ],
    ))];
    let (result, output) = run(&interner, &program);
    assert_eq!(result.unwrap(), Value::Unit);
    assert_eq!(output, "plain\nunit\n[1, a]\n<fn>\n<native puts>\n");
}

#[test]
fn test_native_shadowing_is_allowed() {
    let interner = SharedInterner::new();
    let puts = interner.intern("puts");
    // let puts = 3; puts
    let program = vec![let_(puts, Expr::Int(3)), Stmt::Expr(var(puts))];
    assert_eq!(run_value(&interner, &program), Value::Int(3));
}

#[test]
fn test_accepted_programs_never_fail_lookup() {
    // Scope-valid programs with aggressive shadowing and capture: the
    // analyzer's acceptance must guarantee lookup success at runtime.
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let f = interner.intern("f");
    let program = vec![
        let_(x, Expr::Int(1)),
        let_(
            f,
            func(
                vec![y],
                vec![
                    let_(x, bin(BinaryOp::Add, var(x), var(y))),
                    Stmt::Return(var(x)),
                ],
            ),
        ),
        Stmt::Expr(Expr::Block(vec![
            let_(x, Expr::Int(100)),
            Stmt::Expr(call(var(f), vec![var(x)])),
        ])),
    ];
    let (result, _) = run(&interner, &program);
    // f's captured x is 1; the argument is the block-local 100.
    assert_eq!(result.unwrap(), Value::Int(101));
}

#[test]
fn test_assignment_to_undeclared_name_fails_at_analysis_and_runtime_alike() {
    let interner = SharedInterner::new();
    let x = interner.intern("x");
    let program = vec![assign(x, Expr::Int(1))];
    // Not scope-valid: the analyzer rejects it, and the evaluator agrees
    // if it is run anyway.
    assert!(analyze(&program, &global_names(&interner), &*interner).is_err());
    let handler = buffer_handler();
    let mut interp = Interpreter::new(interner.clone(), handler);
    let err = interp.eval_program(&program).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnboundVariable {
            name: String::from("x")
        }
    );
}

#[test]
fn test_return_inside_initializer_unwinds_the_whole_call() {
    let interner = SharedInterner::new();
    let f = interner.intern("f");
    let a = interner.intern("a");
    // let f = fn() { let a = { return 5 }; return a };
    // f()
    let program = vec![
        let_(
            f,
            func(
                vec![],
                vec![
                    let_(a, Expr::Block(vec![Stmt::Return(Expr::Int(5))])),
                    Stmt::Return(var(a)),
                ],
            ),
        ),
        Stmt::Expr(call(var(f), vec![])),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(5));
}

#[test]
fn test_function_literal_argument_is_callable() {
    let interner = SharedInterner::new();
    let apply = interner.intern("apply");
    let g = interner.intern("g");
    let n = interner.intern("n");
    // let apply = fn(g, n) { return g(n) };
    // apply(fn(n) { return n * 2 }, 21)
    let program = vec![
        let_(
            apply,
            func(
                vec![g, n],
                vec![Stmt::Return(call(var(g), vec![var(n)]))],
            ),
        ),
        Stmt::Expr(call(
            var(apply),
            vec![
                func(vec![n], vec![Stmt::Return(bin(BinaryOp::Mul, var(n), Expr::Int(2)))]),
                Expr::Int(21),
            ],
        )),
    ];
    assert_eq!(run_value(&interner, &program), Value::Int(42));
}

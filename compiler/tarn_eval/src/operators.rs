//! Binary operator semantics.
//!
//! Arithmetic and ordering operate on numbers only. Two integer operands
//! stay in integer arithmetic except for division, which is always real
//! valued; a float on either side promotes the whole operation to float.
//! Equality is the one operator defined over every value kind and never
//! raises.

use tarn_ir::BinaryOp;

use crate::errors::{self, EvalError, ExpectedKind};
use crate::value::Value;

/// Numeric operand extracted from a value.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Int(n) => Some(Number::Int(*n)),
        Value::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

/// Apply a binary operator to two evaluated operands.
pub fn evaluate_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    if let BinaryOp::Eq = op {
        return Ok(Value::Bool(lhs.equals(rhs)));
    }
    let (Some(a), Some(b)) = (as_number(lhs), as_number(rhs)) else {
        return Err(errors::type_error(ExpectedKind::Num));
    };
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => evaluate_int(op, a, b),
        (a, b) => evaluate_float(op, a.as_f64(), b.as_f64()),
    }
}

/// Integer arithmetic wraps on overflow rather than aborting the host.
fn evaluate_int(op: BinaryOp, a: i64, b: i64) -> Result<Value, EvalError> {
    Ok(match op {
        BinaryOp::Add => Value::Int(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            // Division is real-valued even between integers: 7 / 2 is 3.5.
            Value::Float(a as f64 / b as f64)
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            Value::Int(a.wrapping_rem(b))
        }
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::LtEq => Value::Bool(a <= b),
    })
}

fn evaluate_float(op: BinaryOp, a: f64, b: f64) -> Result<Value, EvalError> {
    Ok(match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(errors::division_by_zero());
            }
            Value::Float(a / b)
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(errors::division_by_zero());
            }
            Value::Float(a % b)
        }
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::LtEq => Value::Bool(a <= b),
    })
}

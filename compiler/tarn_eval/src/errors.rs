//! Error types for evaluation.
//!
//! Every error in this taxonomy is program-fatal: the evaluator aborts at
//! the first failure and surfaces it to the host unchanged. Factory
//! functions are the construction API; they populate the structured `kind`
//! so callers can match on categories instead of parsing message strings.

use std::fmt;

/// The runtime kind an operation required but did not receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpectedKind {
    /// An arithmetic or comparison operand.
    Num,
    /// A conditional or loop condition.
    Bool,
    /// A call target.
    Closure,
    /// A field access base.
    HashMap,
    /// An array subscript index.
    Int,
    /// A subscript base.
    Subscriptable,
    /// A `len` argument.
    Countable,
}

impl ExpectedKind {
    const fn describe(self) -> &'static str {
        match self {
            Self::Num => "a number",
            Self::Bool => "a boolean",
            Self::Closure => "a callable value",
            Self::HashMap => "a map",
            Self::Int => "an integer index",
            Self::Subscriptable => "an array or map",
            Self::Countable => "a string, array, or map",
        }
    }
}

impl fmt::Display for ExpectedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Typed error category for evaluation failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// A variable lookup or assignment target resolves to no binding in
    /// any live frame.
    UnboundVariable { name: String },
    /// An assignment target is not a plain variable reference.
    InvalidLvalue,
    /// An operand does not match the runtime kind an operation requires.
    TypeError { expected: ExpectedKind },
    /// Division or modulo where the divisor is exactly zero.
    DivisionByZero,
    /// A call supplied the wrong number of arguments.
    IncorrectArity { expected: usize, actual: usize },
    /// A map lookup found no entry for the key.
    KeyNotFound { key: String },
    /// A value whose kind cannot serve as a map key.
    UnsupportedKey { kind: &'static str },
    /// An array subscript outside the array's bounds.
    IndexOutOfBounds { index: i64 },
    /// A node shape or control transfer the evaluator's contract excludes.
    Internal { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundVariable { name } => write!(f, "unbound variable: {name}"),
            Self::InvalidLvalue => write!(f, "invalid assignment target"),
            Self::TypeError { expected } => write!(f, "type error: expected {expected}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IncorrectArity { expected, actual } => {
                let noun = if *expected == 1 { "argument" } else { "arguments" };
                write!(f, "expected {expected} {noun}, got {actual}")
            }
            Self::KeyNotFound { key } => write!(f, "key not found: {key}"),
            Self::UnsupportedKey { kind } => write!(f, "unsupported map key: {kind}"),
            Self::IndexOutOfBounds { index } => write!(f, "index out of bounds: {index}"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

/// Evaluation error.
///
/// The language has no catch construct, so an error unwinds the whole
/// evaluation; partial side effects already performed remain visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

/// Unresolvable variable lookup or assignment.
#[cold]
pub fn unbound_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundVariable {
        name: name.to_string(),
    })
}

/// Assignment to something that is not a variable.
#[cold]
pub fn invalid_lvalue() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidLvalue)
}

/// Operand of the wrong runtime kind.
#[cold]
pub fn type_error(expected: ExpectedKind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeError { expected })
}

/// Division or modulo by exactly zero.
#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

/// Call with the wrong argument count.
#[cold]
pub fn incorrect_arity(expected: usize, actual: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IncorrectArity { expected, actual })
}

/// Map lookup that matched no entry.
#[cold]
pub fn key_not_found(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotFound {
        key: key.to_string(),
    })
}

/// Map key of a kind the key model excludes.
#[cold]
pub fn unsupported_key(kind: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedKey { kind })
}

/// Array subscript outside the array.
#[cold]
pub fn index_out_of_bounds(index: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index })
}

/// Contract violation inside the evaluator itself.
#[cold]
pub fn internal(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Internal {
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_messages() {
        assert_eq!(unbound_variable("x").to_string(), "unbound variable: x");
        assert_eq!(division_by_zero().to_string(), "division by zero");
        assert_eq!(
            type_error(ExpectedKind::Num).to_string(),
            "type error: expected a number"
        );
        assert_eq!(key_not_found("speed").to_string(), "key not found: speed");
        assert_eq!(
            unsupported_key("array").to_string(),
            "unsupported map key: array"
        );
        assert_eq!(index_out_of_bounds(7).to_string(), "index out of bounds: 7");
    }

    #[test]
    fn test_arity_message_pluralizes() {
        assert_eq!(incorrect_arity(1, 3).to_string(), "expected 1 argument, got 3");
        assert_eq!(incorrect_arity(2, 1).to_string(), "expected 2 arguments, got 1");
    }

    #[test]
    fn test_kind_matching() {
        let err = incorrect_arity(2, 3);
        assert_eq!(
            err.kind,
            EvalErrorKind::IncorrectArity {
                expected: 2,
                actual: 3
            }
        );
    }
}

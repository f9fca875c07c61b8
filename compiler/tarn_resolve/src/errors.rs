//! Error types for scope analysis.
//!
//! Factory functions are the public construction API; they populate the
//! structured `kind` so callers can match on categories instead of parsing
//! message strings.

use std::fmt;

/// Typed error category for scope analysis failures.
///
/// Scope analysis validates binding existence only, so the taxonomy is
/// deliberately small: a name that resolves nowhere, or an assignment whose
/// target is not assignable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeErrorKind {
    /// A variable reference or assignment target resolves to no declared
    /// binding in any enclosing scope.
    UnboundVariable { name: String },
    /// An assignment target is not a plain variable reference.
    InvalidLvalue,
}

impl fmt::Display for ScopeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundVariable { name } => write!(f, "unbound variable: {name}"),
            Self::InvalidLvalue => write!(f, "invalid assignment target"),
        }
    }
}

/// Scope analysis error.
///
/// Analysis aborts at the first violation; there is no recovery or
/// multi-error collection in this pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeError {
    /// Structured error category.
    pub kind: ScopeErrorKind,
}

impl ScopeError {
    fn from_kind(kind: ScopeErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ScopeError {}

// Factory functions

/// Unresolvable variable reference.
#[cold]
pub fn unbound_variable(name: &str) -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::UnboundVariable {
        name: name.to_string(),
    })
}

/// Assignment to something that is not a variable.
#[cold]
pub fn invalid_lvalue() -> ScopeError {
    ScopeError::from_kind(ScopeErrorKind::InvalidLvalue)
}

//! Binary operators.
//!
//! The operator set is fixed: five arithmetic operators and two comparisons.
//! Equality is defined over all runtime values; every other operator requires
//! numeric operands.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    LtEq,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    ///
    /// Used in error messages to show the exact operator that failed.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::LtEq => "<=",
        }
    }

    /// Whether this operator requires numeric operands.
    ///
    /// Equality is the one operator defined over every value kind.
    pub const fn requires_numbers(self) -> bool {
        !matches!(self, Self::Eq)
    }
}

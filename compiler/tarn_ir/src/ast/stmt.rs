//! Statement nodes.

use super::expr::Expr;
use crate::Name;

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement. The value is discarded, except when the
    /// statement is the last of a block, where it becomes the block's value.
    Expr(Expr),

    /// Binding declaration: `let name = init`
    Let { name: Name, init: Expr },

    /// Assignment to an existing binding: `target = value`
    ///
    /// Before lowering the target must be a plain variable reference; any
    /// other source-level target is a binding error. Lowered trees may also
    /// carry subscript targets.
    Assign { target: Expr, value: Expr },

    /// Early return from the enclosing function call: `return expr`
    Return(Expr),
}

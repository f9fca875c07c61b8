//! Native functions and global environment seeding.
//!
//! The global frame is the bottom of every frame stack and carries the
//! host-provided operations. Programs may shadow these names like any
//! other binding; the seed frame itself is never special-cased after
//! construction.

use tarn_ir::{Name, StringInterner};

use crate::environment::Frame;
use crate::errors::{self, EvalError, ExpectedKind};
use crate::print_handler::PrintHandler;
use crate::value::Value;

/// Build the seed frame containing the native functions.
pub fn global_frame(interner: &StringInterner) -> Frame {
    let mut frame = Frame::default();
    frame.insert(interner.intern("puts"), Value::Native(native_puts, "puts"));
    frame.insert(interner.intern("len"), Value::Native(native_len, "len"));
    frame
}

/// The names seeded by [`global_frame`], for scope analysis.
///
/// Callers pass this to `tarn_resolve::analyze` so the two passes agree
/// on what the global environment provides.
pub fn global_names(interner: &StringInterner) -> Vec<Name> {
    vec![interner.intern("puts"), interner.intern("len")]
}

/// `puts(...)`: render each argument on its own line; returns unit.
///
/// Accepts any number of arguments, including none.
fn native_puts(args: &[Value], handler: &PrintHandler) -> Result<Value, EvalError> {
    for arg in args {
        handler.println(&arg.display_value());
    }
    Ok(Value::Unit)
}

/// `len(v)`: element count of an array or map, character count of a
/// string.
fn native_len(args: &[Value], _handler: &PrintHandler) -> Result<Value, EvalError> {
    let [value] = args else {
        return Err(errors::incorrect_arity(1, args.len()));
    };
    let count = match value {
        Value::Str(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Map(entries) => entries.len(),
        _ => return Err(errors::type_error(ExpectedKind::Countable)),
    };
    Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
}

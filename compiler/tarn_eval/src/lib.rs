//! Tree-walking evaluator for Tarn programs.
//!
//! Evaluation consumes the same syntax tree the scope analyzer validated
//! and executes it directly: no bytecode, no lowering required. The
//! evaluator owns a stack of scope frames seeded with the native
//! functions, threads early returns to the nearest call boundary as
//! ordinary control-flow data, and reports every runtime fault through
//! one typed error taxonomy.
//!
//! Closures capture by snapshot: defining a function copies every
//! enclosing frame, and a `let`-bound function is patched into its own
//! snapshot so it can recurse into itself. Later mutation of the defining
//! scope never shows through a capture.
//!
//! Output from `puts` goes through a print handler chosen by the host:
//! stdout for normal runs, a buffer for tests and embeddings, or nothing.

mod environment;
mod errors;
mod interpreter;
mod natives;
mod operators;
mod print_handler;
mod value;

pub use environment::{Environment, Frame, LocalScope};
pub use errors::{EvalError, EvalErrorKind, ExpectedKind};
pub use interpreter::Interpreter;
pub use natives::{global_frame, global_names};
pub use operators::evaluate_binary;
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use value::{ClosureValue, MapKey, NativeFn, Value};

//! Print handler for configurable output.
//!
//! `puts` writes through whichever handler the host installed, so output
//! can go to stdout (the default), into a buffer for capture in tests and
//! embeddings, or nowhere at all. Enum dispatch keeps this hot path free
//! of vtable indirection.

use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for program output.
pub enum PrintHandler {
    /// Writes to stdout (default).
    Stdout,
    /// Captures to a buffer for later inspection.
    Buffer(Mutex<String>),
    /// Discards all output.
    Silent,
}

impl PrintHandler {
    /// Write one line, with trailing newline.
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout => println!("{msg}"),
            Self::Buffer(buffer) => {
                let mut buf = buffer.lock();
                buf.push_str(msg);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// All captured output so far.
    ///
    /// Empty for handlers that do not capture.
    pub fn output(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    /// Drop any captured output.
    pub fn clear(&self) {
        if let Self::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

/// Shared print handler that can be passed around.
pub type SharedPrintHandler = Arc<PrintHandler>;

/// Create the default stdout print handler.
pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

/// Create a buffer print handler for capturing output.
pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

/// Create a silent print handler that discards all output.
pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}

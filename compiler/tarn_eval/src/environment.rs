//! Environment for variable scoping in the evaluator.
//!
//! The environment is an ordered stack of frames. Lookup walks from the
//! innermost frame outward, so an inner binding shadows an outer one with
//! the same name without disturbing it. Each frame lives in a shared cell
//! (`LocalScope`) so closure capture can snapshot the stack cheaply and
//! calls can reuse a closure's captured cells without copying them again.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tarn_ir::Name;

use crate::value::Value;

/// A single-threaded shared cell for frame storage.
///
/// Wraps `Rc<RefCell<T>>` so all frame allocations go through one factory
/// and the single-threaded sharing discipline is visible in the type. The
/// evaluator runs on one thread; `Rc` is deliberate.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    /// Create a new cell wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

/// One mapping from name to bound value.
pub type Frame = FxHashMap<Name, Value>;

/// The evaluator's frame stack.
///
/// The bottom frame is the global frame seeded with native functions; it
/// is never popped. Blocks, branches, loop bodies, and calls push frames
/// above it and pop them on exit.
#[derive(Clone, Debug)]
pub struct Environment {
    frames: Vec<LocalScope<Frame>>,
}

impl Environment {
    /// Environment whose bottom frame is `global`.
    pub fn with_global(global: Frame) -> Self {
        Environment {
            frames: vec![LocalScope::new(global)],
        }
    }

    /// Environment with an empty global frame.
    pub fn new() -> Self {
        Self::with_global(Frame::default())
    }

    /// Environment for a closure call: the closure's captured frames with
    /// the argument frame pushed on top.
    pub fn for_call(captured: Vec<LocalScope<Frame>>, arguments: Frame) -> Self {
        let mut frames = captured;
        frames.push(LocalScope::new(arguments));
        Environment { frames }
    }

    /// Push a fresh empty frame.
    pub fn push_frame(&mut self) {
        self.frames.push(LocalScope::default());
    }

    /// Pop the innermost frame. The global frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame, shadowing any outer binding.
    pub fn define(&mut self, name: Name, value: Value) {
        if let Some(frame) = self.frames.last() {
            frame.borrow_mut().insert(name, value);
        }
    }

    /// Resolve `name` against the innermost frame that binds it.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().get(&name).cloned())
    }

    /// Overwrite the innermost binding of `name` in place.
    ///
    /// Returns `false` when no live frame binds the name; the caller
    /// raises the unbound-variable error with the rendered name.
    pub fn assign(&mut self, name: Name, value: Value) -> bool {
        for frame in self.frames.iter().rev() {
            let mut bindings = frame.borrow_mut();
            if let Some(slot) = bindings.get_mut(&name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// Snapshot the full frame stack for closure capture.
    ///
    /// Each frame's bindings are copied into a fresh cell, so later
    /// definitions and assignments in the defining scope do not show
    /// through the snapshot.
    pub fn capture(&self) -> Vec<LocalScope<Frame>> {
        self.frames
            .iter()
            .map(|frame| LocalScope::new(frame.borrow().clone()))
            .collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(raw: u32) -> Name {
        Name::from_raw(raw)
    }

    #[test]
    fn test_lookup_prefers_innermost_frame() {
        let mut env = Environment::new();
        env.define(name(1), Value::Int(1));
        env.push_frame();
        env.define(name(1), Value::Int(2));
        assert_eq!(env.lookup(name(1)), Some(Value::Int(2)));
        env.pop_frame();
        assert_eq!(env.lookup(name(1)), Some(Value::Int(1)));
    }

    #[test]
    fn test_lookup_misses_popped_bindings() {
        let mut env = Environment::new();
        env.push_frame();
        env.define(name(7), Value::Bool(true));
        env.pop_frame();
        assert_eq!(env.lookup(name(7)), None);
    }

    #[test]
    fn test_assign_overwrites_innermost_binding() {
        let mut env = Environment::new();
        env.define(name(3), Value::Int(10));
        env.push_frame();
        assert!(env.assign(name(3), Value::Int(20)));
        env.pop_frame();
        assert_eq!(env.lookup(name(3)), Some(Value::Int(20)));
    }

    #[test]
    fn test_assign_reports_missing_binding() {
        let mut env = Environment::new();
        assert!(!env.assign(name(9), Value::Unit));
    }

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut env = Environment::new();
        env.define(name(2), Value::Int(5));
        env.pop_frame();
        env.pop_frame();
        assert_eq!(env.depth(), 1);
        assert_eq!(env.lookup(name(2)), Some(Value::Int(5)));
    }

    #[test]
    fn test_capture_is_decoupled_from_later_mutation() {
        let mut env = Environment::new();
        env.define(name(4), Value::Int(1));
        let snapshot = env.capture();
        assert!(env.assign(name(4), Value::Int(2)));
        env.define(name(5), Value::Int(3));

        let captured = snapshot[0].borrow();
        assert_eq!(captured.get(&name(4)), Some(&Value::Int(1)));
        assert_eq!(captured.get(&name(5)), None);
    }

    #[test]
    fn test_for_call_layers_arguments_over_captured_frames() {
        let mut env = Environment::new();
        env.define(name(1), Value::Int(10));
        let captured = env.capture();

        let mut arguments = Frame::default();
        arguments.insert(name(2), Value::Int(20));
        let call_env = Environment::for_call(captured, arguments);

        assert_eq!(call_env.depth(), 2);
        assert_eq!(call_env.lookup(name(1)), Some(Value::Int(10)));
        assert_eq!(call_env.lookup(name(2)), Some(Value::Int(20)));
    }
}

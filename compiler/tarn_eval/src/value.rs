//! Runtime value model.
//!
//! Values are dynamically typed and cheap to clone: compound values share
//! their payload behind `Rc`, so cloning a frame during closure capture
//! copies handles, not element storage. Numbers keep their integer or
//! float representation; arithmetic promotes to float only when an operand
//! already is one.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tarn_ir::FunctionLit;

use crate::environment::{Frame, LocalScope};
use crate::errors::{self, EvalError};
use crate::print_handler::PrintHandler;

/// Host operation callable from programs.
///
/// Natives receive the evaluated argument list and the active print
/// handler; they never see unevaluated syntax.
pub type NativeFn = fn(&[Value], &PrintHandler) -> Result<Value, EvalError>;

/// A user function closed over its defining environment.
///
/// `captured` is a snapshot taken at definition time: one fresh cell per
/// enclosing frame, decoupled from later mutation of the defining scope.
/// The cell for the innermost frame additionally holds the closure itself
/// under its `let`-bound name, which is what makes direct self-recursion
/// work without any pre-declaration mechanism.
#[derive(Clone)]
pub struct ClosureValue {
    /// Parameter list and body, shared with the syntax tree.
    pub function: Rc<FunctionLit>,
    /// Snapshot of every frame enclosing the definition site.
    pub captured: Vec<LocalScope<Frame>>,
}

impl fmt::Debug for ClosureValue {
    // Captured frames can contain the closure itself; printing them would
    // never terminate.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClosureValue(arity {})", self.function.params.len())
    }
}

/// A Tarn runtime value.
#[derive(Clone)]
pub enum Value {
    /// The unit value.
    Unit,
    /// Exact integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Immutable string.
    Str(Rc<String>),
    /// Boolean.
    Bool(bool),
    /// Ordered sequence of values.
    Array(Rc<Vec<Value>>),
    /// Keyed collection over the restricted key model.
    Map(Rc<FxHashMap<MapKey, Value>>),
    /// User function with its captured environment.
    Closure(ClosureValue),
    /// Host function and its program-visible name.
    Native(NativeFn, &'static str),
}

impl Value {
    /// Shorthand for building a string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Rc::new(s.into()))
    }

    /// Shorthand for building an array value.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    /// Shorthand for building a map value.
    pub fn map(entries: FxHashMap<MapKey, Value>) -> Self {
        Value::Map(Rc::new(entries))
    }

    /// The kind name used in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Closure(_) => "closure",
            Value::Native(..) => "native",
        }
    }

    /// Render the value the way `puts` prints it.
    ///
    /// Strings render without quotes, so `puts("hi")` writes `hi`, not
    /// `"hi"`.
    pub fn display_value(&self) -> String {
        match self {
            Value::Unit => "unit".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(items) => {
                let inner: Vec<_> = items.iter().map(Value::display_value).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Map(entries) => {
                let inner: Vec<_> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.display_key(), v.display_value()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            Value::Closure(_) => "<fn>".to_string(),
            Value::Native(_, name) => format!("<native {name}>"),
        }
    }

    /// Total equality relation over values.
    ///
    /// Numbers compare across representations exactly, so `1` equals
    /// `1.0`. Arrays and maps compare structurally. Closures and natives
    /// are never equal to anything, themselves included. Values of
    /// different kinds compare unequal rather than raising.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                float_as_int(*b) == Some(*a)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.equals(w)))
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("Unit"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Array(items) => write!(f, "Array({:?})", &**items),
            Value::Map(entries) => write!(f, "Map({:?})", &**entries),
            Value::Closure(closure) => write!(f, "{closure:?}"),
            Value::Native(_, name) => write!(f, "Native({name})"),
        }
    }
}

/// Map key over the restricted key model.
///
/// Only unit, booleans, strings, and numbers key maps. A float with an
/// exact integral value canonicalizes to the equivalent integer key, so
/// `m[2]` and `m[2.0]` address the same entry; other floats key by bit
/// pattern. Compound and callable values are rejected at insertion and
/// lookup alike.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// The unit key.
    Unit,
    /// Boolean key.
    Bool(bool),
    /// Integer key, including canonicalized integral floats.
    Int(i64),
    /// Non-integral float key, identified by bit pattern.
    Float(u64),
    /// String key.
    Str(Rc<String>),
}

impl MapKey {
    /// Convert a runtime value into a key, canonicalizing integral floats.
    pub fn from_value(value: &Value) -> Result<MapKey, EvalError> {
        match value {
            Value::Unit => Ok(MapKey::Unit),
            Value::Bool(b) => Ok(MapKey::Bool(*b)),
            Value::Int(n) => Ok(MapKey::Int(*n)),
            Value::Float(f) => Ok(match float_as_int(*f) {
                Some(n) => MapKey::Int(n),
                None => MapKey::Float(f.to_bits()),
            }),
            Value::Str(s) => Ok(MapKey::Str(Rc::clone(s))),
            other => Err(errors::unsupported_key(other.type_name())),
        }
    }

    /// Shorthand for building a string key.
    pub fn string(s: impl Into<String>) -> Self {
        MapKey::Str(Rc::new(s.into()))
    }

    /// Render the key the way the value it came from renders.
    pub fn display_key(&self) -> String {
        match self {
            MapKey::Unit => "unit".to_string(),
            MapKey::Bool(b) => b.to_string(),
            MapKey::Int(n) => n.to_string(),
            MapKey::Float(bits) => f64::from_bits(*bits).to_string(),
            MapKey::Str(s) => s.to_string(),
        }
    }
}

/// The exact integer a float denotes, if it denotes one.
///
/// The upper bound is exclusive because `i64::MAX as f64` rounds up to
/// 2^63, one past the largest representable integer.
pub(crate) fn float_as_int(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

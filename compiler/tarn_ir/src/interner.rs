//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup so that every pass can compare and hash
//! identifiers as plain `u32` handles instead of string contents.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Interner storage behind the lock.
struct InternTable {
    /// Map from string content to handle.
    map: FxHashMap<&'static str, Name>,
    /// Storage for string contents, indexed by handle.
    strings: Vec<&'static str>,
}

impl InternTable {
    fn new() -> Self {
        let mut table = Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        // Pre-intern empty string at index 0 so Name::EMPTY always resolves
        let empty: &'static str = "";
        table.map.insert(empty, Name::EMPTY);
        table.strings.push(empty);
        table
    }
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Interner exceeded capacity (over 4 billion strings).
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {} strings, max is {}",
                count,
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// String interner shared by every pass operating on one program.
///
/// Interned strings are leaked to obtain the `'static` lifetime, so lookups
/// stay valid for as long as the process runs. The table is guarded by a
/// single `RwLock`; execution is single-threaded by design, but an embedding
/// host may hold the interner from more than one place.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with the native function names pre-interned.
    pub fn new() -> Self {
        let interner = Self {
            table: RwLock::new(InternTable::new()),
        };
        interner.pre_intern_natives();
        interner
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    ///
    /// This is the fallible version of `intern()`.
    #[inline]
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: check if already interned
        {
            let guard = self.table.read();
            if let Some(&name) = guard.map.get(s) {
                return Ok(name);
            }
        }

        let mut guard = self.table.write();

        // Double-check after acquiring write lock
        if let Some(&name) = guard.map.get(s) {
            return Ok(name);
        }

        // Leak the string to get 'static lifetime
        let owned: String = s.to_owned();
        Self::insert(&mut guard, Box::leak(owned.into_boxed_str()))
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity (over 4 billion strings).
    /// Use `try_intern` for fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Try to intern an owned String, avoiding the extra allocation that
    /// `try_intern(&s)` would perform.
    pub fn try_intern_owned(&self, s: String) -> Result<Name, InternError> {
        {
            let guard = self.table.read();
            if let Some(&name) = guard.map.get(s.as_str()) {
                return Ok(name);
            }
        }

        let mut guard = self.table.write();

        if let Some(&name) = guard.map.get(s.as_str()) {
            return Ok(name);
        }

        Self::insert(&mut guard, Box::leak(s.into_boxed_str()))
    }

    /// Intern an owned String, avoiding double allocation.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity. Use `try_intern_owned` for
    /// fallible interning.
    pub fn intern_owned(&self, s: String) -> Name {
        self.try_intern_owned(s).unwrap_or_else(|e| panic!("{e}"))
    }

    fn insert(table: &mut InternTable, leaked: &'static str) -> Result<Name, InternError> {
        let raw = u32::try_from(table.strings.len()).map_err(|_| InternError::Overflow {
            count: table.strings.len(),
        })?;
        let name = Name::from_raw(raw);
        table.strings.push(leaked);
        table.map.insert(leaked, name);
        Ok(name)
    }

    /// Look up the string for a Name.
    pub fn lookup(&self, name: Name) -> &str {
        let guard = self.table.read();
        guard.strings[name.raw() as usize]
    }

    /// Pre-intern the native function names every program environment knows.
    fn pre_intern_natives(&self) {
        const NATIVES: &[&str] = &["puts", "len"];

        for native in NATIVES {
            self.intern(native);
        }
    }

    /// Get the number of interned strings.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for looking up interned string names.
///
/// Exists to avoid tight coupling: higher-level crates can define methods
/// that accept any `StringLookup` implementor without depending directly on
/// `StringInterner`.
pub trait StringLookup {
    /// Look up the string for an interned name.
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}

/// Shared handle to a [`StringInterner`].
///
/// The newtype enforces that interner sharing goes through one type instead
/// of ad-hoc `Arc<StringInterner>` usage. Passes that only read names should
/// take `&StringInterner` (or a `StringLookup` bound); owners that outlive
/// their callers hold a `SharedInterner`.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

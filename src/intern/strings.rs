//! String interner for identifier storage.
//!
//! Strings are stored contiguously and never deallocated, so lookups hand
//! out `&'static str` and environment keys hash a `u32` instead of a string.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;

/// Interned string identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

struct InternState {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

/// String interner.
///
/// Provides O(1) lookup and equality comparison for interned strings. The
/// interpreter itself is single-threaded; the lock exists so a single
/// interner can be shared by parallel test runners.
pub struct StringInterner {
    state: RwLock<InternState>,
}

impl StringInterner {
    /// Create a new interner with pre-interned keywords and common strings.
    pub fn new() -> Self {
        let mut state = InternState {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };

        // Pre-intern the empty string at index 0
        let empty: &'static str = "";
        state.map.insert(empty, 0);
        state.strings.push(empty);

        let interner = Self {
            state: RwLock::new(state),
        };
        interner.pre_intern_keywords();
        interner
    }

    /// Intern a string, returning its Name.
    pub fn intern(&self, s: &str) -> Name {
        // Fast path: already interned
        {
            let guard = self.state.read();
            if let Some(&idx) = guard.map.get(s) {
                return Name(idx);
            }
        }

        let mut guard = self.state.write();

        // Double-check after acquiring the write lock
        if let Some(&idx) = guard.map.get(s) {
            return Name(idx);
        }

        // Leak the string to get 'static lifetime
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let idx = guard.strings.len() as u32;
        guard.strings.push(leaked);
        guard.map.insert(leaked, idx);
        Name(idx)
    }

    /// Look up the string for a Name.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.state.read();
        guard.strings[name.raw() as usize]
    }

    /// Pre-intern Ghost keywords and common identifiers.
    fn pre_intern_keywords(&self) {
        const KEYWORDS: &[&str] = &[
            // Keywords
            "true", "false", "null", "if", "else", "while", "for", "in",
            "function", "return", "import", "and", "or",
            // Built-in functions and namespaces
            "length", "push", "pop", "first", "last", "rest", "keys",
            "values", "type", "print", "Math",
            // Common identifiers
            "x", "y", "z", "i", "j", "n", "a", "b", "c",
            "value", "result", "index", "item", "items", "list", "map",
        ];

        for kw in KEYWORDS {
            self.intern(kw);
        }
    }

    /// Get the number of interned strings.
    pub fn len(&self) -> usize {
        self.state.read().strings.len()
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

//! String interner for identifier storage.
//!
//! One interner is owned by each compilation and handed to every pass by
//! reference. Interning takes `&self` so passes that only read the AST can
//! still intern the odd synthesized name.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Interned text and its reverse map.
struct InternState {
    /// Map from string content to index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents, indexed by `Name`.
    strings: Vec<&'static str>,
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// String interner.
///
/// Provides O(1) lookup and equality comparison for interned strings.
/// Strings are leaked so lookups can hand out `&'static str`.
pub struct StringInterner {
    state: RwLock<InternState>,
}

impl StringInterner {
    /// Create a new interner with the Cool built-in names pre-interned.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        let interner = Self {
            state: RwLock::new(InternState {
                map,
                strings: vec![empty],
            }),
        };
        interner.pre_intern_builtins();
        interner
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        {
            let guard = self.state.read();
            if let Some(&index) = guard.map.get(s) {
                return Ok(Name::from_raw(index));
            }
        }

        let mut guard = self.state.write();

        // Double-check after acquiring write lock
        if let Some(&index) = guard.map.get(s) {
            return Ok(Name::from_raw(index));
        }

        let index = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, index);
        Ok(Name::from_raw(index))
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds `u32::MAX` strings.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a Name.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.state.read().strings[name.index()]
    }

    /// Pre-intern the names every Cool program refers to.
    fn pre_intern_builtins(&self) {
        const BUILTINS: &[&str] = &[
            // Basic classes
            "Object",
            "IO",
            "Int",
            "Bool",
            "String",
            "Main",
            // Special symbols
            "SELF_TYPE",
            "self",
            "_no_class",
            "_no_type",
            // Primitive slot types
            "int",
            "bool",
            "sbyte*",
            // Basic methods and slots
            "abort",
            "type_name",
            "copy",
            "out_string",
            "out_int",
            "in_string",
            "in_int",
            "length",
            "concat",
            "substr",
            "val",
            "arg",
            "arg2",
            "main",
        ];

        for builtin in BUILTINS {
            self.intern(builtin);
        }
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.state.read().strings.len()
    }

    /// True if only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

//! # symtab
//!
//! The table of defined names, built on [`indexmap::IndexMap`].
//!
//! Assignments `name = expression` store a value here; identifiers inside
//! expressions read it back. Names keep the order of their first definition.
//!
//! ## Example
//! ```rust
//! # use gramrt_calc::SymTab;
//! let mut st = SymTab::new();
//! assert!(!st.define("x", 2.0)); // first definition
//! assert!(st.define("x", 3.0)); // reassignment
//! assert_eq!(st.get("x"), Some(3.0));
//! assert_eq!(st.get("y"), None);
//! ```

use indexmap::IndexMap;
use smartstring::alias::String;

/// Maps names to their current values.
#[derive(Debug, Clone, Default)]
pub struct SymTab {
    tab: IndexMap<String, f64>,
}

impl SymTab {
    pub fn new() -> Self {
        Self {
            tab: IndexMap::new(),
        }
    }

    /// Returns the number of defined names.
    ///
    /// # Example
    /// ```rust
    /// # use gramrt_calc::SymTab;
    /// let mut symtab = SymTab::new();
    /// assert_eq!(symtab.len(), 0);
    /// symtab.define("foo", 1.0);
    /// symtab.define("foo", 2.0);
    /// assert_eq!(symtab.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tab.is_empty()
    }

    /// Binds `name` to `value`. Returns `true` if the name was already defined.
    pub fn define(&mut self, name: impl AsRef<str>, value: f64) -> bool {
        self.tab.insert(String::from(name.as_ref()), value).is_some()
    }

    /// The value of `name`, if defined.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.tab.get(name).copied()
    }

    /// Names and values in order of first definition.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.tab.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

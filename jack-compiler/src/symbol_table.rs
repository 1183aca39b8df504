//! Two-scope symbol tables for Jack
//!
//! Exactly two tables are live while a subroutine compiles: the class
//! table (statics and fields, persisting across the class) and the
//! subroutine table (arguments and locals, rebuilt at every subroutine).
//! Resolution searches the subroutine table first, then the class table.

use std::collections::HashMap;

/// Variable kinds, in the order their segments are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Var,
}

impl Kind {
    /// VM segment this kind lives in at emit time.
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Field => "this",
            Self::Argument => "argument",
            Self::Var => "local",
        }
    }
}

/// (type, kind, index) of one defined name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub ty: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: HashMap<String, Entry>,
    counts: HashMap<Kind, u16>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_capacity(8),
            counts: HashMap::with_capacity(2),
        }
    }

    /// Defines a name; its index is the running count of its kind.
    ///
    /// Returns `false` when the name is already defined in this scope.
    pub fn define(&mut self, name: &str, ty: &str, kind: Kind) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        let count = self.counts.entry(kind).or_insert(0);
        self.entries.insert(
            name.to_string(),
            Entry {
                ty: ty.to_string(),
                kind,
                index: *count,
            },
        );
        *count += 1;
        true
    }

    /// Number of names of the given kind defined so far.
    #[must_use]
    pub fn var_count(&self, kind: Kind) -> u16 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.get(name).map(|e| e.kind)
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|e| e.ty.as_str())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.get(name).map(|e| e.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_run_per_kind() {
        let mut table = SymbolTable::new();
        assert!(table.define("x", "int", Kind::Field));
        assert!(table.define("y", "int", Kind::Field));
        assert!(table.define("count", "int", Kind::Static));

        assert_eq!(table.index_of("x"), Some(0));
        assert_eq!(table.index_of("y"), Some(1));
        assert_eq!(table.index_of("count"), Some(0));
        assert_eq!(table.var_count(Kind::Field), 2);
        assert_eq!(table.var_count(Kind::Static), 1);
        assert_eq!(table.var_count(Kind::Var), 0);
    }

    #[test]
    fn test_duplicate_definition_is_rejected() {
        let mut table = SymbolTable::new();
        assert!(table.define("x", "int", Kind::Var));
        assert!(!table.define("x", "boolean", Kind::Var));
        // The first definition wins
        assert_eq!(table.type_of("x"), Some("int"));
    }

    #[test]
    fn test_lookup_misses() {
        let table = SymbolTable::new();
        assert_eq!(table.get("ghost"), None);
        assert_eq!(table.kind_of("ghost"), None);
        assert_eq!(table.index_of("ghost"), None);
    }

    #[test]
    fn test_kind_to_segment() {
        assert_eq!(Kind::Static.segment(), "static");
        assert_eq!(Kind::Field.segment(), "this");
        assert_eq!(Kind::Argument.segment(), "argument");
        assert_eq!(Kind::Var.segment(), "local");
    }
}

//! Symbol table for the Hack assembler
//!
//! Uses a hybrid approach:
//! - PHF (Perfect Hash Function) for predefined symbols - O(1) compile-time lookup
//! - Standard `HashMap` for user-defined labels and variables
//!
//! Labels are bound during pass 1 to the ROM address of the instruction
//! that follows them. Variables are allocated during pass 2, contiguously
//! from RAM address 16 upward, on first reference.

use phf::phf_map;
use std::collections::HashMap;

/// RAM address handed to the first program variable.
const VARIABLE_BASE: u16 = 16;

/// Predefined symbols with compile-time perfect hash
///
/// These symbols are built into the Hack platform and never change.
static PREDEFINED_SYMBOLS: phf::Map<&'static str, u16> = phf_map! {
    // Virtual registers
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,

    // Special pointers
    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,

    // I/O pointers
    "SCREEN" => 16384,
    "KBD" => 24576,
};

/// Mapping from symbol names to 16-bit addresses
///
/// # Example
/// ```
/// use hack_assembler::SymbolTable;
///
/// let mut table = SymbolTable::new();
/// assert_eq!(table.address_of("SP"), Some(0));
/// assert!(table.add_label("LOOP", 4));
/// assert_eq!(table.address_of("LOOP"), Some(4));
/// assert_eq!(table.resolve_or_allocate("i"), 16);
/// ```
#[derive(Debug)]
pub struct SymbolTable {
    /// User-defined symbols (labels and variables)
    user_symbols: HashMap<String, u16>,
    /// Next free RAM address for variable allocation
    next_address: u16,
}

impl Default for SymbolTable {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a new symbol table
    ///
    /// Predefined symbols are available via PHF, so no initialization is
    /// needed. Pre-allocates space for a typical user symbol count.
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_symbols: HashMap::with_capacity(32),
            next_address: VARIABLE_BASE,
        }
    }

    /// Binds a label to a ROM address (pass 1).
    ///
    /// Returns `false` when the name is already taken, either by a
    /// predefined symbol or by an earlier label.
    #[inline]
    pub fn add_label(&mut self, name: &str, address: u16) -> bool {
        if self.contains(name) {
            return false;
        }
        self.user_symbols.insert(name.to_string(), address);
        true
    }

    /// Checks whether a symbol exists (predefined or user-defined)
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        PREDEFINED_SYMBOLS.contains_key(name) || self.user_symbols.contains_key(name)
    }

    /// Looks up a symbol without allocating.
    #[inline]
    #[must_use]
    pub fn address_of(&self, name: &str) -> Option<u16> {
        // Fast path: predefined symbols first (most common in real code)
        if let Some(&addr) = PREDEFINED_SYMBOLS.get(name) {
            return Some(addr);
        }
        self.user_symbols.get(name).copied()
    }

    /// Resolves a symbol, allocating a fresh variable address on first
    /// reference.
    ///
    /// This is the hot path of pass 2. Predefined symbols and labels win;
    /// anything unknown becomes a variable at the next free RAM address.
    #[inline]
    pub fn resolve_or_allocate(&mut self, name: &str) -> u16 {
        use std::collections::hash_map::Entry;

        if let Some(&addr) = PREDEFINED_SYMBOLS.get(name) {
            return addr;
        }

        // Entry API avoids a double lookup on the miss path.
        match self.user_symbols.entry(name.to_string()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let addr = self.next_address;
                self.next_address += 1;
                *e.insert(addr)
            }
        }
    }

    /// Number of user-defined symbols (labels plus variables).
    #[inline]
    #[must_use]
    pub fn user_symbol_count(&self) -> usize {
        self.user_symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_symbols() {
        let table = SymbolTable::new();

        assert_eq!(table.address_of("SP"), Some(0));
        assert_eq!(table.address_of("LCL"), Some(1));
        assert_eq!(table.address_of("ARG"), Some(2));
        assert_eq!(table.address_of("THIS"), Some(3));
        assert_eq!(table.address_of("THAT"), Some(4));
        assert_eq!(table.address_of("SCREEN"), Some(16384));
        assert_eq!(table.address_of("KBD"), Some(24576));

        for i in 0..=15 {
            assert_eq!(table.address_of(&format!("R{i}")), Some(i));
        }
    }

    #[test]
    fn test_labels() {
        let mut table = SymbolTable::new();

        assert!(table.add_label("LOOP", 100));
        assert_eq!(table.address_of("LOOP"), Some(100));
        assert!(table.contains("LOOP"));

        assert!(!table.add_label("LOOP", 200), "duplicate label");
        assert!(!table.add_label("SP", 9), "predefined name");
        assert_eq!(table.address_of("UNKNOWN"), None);
    }

    #[test]
    fn test_variable_allocation_starts_at_16() {
        let mut table = SymbolTable::new();

        assert_eq!(table.resolve_or_allocate("i"), 16);
        assert_eq!(table.resolve_or_allocate("sum"), 17);
        // Re-resolving must not allocate again
        assert_eq!(table.resolve_or_allocate("i"), 16);
        assert_eq!(table.user_symbol_count(), 2);
    }

    #[test]
    fn test_resolve_prefers_existing_bindings() {
        let mut table = SymbolTable::new();
        table.add_label("END", 42);

        assert_eq!(table.resolve_or_allocate("SP"), 0);
        assert_eq!(table.resolve_or_allocate("END"), 42);
        // Neither of the above may consume a variable slot
        assert_eq!(table.resolve_or_allocate("x"), 16);
    }
}

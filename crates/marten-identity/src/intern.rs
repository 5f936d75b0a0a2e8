// intern.rs
//
// String interning for Symbol IDs.

use std::hash::BuildHasher;

use rustc_hash::FxBuildHasher;

/// Unique identifier for an interned string (identifier or string-literal
/// payload). Stable for the whole compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl Symbol {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Interns strings to unique Symbol IDs
#[derive(Debug, Clone)]
pub struct Interner {
    map: hashbrown::HashMap<String, Symbol, FxBuildHasher>,
    strings: Vec<String>,
}

impl Default for Interner {
    fn default() -> Self {
        Self {
            map: hashbrown::HashMap::with_hasher(FxBuildHasher),
            strings: Vec::new(),
        }
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        use hashbrown::hash_map::RawEntryMut;

        // Hash once, reuse for both lookup and insert.
        let hash = self.map.hasher().hash_one(s);

        let entry = self.map.raw_entry_mut().from_hash(hash, |k| k == s);

        match entry {
            RawEntryMut::Occupied(e) => *e.get(),
            RawEntryMut::Vacant(e) => {
                let sym = Symbol::new(self.strings.len() as u32);
                let owned = s.to_string();
                self.strings.push(owned.clone());
                e.insert_hashed_nocheck(hash, owned, sym);
                sym
            }
        }
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index() as usize]
    }

    /// Returns the number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns true if no strings have been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_symbol() {
        let mut interner = Interner::new();
        let s1 = interner.intern("hello");
        let s2 = interner.intern("hello");
        let s3 = interner.intern("world");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn resolve_returns_original_string() {
        let mut interner = Interner::new();
        let sym = interner.intern("test");
        assert_eq!(interner.resolve(sym), "test");
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut interner = Interner::new();
        assert_eq!(interner.lookup("missing"), None);
        let sym = interner.intern("present");
        assert_eq!(interner.lookup("present"), Some(sym));
        assert_eq!(interner.len(), 1);
    }
}

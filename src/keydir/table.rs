//! KeyDir implementation
//!
//! HashMap-based key directory.

use std::collections::HashMap;

use super::KeyEntry;

/// Key → latest record location
#[derive(Debug, Default)]
pub struct KeyDir {
    entries: HashMap<String, KeyEntry>,
}

impl KeyDir {
    /// Create a new empty KeyDir
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the latest record location for `key`
    pub fn get(&self, key: &str) -> Option<KeyEntry> {
        self.entries.get(key).copied()
    }

    /// Point `key` at a new record, returning the entry it replaced
    pub fn put(&mut self, key: String, entry: KeyEntry) -> Option<KeyEntry> {
        self.entries.insert(key, entry)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over live keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over (key, entry) pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }
}

//! Cross-chunk identifier cache
//!
//! Maps blank node labels (`_:Person_1`) to store identifiers (`0x2a`).
//! Entries are only ever added; a label resolved once stays resolved for
//! every later chunk.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierCache {
    entries: HashMap<String, String>,
}

impl IdentifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store identifier for a blank label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Record a resolution; returns the previous identifier, if any
    pub fn insert(&mut self, label: impl Into<String>, uid: impl Into<String>) -> Option<String> {
        self.entries.insert(label.into(), uid.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for IdentifierCache {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (label, uid) in iter {
            self.insert(label, uid);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentifierCache {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut cache = Self::new();
        cache.extend(iter);
        cache
    }
}

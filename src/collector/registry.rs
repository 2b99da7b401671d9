//! Ordered registry of named collectors.

use std::sync::Arc;

use crate::collector::Collector;

/// Registry mapping unique collector names to collector handles.
///
/// Iteration follows registration order so that fan-out operations report
/// failures deterministically.
#[derive(Default)]
pub struct CollectorRegistry {
    entries: Vec<(String, Arc<dyn Collector>)>,
}

impl CollectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a collector with `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Insert a collector. Returns `false` and leaves the registry untouched
    /// if the name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, collector: Arc<dyn Collector>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, collector));
        true
    }

    /// Look up a collector by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Collector>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Iterate over `(name, collector)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Collector>)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Number of registered collectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry.
    pub fn drain(&mut self) -> Vec<(String, Arc<dyn Collector>)> {
        std::mem::take(&mut self.entries)
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("names", &self.names())
            .finish_non_exhaustive()
    }
}

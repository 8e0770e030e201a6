//! Memoization of analysis results keyed by cohort filter and data version.

use crate::data::{CohortFilter, Dataset};
use crate::error::Result;
use log::debug;
use std::collections::HashMap;

/// Cache of results computed from a `Dataset`.
///
/// Entries are keyed by `(filter, dataset version)`. Versions are unique per
/// dataset state, so a mutated or freshly loaded dataset never hits an entry
/// computed from other data. Entries for other versions are evicted when a
/// new version is seen.
#[derive(Debug, Clone)]
pub struct AnalysisCache<T> {
    entries: HashMap<(CohortFilter, u64), T>,
    version: u64,
    hits: usize,
    misses: usize,
}

impl<T> Default for AnalysisCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            version: 0,
            hits: 0,
            misses: 0,
        }
    }
}

impl<T> AnalysisCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `(filter, dataset.version())`, computing
    /// and storing it on a miss. Errors are returned and not cached.
    pub fn get_or_compute<F>(&mut self, dataset: &Dataset, filter: &CohortFilter, compute: F) -> Result<&T>
    where
        F: FnOnce(&Dataset, &CohortFilter) -> Result<T>,
    {
        let version = dataset.version();
        if version != self.version {
            debug!(
                "Dataset version changed ({} -> {}); evicting {} cached results",
                self.version,
                version,
                self.entries.len()
            );
            self.entries.retain(|(_, v), _| *v == version);
            self.version = version;
        }

        let key = (filter.clone(), version);
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let value = compute(dataset, filter)?;
            self.entries.insert(key.clone(), value);
        }
        Ok(&self.entries[&key])
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

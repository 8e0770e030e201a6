//! The fixed set of immune-cell populations counted per sample.

use crate::error::{FreqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Populations counted in every sample of the standard panel.
pub const STANDARD_POPULATIONS: [&str; 5] = [
    "b_cell",
    "cd8_t_cell",
    "cd4_t_cell",
    "nk_cell",
    "monocyte",
];

/// An ordered, duplicate-free set of population names.
///
/// The set is fixed before any counts are read; every sample is expected to
/// carry exactly one count per population in the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PopulationSet {
    names: Vec<String>,
}

impl PopulationSet {
    /// Create a population set, rejecting empty sets and duplicate names.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(FreqError::InvalidParameter(
                "Population set cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(FreqError::InvalidParameter(format!(
                    "Duplicate population '{}'",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    /// The standard five-population panel.
    pub fn standard() -> Self {
        Self {
            names: STANDARD_POPULATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Population names in panel order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of populations.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Row index of a population.
    pub fn index_of(&self, population: &str) -> Option<usize> {
        self.names.iter().position(|p| p == population)
    }

    /// Check membership.
    pub fn contains(&self, population: &str) -> bool {
        self.index_of(population).is_some()
    }
}

impl Default for PopulationSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<String>> for PopulationSet {
    type Error = FreqError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<PopulationSet> for Vec<String> {
    fn from(set: PopulationSet) -> Self {
        set.names
    }
}

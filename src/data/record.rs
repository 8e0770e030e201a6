//! Raw per-population cell counts.

use serde::{Deserialize, Serialize};

/// One raw count: how many cells of `population` were observed in `sample_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountRecord {
    /// Sample identifier.
    pub sample_id: String,
    /// Population name.
    pub population: String,
    /// Raw cell count.
    pub count: u64,
}

impl CountRecord {
    /// Create a new record.
    pub fn new(sample_id: impl Into<String>, population: impl Into<String>, count: u64) -> Self {
        Self {
            sample_id: sample_id.into(),
            population: population.into(),
            count,
        }
    }
}

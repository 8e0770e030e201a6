//! A versioned bundle of counts and metadata.

use crate::data::{CountRecord, PopulationSet, SampleMeta, SampleRegistry};
use crate::error::Result;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of dataset versions, shared by every `Dataset` in the process.
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Everything the frequency builder needs: the population panel, raw count
/// records, and sample metadata.
///
/// `version` is drawn from a process-wide counter on construction and on
/// every change to the records or metadata, so two datasets never share a
/// version unless one is a clone of the other. Callers key memoized results
/// on it.
#[derive(Debug, Clone)]
pub struct Dataset {
    populations: PopulationSet,
    records: Vec<CountRecord>,
    samples: SampleRegistry,
    version: u64,
}

impl Dataset {
    /// Create a dataset from its parts.
    pub fn new(
        populations: PopulationSet,
        records: Vec<CountRecord>,
        samples: SampleRegistry,
    ) -> Self {
        Self {
            populations,
            records,
            samples,
            version: next_version(),
        }
    }

    /// Population panel.
    pub fn populations(&self) -> &PopulationSet {
        &self.populations
    }

    /// Raw count records.
    pub fn records(&self) -> &[CountRecord] {
        &self.records
    }

    /// Sample metadata.
    pub fn samples(&self) -> &SampleRegistry {
        &self.samples
    }

    /// Data version, renewed on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Append a count record.
    pub fn push_record(&mut self, record: CountRecord) {
        self.records.push(record);
        self.version = next_version();
    }

    /// Add sample metadata.
    pub fn insert_sample(&mut self, meta: SampleMeta) -> Result<()> {
        if self.samples.insert(meta)? {
            self.version = next_version();
        }
        Ok(())
    }
}

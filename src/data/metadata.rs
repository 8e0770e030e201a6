//! Sample and subject metadata.

use crate::error::{FreqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cohort attributes for one sample.
///
/// Subject-level fields (project, indication, treatment, response, gender)
/// are shared by all samples of a subject; `SampleRegistry` enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMeta {
    pub sample_id: String,
    pub subject_id: String,
    pub project_id: String,
    pub indication: String,
    pub treatment: String,
    /// Response label ("yes", "no"), absent when not recorded.
    pub response: Option<String>,
    pub gender: String,
    pub sample_type: String,
    /// Days from treatment start; 0 is baseline.
    pub time_from_treatment_start: i64,
}

impl SampleMeta {
    /// Compare subject-level attributes with another sample of the same
    /// subject, returning the first attribute that differs.
    fn subject_conflict(&self, other: &SampleMeta) -> Option<&'static str> {
        if self.project_id != other.project_id {
            Some("project")
        } else if self.indication != other.indication {
            Some("indication")
        } else if self.treatment != other.treatment {
            Some("treatment")
        } else if self.response != other.response {
            Some("response")
        } else if self.gender != other.gender {
            Some("gender")
        } else {
            None
        }
    }
}

/// Metadata for all samples, keyed by sample id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<SampleMeta>", into = "Vec<SampleMeta>")]
pub struct SampleRegistry {
    samples: Vec<SampleMeta>,
    index: HashMap<String, usize>,
    subjects: HashMap<String, usize>,
}

impl SampleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from sample metadata.
    pub fn from_samples<I: IntoIterator<Item = SampleMeta>>(samples: I) -> Result<Self> {
        let mut registry = Self::new();
        for meta in samples {
            registry.insert(meta)?;
        }
        Ok(registry)
    }

    /// Insert one sample.
    ///
    /// Re-inserting an identical sample is a no-op. A conflicting duplicate
    /// sample, or a subject whose attributes disagree with an earlier sample
    /// of the same subject, is rejected.
    ///
    /// Returns whether the registry changed.
    pub fn insert(&mut self, meta: SampleMeta) -> Result<bool> {
        if let Some(&idx) = self.index.get(&meta.sample_id) {
            if self.samples[idx] == meta {
                return Ok(false);
            }
            return Err(FreqError::InputShape(format!(
                "Sample '{}' listed twice with different metadata",
                meta.sample_id
            )));
        }

        if let Some(&idx) = self.subjects.get(&meta.subject_id) {
            if let Some(attribute) = self.samples[idx].subject_conflict(&meta) {
                return Err(FreqError::InconsistentSubject {
                    subject: meta.subject_id.clone(),
                    attribute: attribute.to_string(),
                });
            }
        } else {
            self.subjects
                .insert(meta.subject_id.clone(), self.samples.len());
        }

        self.index.insert(meta.sample_id.clone(), self.samples.len());
        self.samples.push(meta);
        Ok(true)
    }

    /// Look up a sample.
    pub fn get(&self, sample_id: &str) -> Option<&SampleMeta> {
        self.index.get(sample_id).map(|&i| &self.samples[i])
    }

    /// Check if a sample exists.
    pub fn has_sample(&self, sample_id: &str) -> bool {
        self.index.contains_key(sample_id)
    }

    /// All samples in insertion order.
    pub fn samples(&self) -> &[SampleMeta] {
        &self.samples
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Number of distinct subjects.
    pub fn n_subjects(&self) -> usize {
        self.subjects.len()
    }
}

impl TryFrom<Vec<SampleMeta>> for SampleRegistry {
    type Error = FreqError;

    fn try_from(samples: Vec<SampleMeta>) -> Result<Self> {
        Self::from_samples(samples)
    }
}

impl From<SampleRegistry> for Vec<SampleMeta> {
    fn from(registry: SampleRegistry) -> Self {
        registry.samples
    }
}

//! Cohort composition profiling: how many samples and subjects a filter
//! selects, broken down by project, response and gender.

use crate::data::{CohortFilter, Dataset, SampleMeta};
use crate::error::{FreqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Number of samples or subjects carrying one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    /// Label value; `None` when the attribute is not recorded.
    pub label: Option<String>,
    pub count: usize,
}

/// Composition of the cohort selected by a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortProfile {
    /// Filter that defined the cohort, as text.
    pub filter: String,
    /// Number of samples matching the filter.
    pub n_samples: usize,
    /// Number of distinct subjects among those samples.
    pub n_subjects: usize,
    /// Samples per project, sorted by project.
    pub samples_per_project: Vec<LabelCount>,
    /// Distinct subjects per response label; unrecorded responses first.
    pub subjects_by_response: Vec<LabelCount>,
    /// Distinct subjects per gender.
    pub subjects_by_gender: Vec<LabelCount>,
}

fn count_labels<'a, I>(labels: I) -> Vec<LabelCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.map(String::from),
            count,
        })
        .collect()
}

/// Profile the samples of `dataset` matching `filter`.
pub fn profile_cohort(dataset: &Dataset, filter: &CohortFilter) -> CohortProfile {
    let selected: Vec<&SampleMeta> = dataset
        .samples()
        .samples()
        .iter()
        .filter(|m| filter.matches(m))
        .collect();

    // One representative sample per subject; subject attributes are shared.
    let mut subjects: BTreeMap<&str, &SampleMeta> = BTreeMap::new();
    for &meta in &selected {
        subjects.entry(meta.subject_id.as_str()).or_insert(meta);
    }

    CohortProfile {
        filter: filter.to_string(),
        n_samples: selected.len(),
        n_subjects: subjects.len(),
        samples_per_project: count_labels(selected.iter().map(|m| Some(m.project_id.as_str()))),
        subjects_by_response: count_labels(subjects.values().map(|m| m.response.as_deref())),
        subjects_by_gender: count_labels(subjects.values().map(|m| Some(m.gender.as_str()))),
    }
}

/// Mean raw count of one population over the samples matching `filter`.
///
/// Returns `Ok(None)` when no sample with a count for the population matches.
pub fn mean_population_count(
    dataset: &Dataset,
    filter: &CohortFilter,
    population: &str,
) -> Result<Option<f64>> {
    if !dataset.populations().contains(population) {
        return Err(FreqError::UnknownPopulation(population.to_string()));
    }

    let selected: BTreeSet<&str> = dataset
        .samples()
        .samples()
        .iter()
        .filter(|m| filter.matches(m))
        .map(|m| m.sample_id.as_str())
        .collect();

    let counts: Vec<u128> = dataset
        .records()
        .iter()
        .filter(|r| r.population == population && selected.contains(r.sample_id.as_str()))
        .map(|r| u128::from(r.count))
        .collect();

    if counts.is_empty() {
        return Ok(None);
    }
    Ok(Some(counts.iter().sum::<u128>() as f64 / counts.len() as f64))
}

impl std::fmt::Display for CohortProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn section(
            f: &mut std::fmt::Formatter<'_>,
            title: &str,
            rows: &[LabelCount],
        ) -> std::fmt::Result {
            writeln!(f, "  {}:", title)?;
            for row in rows {
                writeln!(f, "    {:<12} {}", row.label.as_deref().unwrap_or("NA"), row.count)?;
            }
            Ok(())
        }

        writeln!(f, "Cohort Profile [{}]", self.filter)?;
        writeln!(f, "  Samples:  {}", self.n_samples)?;
        writeln!(f, "  Subjects: {}", self.n_subjects)?;
        section(f, "Samples per project", &self.samples_per_project)?;
        section(f, "Subjects by response", &self.subjects_by_response)?;
        section(f, "Subjects by gender", &self.subjects_by_gender)?;
        Ok(())
    }
}

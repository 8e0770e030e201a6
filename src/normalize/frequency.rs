//! Conversion of raw population counts into per-sample percentages.
//!
//! Each count is divided by the total count of its sample over the full
//! population panel and scaled to a percentage. Totals are taken before any
//! cohort filter is applied: the filter decides which samples appear in the
//! output, never which populations contribute to the denominator.

use crate::data::{
    CohortFilter, CountMatrix, CountRecord, Dataset, DropReason, DroppedSample, FrequencyRow,
    FrequencyTable, PopulationSet, SampleRegistry,
};
use crate::error::{FreqError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Scale factors for count normalization.
pub mod scale {
    /// Counts per 100 (percentages).
    pub const PERCENT: f64 = 100.0;
}

/// How to treat a selected sample that lacks a count for some population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessPolicy {
    /// Fail with an input-shape error.
    #[default]
    Strict,
    /// Exclude the sample and report it in `FrequencyTable::dropped`.
    DropIncomplete,
}

/// Build the frequency table for the samples of `dataset` matching `filter`.
pub fn build_frequency_table(
    dataset: &Dataset,
    filter: &CohortFilter,
    policy: CompletenessPolicy,
) -> Result<FrequencyTable> {
    build_frequency_table_from_parts(
        dataset.populations(),
        dataset.records(),
        dataset.samples(),
        filter,
        policy,
    )
}

/// Build a frequency table from raw records and sample metadata.
///
/// # Errors
/// Input-shape errors when a record names an unknown population or a sample
/// without metadata, when a (sample, population) pair is duplicated, or, under
/// `CompletenessPolicy::Strict`, when a selected sample lacks a population.
///
/// Samples whose total count is zero are never divided; they are listed in
/// `FrequencyTable::dropped` with `DropReason::ZeroTotal`.
pub fn build_frequency_table_from_parts(
    populations: &PopulationSet,
    records: &[CountRecord],
    samples: &SampleRegistry,
    filter: &CohortFilter,
    policy: CompletenessPolicy,
) -> Result<FrequencyTable> {
    let counts = CountMatrix::from_records(populations, records)?;

    if let Some(orphan) = counts.sample_ids().iter().find(|s| !samples.has_sample(s)) {
        return Err(FreqError::UnknownSample(orphan.clone()));
    }

    let totals = counts.col_sums()?;
    let mut rows = Vec::new();
    let mut dropped = Vec::new();

    for meta in samples.samples().iter().filter(|m| filter.matches(m)) {
        let column = counts.sample_index(&meta.sample_id);

        let missing = match column {
            Some(j) if counts.is_complete(j) => Vec::new(),
            Some(j) => counts.missing_populations(j),
            None => populations.names().to_vec(),
        };
        if !missing.is_empty() {
            match policy {
                CompletenessPolicy::Strict => {
                    return Err(FreqError::MissingPopulation {
                        sample: meta.sample_id.clone(),
                        missing: missing.join(", "),
                    });
                }
                CompletenessPolicy::DropIncomplete => {
                    warn!(
                        "Excluding sample '{}': missing populations {}",
                        meta.sample_id,
                        missing.join(", ")
                    );
                    dropped.push(DroppedSample {
                        sample_id: meta.sample_id.clone(),
                        reason: DropReason::IncompletePopulations { missing },
                    });
                    continue;
                }
            }
        }

        // A complete sample always has a column.
        let Some(j) = column else { continue };
        let total = totals[j];
        if total == 0 {
            warn!("Excluding sample '{}': total count is zero", meta.sample_id);
            dropped.push(DroppedSample {
                sample_id: meta.sample_id.clone(),
                reason: DropReason::ZeroTotal,
            });
            continue;
        }

        for (i, population) in populations.names().iter().enumerate() {
            let count = counts.get(i, j);
            rows.push(FrequencyRow {
                sample_id: meta.sample_id.clone(),
                subject_id: meta.subject_id.clone(),
                population: population.clone(),
                count,
                total_count: total,
                percentage: count as f64 / total as f64 * scale::PERCENT,
                response: meta.response.clone(),
                indication: meta.indication.clone(),
                treatment: meta.treatment.clone(),
                sample_type: meta.sample_type.clone(),
                gender: meta.gender.clone(),
                time_from_treatment_start: meta.time_from_treatment_start,
            });
        }
    }

    rows.sort_by(|a, b| {
        a.sample_id
            .cmp(&b.sample_id)
            .then_with(|| a.population.cmp(&b.population))
    });
    dropped.sort_by(|a, b| a.sample_id.cmp(&b.sample_id));

    debug!(
        "Built {} frequency rows for filter [{}], {} samples excluded",
        rows.len(),
        filter,
        dropped.len()
    );

    Ok(FrequencyTable { rows, dropped })
}

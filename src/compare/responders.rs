//! Per-population Welch tests between response groups, with FDR control.
//!
//! # Algorithm
//!
//! 1. Split each population's percentages into responders ("yes") and
//!    non-responders ("no"); rows with any other or missing label are ignored
//! 2. Run Welch's t-test per population; populations with fewer than two
//!    observations in a group, or a degenerate variance, are left untested
//! 3. Apply Benjamini-Hochberg across exactly the tested populations
//! 4. Mark a population significant when its adjusted p-value is below
//!    `SIGNIFICANCE_THRESHOLD`

use crate::correct::correct_bh;
use crate::data::{ComparisonResult, ComparisonSet, FrequencyTable};
use crate::test::{mean, welch_t_test, MIN_GROUP_SIZE};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Adjusted p-value below which a population is reported as significant.
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Response group of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseGroup {
    /// Response label "yes".
    Responder,
    /// Response label "no".
    NonResponder,
}

impl ResponseGroup {
    /// Classify a response label; anything other than "yes" or "no" has no group.
    pub fn classify(label: Option<&str>) -> Option<Self> {
        match label {
            Some("yes") => Some(Self::Responder),
            Some("no") => Some(Self::NonResponder),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Groups {
    yes: Vec<f64>,
    no: Vec<f64>,
}

/// Compare responders and non-responders for every population in `table`.
///
/// Never fails: populations without enough data get `None` p-values and are
/// excluded from the FDR correction, and an input without labelled rows
/// yields an empty set.
pub fn compare_responders(table: &FrequencyTable) -> ComparisonSet {
    let mut by_population: BTreeMap<&str, Groups> = BTreeMap::new();
    for row in &table.rows {
        let Some(group) = ResponseGroup::classify(row.response.as_deref()) else {
            continue;
        };
        let groups = by_population.entry(row.population.as_str()).or_default();
        match group {
            ResponseGroup::Responder => groups.yes.push(row.percentage),
            ResponseGroup::NonResponder => groups.no.push(row.percentage),
        }
    }

    if by_population.is_empty() {
        debug!("No rows with a yes/no response label; nothing to compare");
        return ComparisonSet::default();
    }

    let mut results: Vec<ComparisonResult> = by_population
        .iter()
        .map(|(&population, groups)| {
            let welch = welch_t_test(&groups.yes, &groups.no);
            if welch.is_none() {
                if groups.yes.len() < MIN_GROUP_SIZE || groups.no.len() < MIN_GROUP_SIZE {
                    warn!(
                        "Insufficient data for '{}' (yes: {}, no: {}); p-value not available",
                        population,
                        groups.yes.len(),
                        groups.no.len()
                    );
                } else {
                    warn!(
                        "Degenerate variance for '{}'; p-value not available",
                        population
                    );
                }
            }
            ComparisonResult {
                population: population.to_string(),
                n_yes: groups.yes.len(),
                n_no: groups.no.len(),
                mean_yes: mean(&groups.yes),
                mean_no: mean(&groups.no),
                statistic: welch.map(|w| w.statistic),
                df: welch.map(|w| w.df),
                p_value: welch.map(|w| w.p_value),
                p_adj: None,
                significant: false,
            }
        })
        .collect();

    let tested: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.p_value.is_some())
        .map(|(i, _)| i)
        .collect();
    let p_values: Vec<f64> = tested.iter().filter_map(|&i| results[i].p_value).collect();
    let labels: Vec<String> = tested.iter().map(|&i| results[i].population.clone()).collect();
    let bh = correct_bh(&p_values, &labels);

    for (&i, &q) in tested.iter().zip(bh.q_values.iter()) {
        results[i].p_adj = Some(q);
        results[i].significant = q < SIGNIFICANCE_THRESHOLD;
    }

    debug!(
        "Compared {} populations, {} tested, {} significant",
        results.len(),
        bh.n_tests,
        bh.n_significant(SIGNIFICANCE_THRESHOLD)
    );

    ComparisonSet {
        results,
        n_tested: bh.n_tests,
    }
}

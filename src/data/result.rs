//! Result types for responder vs non-responder comparisons.

use serde::{Deserialize, Serialize};

/// Comparison of the "yes" and "no" response groups for one population.
///
/// `None` marks a value that is not available: a mean of an empty group, or a
/// p-value for a population with too little data to test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub population: String,
    /// Observations in the responder group.
    pub n_yes: usize,
    /// Observations in the non-responder group.
    pub n_no: usize,
    /// Mean percentage among responders.
    pub mean_yes: Option<f64>,
    /// Mean percentage among non-responders.
    pub mean_no: Option<f64>,
    /// Welch t statistic (yes minus no).
    pub statistic: Option<f64>,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: Option<f64>,
    /// Raw two-sided p-value.
    pub p_value: Option<f64>,
    /// Benjamini-Hochberg adjusted p-value.
    pub p_adj: Option<f64>,
    pub significant: bool,
}

/// Per-population comparison results for one analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSet {
    /// Results sorted by population.
    pub results: Vec<ComparisonResult>,
    /// Number of populations that entered the FDR correction.
    pub n_tested: usize,
}

impl ComparisonSet {
    /// Column schema of `results`, in output order.
    pub const COLUMNS: [&'static str; 10] = [
        "population",
        "n_yes",
        "n_no",
        "mean_yes",
        "mean_no",
        "statistic",
        "df",
        "p_value",
        "p_adj",
        "significant",
    ];

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Look up a population.
    pub fn get(&self, population: &str) -> Option<&ComparisonResult> {
        self.results.iter().find(|r| r.population == population)
    }

    /// Significant results.
    pub fn significant(&self) -> Vec<&ComparisonResult> {
        self.results.iter().filter(|r| r.significant).collect()
    }

    /// Results ordered by adjusted p-value; untested populations last.
    pub fn sorted_by_p_adj(&self) -> Vec<&ComparisonResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| match (a.p_adj, b.p_adj) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        sorted
    }
}

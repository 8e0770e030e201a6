//! Analysis runner: cohort selection, frequency table, and comparison.

use crate::compare::compare_responders;
use crate::data::{
    CohortAttribute, CohortFilter, ComparisonSet, Dataset, FilterValue, FrequencyTable,
};
use crate::error::{FreqError, Result};
use crate::normalize::{build_frequency_table, CompletenessPolicy};
use crate::profile::{mean_population_count, profile_cohort, CohortProfile};
use log::info;
use serde::{Deserialize, Serialize};

/// Analysis configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Cohort the analysis is restricted to.
    #[serde(default)]
    pub filter: CohortFilter,
    /// Treatment of samples missing a population.
    #[serde(default)]
    pub completeness: CompletenessPolicy,
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(FreqError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(FreqError::from)
    }

    /// The responder vs non-responder analysis on melanoma PBMC samples
    /// treated with miraclib.
    pub fn example() -> Self {
        Self {
            name: "responders".to_string(),
            description: Some(
                "Responders vs non-responders, melanoma, miraclib, PBMC".to_string(),
            ),
            filter: responder_filter(),
            completeness: CompletenessPolicy::Strict,
        }
    }
}

/// Frequencies and comparison produced by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub name: String,
    pub frequencies: FrequencyTable,
    pub comparison: ComparisonSet,
}

/// Builder for configuring and running an analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    name: String,
    filter: CohortFilter,
    completeness: CompletenessPolicy,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new()
    }
}

impl Analysis {
    /// Create an analysis over all samples.
    pub fn new() -> Self {
        Self {
            name: "unnamed".to_string(),
            filter: CohortFilter::new(),
            completeness: CompletenessPolicy::Strict,
        }
    }

    /// Create from a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            name: config.name.clone(),
            filter: config.filter.clone(),
            completeness: config.completeness,
        }
    }

    /// Set the analysis name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Restrict the cohort to samples with `attribute == value`.
    pub fn filter(mut self, attribute: CohortAttribute, value: &str) -> Result<Self> {
        self.filter = self.filter.with(attribute, value)?;
        Ok(self)
    }

    /// Replace the cohort filter.
    pub fn with_filter(mut self, filter: CohortFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the completeness policy.
    pub fn completeness(mut self, policy: CompletenessPolicy) -> Self {
        self.completeness = policy;
        self
    }

    /// The cohort filter.
    pub fn cohort_filter(&self) -> &CohortFilter {
        &self.filter
    }

    /// Build the frequency table only.
    pub fn frequencies(&self, dataset: &Dataset) -> Result<FrequencyTable> {
        build_frequency_table(dataset, &self.filter, self.completeness)
    }

    /// Build the frequency table and compare response groups.
    pub fn run(&self, dataset: &Dataset) -> Result<AnalysisOutput> {
        info!("Running analysis '{}' on [{}]", self.name, self.filter);
        let frequencies = self.frequencies(dataset)?;
        let comparison = compare_responders(&frequencies);
        info!(
            "Analysis '{}': {} frequency rows, {} excluded samples, {} of {} populations significant",
            self.name,
            frequencies.len(),
            frequencies.dropped.len(),
            comparison.significant().len(),
            comparison.len()
        );
        Ok(AnalysisOutput {
            name: self.name.clone(),
            frequencies,
            comparison,
        })
    }
}

/// Melanoma PBMC samples from subjects treated with miraclib.
pub fn responder_filter() -> CohortFilter {
    let text = |v: &str| FilterValue::Text(v.to_string());
    CohortFilter::new()
        .require(CohortAttribute::Indication, text("melanoma"))
        .require(CohortAttribute::Treatment, text("miraclib"))
        .require(CohortAttribute::SampleType, text("PBMC"))
}

/// `responder_filter` restricted to baseline (day 0) samples.
pub fn baseline_filter() -> CohortFilter {
    responder_filter().require(CohortAttribute::TimeFromTreatmentStart, FilterValue::Integer(0))
}

/// Compare responders and non-responders in the `responder_filter` cohort.
pub fn run_responder_analysis(dataset: &Dataset) -> Result<AnalysisOutput> {
    Analysis::from_config(&AnalysisConfig::example()).run(dataset)
}

/// Composition of the baseline cohort, plus the mean b-cell count of male
/// melanoma responders at baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub cohort: CohortProfile,
    pub mean_b_cell_male_responders: Option<f64>,
}

/// Summarize the baseline cohort.
pub fn baseline_summary(dataset: &Dataset) -> Result<BaselineSummary> {
    let cohort = profile_cohort(dataset, &baseline_filter());
    let male_responders = CohortFilter::new()
        .with(CohortAttribute::Indication, "melanoma")?
        .with(CohortAttribute::Gender, "M")?
        .with(CohortAttribute::Response, "yes")?
        .with(CohortAttribute::TimeFromTreatmentStart, "0")?;
    let mean_b_cell_male_responders = mean_population_count(dataset, &male_responders, "b_cell")?;
    Ok(BaselineSummary {
        cohort,
        mean_b_cell_male_responders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(
            responder_filter().to_string(),
            "indication=melanoma, treatment=miraclib, sample_type=PBMC"
        );
        assert_eq!(baseline_filter().len(), 4);
    }

    #[test]
    fn test_presets_equal_parsed_filters() {
        let parsed = CohortFilter::parse_pairs(&[
            "indication=melanoma",
            "treatment=miraclib",
            "sample_type=PBMC",
        ])
        .unwrap();
        assert_eq!(responder_filter(), parsed);

        let baseline = parsed
            .with(CohortAttribute::TimeFromTreatmentStart, "0")
            .unwrap();
        assert_eq!(baseline_filter(), baseline);
        assert_eq!(
            baseline_filter().get(CohortAttribute::TimeFromTreatmentStart),
            Some(&FilterValue::Integer(0))
        );
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let config = AnalysisConfig::example();
        let yaml = config.to_yaml().unwrap();
        let parsed = AnalysisConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_defaults() {
        let config = AnalysisConfig::from_yaml("name: everything\n").unwrap();
        assert!(config.filter.is_empty());
        assert_eq!(config.completeness, CompletenessPolicy::Strict);
    }

    #[test]
    fn test_config_rejects_unknown_attribute() {
        let yaml = "name: bad\nfilter:\n  tissue: lung\n";
        assert!(AnalysisConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_config_drop_incomplete() {
        let yaml = "name: lenient\ncompleteness: drop_incomplete\nfilter:\n  gender: F\n";
        let config = AnalysisConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.completeness, CompletenessPolicy::DropIncomplete);
        let analysis = Analysis::from_config(&config);
        assert_eq!(analysis.cohort_filter().to_string(), "gender=F");
    }
}

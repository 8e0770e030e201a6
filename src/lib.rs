//! Immune-cell population frequency analysis.
//!
//! This library turns raw per-population cell counts into per-sample
//! frequencies and compares responders with non-responders.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (CountRecord, SampleMeta, CohortFilter, results)
//! - **io**: Wide CSV loading and TSV/JSON export
//! - **normalize**: Counts to percentages of each sample's total
//! - **test**: Hypothesis testing (Welch's t-test)
//! - **correct**: Multiple testing correction (Benjamini-Hochberg)
//! - **compare**: Responder vs non-responder comparison per population
//! - **profile**: Cohort composition summaries
//! - **pipeline**: Analysis composition, presets and memoization
//!
//! # Example
//!
//! ```no_run
//! use cytofreq::prelude::*;
//!
//! let dataset = load_cell_counts("cell-count.csv", &PopulationSet::standard()).unwrap();
//!
//! let output = Analysis::new()
//!     .name("melanoma responders")
//!     .filter(CohortAttribute::Indication, "melanoma").unwrap()
//!     .filter(CohortAttribute::SampleType, "PBMC").unwrap()
//!     .run(&dataset)
//!     .unwrap();
//!
//! for result in output.comparison.significant() {
//!     println!("{}: q = {:?}", result.population, result.p_adj);
//! }
//! ```

pub mod compare;
pub mod correct;
pub mod data;
pub mod error;
pub mod io;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::compare::{compare_responders, ResponseGroup, SIGNIFICANCE_THRESHOLD};
    pub use crate::correct::{correct_bh, BhCorrected};
    pub use crate::data::{
        CohortAttribute, CohortFilter, ComparisonResult, ComparisonSet, CountMatrix, CountRecord,
        Dataset, DropReason, DroppedSample, FilterValue, FrequencyRow, FrequencyTable,
        PopulationSet, SampleMeta, SampleRegistry, STANDARD_POPULATIONS,
    };
    pub use crate::error::{FreqError, Result};
    pub use crate::io::{
        load_cell_counts, read_cell_counts, write_comparison_tsv, write_dropped_tsv,
        write_frequency_tsv, write_json,
    };
    pub use crate::normalize::{
        build_frequency_table, build_frequency_table_from_parts, CompletenessPolicy,
    };
    pub use crate::pipeline::{
        baseline_filter, baseline_summary, responder_filter, run_responder_analysis, Analysis,
        AnalysisCache, AnalysisConfig, AnalysisOutput, BaselineSummary,
    };
    pub use crate::profile::{mean_population_count, profile_cohort, CohortProfile, LabelCount};
    pub use crate::test::{welch_t_test, WelchResult};
}

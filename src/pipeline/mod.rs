//! Analysis composition, presets, and result memoization.

mod cache;
mod runner;

pub use cache::AnalysisCache;
pub use runner::{
    baseline_filter, baseline_summary, responder_filter, run_responder_analysis, Analysis,
    AnalysisConfig, AnalysisOutput, BaselineSummary,
};
